// Behavioural checks for the local decision heuristic, driven through the
// same JSON shape the frontend posts to /ai-move.
use arena_core::{
    fallback_move, AIMoveResponse, Difficulty, GameSnapshot, HitPattern, Strategy,
    MAX_REACTION_BOOST, MIN_REACTION_BOOST,
};
use serde_json::json;

const EPS: f64 = 1e-9;

fn snapshot(value: serde_json::Value) -> GameSnapshot {
    serde_json::from_value(value).unwrap_or_else(|e| panic!("invalid snapshot: {}", e))
}

fn assert_boost(response: &AIMoveResponse, expected: f64) {
    assert!(
        (response.reaction_boost() - expected).abs() < EPS,
        "expected reaction_boost {}, got {}",
        expected,
        response.reaction_boost()
    );
}

#[test]
fn test_every_snapshot_yields_bounded_boost() {
    let speeds = [0.1, 2.0, 7.5, 7.51, 12.0, 1000.0];
    for player in 0..8u32 {
        for ai in 0..8u32 {
            for rally in [0u32, 3, 7, 8, 50] {
                for &speed in &speeds {
                    for &difficulty in Difficulty::ALL {
                        for &pattern in HitPattern::ALL {
                            let s = GameSnapshot::new(player, ai, rally, pattern, speed, difficulty)
                                .expect("snapshot in range");
                            let r = fallback_move(&s);
                            assert!(
                                (MIN_REACTION_BOOST..=MAX_REACTION_BOOST)
                                    .contains(&r.reaction_boost()),
                                "boost {} out of range for {:?}",
                                r.reaction_boost(),
                                s
                            );
                            assert!(Strategy::ALL.contains(&r.strategy()));
                            assert!(!r.commentary().is_empty());
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn test_identical_snapshots_give_identical_moves() {
    let s = snapshot(json!({
        "player_score": 3, "ai_score": 2, "rally_length": 5,
        "player_hit_pattern": "downward", "ball_speed": 6.2
    }));
    assert_eq!(fallback_move(&s), fallback_move(&s.clone()));
}

#[test]
fn test_lead_dominates_rally_and_speed() {
    for rally in [0u32, 8, 40] {
        for speed in [1.0, 9.0] {
            let s = GameSnapshot::new(1, 5, rally, HitPattern::Mixed, speed, Difficulty::Medium)
                .unwrap();
            assert_eq!(
                fallback_move(&s).strategy(),
                Strategy::Defensive,
                "rally={} speed={}",
                rally,
                speed
            );
        }
    }
}

#[test]
fn test_trailing_by_two_is_aggressive() {
    let s = GameSnapshot::new(4, 2, 0, HitPattern::Flat, 3.0, Difficulty::Hard).unwrap();
    let r = fallback_move(&s);
    assert_eq!(r.strategy(), Strategy::Aggressive);
    assert_eq!(r.commentary(), "I am turning up pressure for this rally.");
    assert_boost(&r, 1.35);

    // one point down falls through to the rally/speed branches
    let s = GameSnapshot::new(3, 2, 0, HitPattern::Flat, 3.0, Difficulty::Hard).unwrap();
    let r = fallback_move(&s);
    assert_eq!(r.strategy(), Strategy::Balanced);
    assert_eq!(r.commentary(), "Steady pace. I am reading your angles.");
}

#[test]
fn test_easy_aggressive_boost_is_scaled() {
    let s = GameSnapshot::new(5, 0, 0, HitPattern::Upward, 4.0, Difficulty::Easy).unwrap();
    let r = fallback_move(&s);
    assert_eq!(r.strategy(), Strategy::Aggressive);
    assert_boost(&r, 0.81);
}

#[test]
fn test_hard_leading_scenario() {
    let s = snapshot(json!({
        "player_score": 0, "ai_score": 3, "rally_length": 2,
        "player_hit_pattern": "flat", "ball_speed": 5.0, "difficulty": "hard"
    }));
    let r = fallback_move(&s);
    assert_eq!(r.strategy(), Strategy::Defensive);
    assert_boost(&r, 0.95);
    assert_eq!(r.commentary(), "I will play safe and hold my lead.");
}

#[test]
fn test_medium_long_rally_scenario() {
    let s = snapshot(json!({
        "player_score": 4, "ai_score": 4, "rally_length": 9,
        "player_hit_pattern": "mixed", "ball_speed": 6.0, "difficulty": "medium"
    }));
    let r = fallback_move(&s);
    assert_eq!(r.strategy(), Strategy::Balanced);
    assert_boost(&r, 0.943);
    assert_eq!(r.commentary(), "Long rally. I am tightening my timing.");
}

#[test]
fn test_hit_pattern_does_not_change_decision() {
    let base = GameSnapshot::new(2, 2, 8, HitPattern::Upward, 5.0, Difficulty::Medium).unwrap();
    let expected = fallback_move(&base);
    for &pattern in HitPattern::ALL {
        let s = GameSnapshot::new(2, 2, 8, pattern, 5.0, Difficulty::Medium).unwrap();
        assert_eq!(fallback_move(&s), expected);
    }
}

#[test]
fn test_invalid_snapshots_are_rejected() {
    let zero_speed: Result<GameSnapshot, _> = serde_json::from_value(json!({
        "player_score": 0, "ai_score": 0, "rally_length": 0,
        "player_hit_pattern": "flat", "ball_speed": 0
    }));
    assert!(zero_speed.is_err(), "ball_speed=0 must be rejected");

    let sideways: Result<GameSnapshot, _> = serde_json::from_value(json!({
        "player_score": 0, "ai_score": 0, "rally_length": 0,
        "player_hit_pattern": "sideways", "ball_speed": 4.0
    }));
    assert!(sideways.is_err(), "unknown hit pattern must be rejected");
}
