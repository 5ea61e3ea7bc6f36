use crate::schema::{
    AIMoveResponse, GameSnapshot, Strategy, MAX_REACTION_BOOST, MIN_REACTION_BOOST,
};

/// Rally length above which the AI tightens its timing
pub const LONG_RALLY: u32 = 7;

/// Ball speed above which the AI tightens its timing
pub const FAST_BALL: f64 = 7.5;

/// Score difference (either way) that switches the AI out of a balanced posture
pub const DECISIVE_LEAD: i64 = 2;

/// Pick a move from the score and rally state alone.
///
/// Pure and total over valid snapshots. Branches are checked in order:
/// trailing, leading, long or fast rally, steady play. `player_hit_pattern`
/// does not take part in the decision.
pub fn fallback_move(snapshot: &GameSnapshot) -> AIMoveResponse {
    let lead = snapshot.lead();

    let (strategy, base_boost, commentary) = if lead <= -DECISIVE_LEAD {
        (
            Strategy::Aggressive,
            1.35,
            "I am turning up pressure for this rally.",
        )
    } else if lead >= DECISIVE_LEAD {
        (Strategy::Defensive, 0.95, "I will play safe and hold my lead.")
    } else if snapshot.ball_speed() > FAST_BALL || snapshot.rally_length() > LONG_RALLY {
        (
            Strategy::Balanced,
            1.15,
            "Long rally. I am tightening my timing.",
        )
    } else {
        (
            Strategy::Balanced,
            1.0,
            "Steady pace. I am reading your angles.",
        )
    };

    let boost = (base_boost * snapshot.difficulty().bias())
        .clamp(MIN_REACTION_BOOST, MAX_REACTION_BOOST);

    AIMoveResponse::trusted(strategy, boost, commentary)
}
