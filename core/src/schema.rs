use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::validation::{Checker, ValidationErrors};

/// Lower bound of the AI paddle reaction multiplier
pub const MIN_REACTION_BOOST: f64 = 0.6;

/// Upper bound of the AI paddle reaction multiplier
pub const MAX_REACTION_BOOST: f64 = 1.8;

/// Commentary length limit, counted in characters after trimming
pub const MAX_COMMENTARY_CHARS: usize = 120;

/// Error returned when a string is not a member of a closed enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown variant '{}'", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

// Closed enumerations with a lowercase wire form. Parsing is exact: "Hard" is rejected.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }

            /// Comma separated wire names, used in validation messages
            pub fn allowed() -> String {
                Self::ALL.iter().map(|v| v.as_str()).collect::<Vec<_>>().join(", ")
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    _ => Err(UnknownVariant(s.to_string())),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum! {
    /// Summary of the human player's recent paddle movement
    HitPattern {
        Upward => "upward",
        Downward => "downward",
        Flat => "flat",
        Mixed => "mixed",
    }
}

wire_enum! {
    /// Difficulty selected in the frontend menu
    Difficulty {
        Easy => "easy",
        Medium => "medium",
        Hard => "hard",
    }
}

wire_enum! {
    /// Posture of the AI paddle for the next exchange
    Strategy {
        Aggressive => "aggressive",
        Defensive => "defensive",
        Balanced => "balanced",
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Medium
    }
}

impl Difficulty {
    /// Scales the heuristic's base reaction boost
    pub fn bias(self) -> f64 {
        match self {
            Difficulty::Easy => 0.6,
            Difficulty::Medium => 0.82,
            Difficulty::Hard => 1.0,
        }
    }
}

/// Raw, unvalidated snapshot as it arrives on the wire.
///
/// Every field is kept as a JSON value so that type errors are reported per field
/// instead of failing the whole body.
#[derive(Debug, Default, Deserialize)]
pub struct SnapshotPayload {
    #[serde(default)]
    pub player_score: Option<Value>,
    #[serde(default)]
    pub ai_score: Option<Value>,
    #[serde(default)]
    pub rally_length: Option<Value>,
    #[serde(default)]
    pub player_hit_pattern: Option<Value>,
    #[serde(default)]
    pub ball_speed: Option<Value>,
    /// `None` only when the key is absent; an explicit `null` is kept and rejected.
    #[serde(default, deserialize_with = "present")]
    pub difficulty: Option<Value>,
}

/// Keeps a JSON `null` as `Some(Value::Null)` instead of folding it into `None`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Game state at the moment the AI asks for a decision.
///
/// Only obtainable through validation, so every value satisfies the field bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SnapshotPayload")]
pub struct GameSnapshot {
    player_score: u32,
    ai_score: u32,
    rally_length: u32,
    player_hit_pattern: HitPattern,
    ball_speed: f64,
    difficulty: Difficulty,
}

impl GameSnapshot {
    pub fn new(
        player_score: u32,
        ai_score: u32,
        rally_length: u32,
        player_hit_pattern: HitPattern,
        ball_speed: f64,
        difficulty: Difficulty,
    ) -> Result<Self, ValidationErrors> {
        let mut check = Checker::default();
        if !(ball_speed.is_finite() && ball_speed > 0.0) {
            check.fail("ball_speed", "must be greater than 0");
        }
        check.finish()?;

        Ok(Self {
            player_score,
            ai_score,
            rally_length,
            player_hit_pattern,
            ball_speed,
            difficulty,
        })
    }

    pub fn player_score(&self) -> u32 {
        self.player_score
    }

    pub fn ai_score(&self) -> u32 {
        self.ai_score
    }

    pub fn rally_length(&self) -> u32 {
        self.rally_length
    }

    pub fn player_hit_pattern(&self) -> HitPattern {
        self.player_hit_pattern
    }

    pub fn ball_speed(&self) -> f64 {
        self.ball_speed
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// AI score minus player score
    pub fn lead(&self) -> i64 {
        i64::from(self.ai_score) - i64::from(self.player_score)
    }
}

impl TryFrom<SnapshotPayload> for GameSnapshot {
    type Error = ValidationErrors;

    fn try_from(raw: SnapshotPayload) -> Result<Self, Self::Error> {
        let mut check = Checker::default();

        let player_score = check.count("player_score", raw.player_score.as_ref());
        let ai_score = check.count("ai_score", raw.ai_score.as_ref());
        let rally_length = check.count("rally_length", raw.rally_length.as_ref());
        let player_hit_pattern = check.choice::<HitPattern>(
            "player_hit_pattern",
            raw.player_hit_pattern.as_ref(),
            &HitPattern::allowed(),
        );
        let ball_speed = check
            .number("ball_speed", raw.ball_speed.as_ref())
            .and_then(|speed| {
                if speed > 0.0 {
                    Some(speed)
                } else {
                    check.fail("ball_speed", "must be greater than 0");
                    None
                }
            });
        let difficulty = match raw.difficulty.as_ref() {
            None => Some(Difficulty::default()),
            Some(value) => {
                check.choice::<Difficulty>("difficulty", Some(value), &Difficulty::allowed())
            }
        };

        match (
            player_score,
            ai_score,
            rally_length,
            player_hit_pattern,
            ball_speed,
            difficulty,
        ) {
            (Some(p), Some(a), Some(r), Some(h), Some(s), Some(d)) => {
                check.finish()?;
                Ok(Self {
                    player_score: p,
                    ai_score: a,
                    rally_length: r,
                    player_hit_pattern: h,
                    ball_speed: s,
                    difficulty: d,
                })
            }
            _ => Err(check
                .finish()
                .err()
                .unwrap_or_else(|| ValidationErrors(Vec::new()))),
        }
    }
}

/// Raw move as returned by the generative model, before validation
#[derive(Debug, Default, Deserialize)]
pub struct MovePayload {
    #[serde(default)]
    pub strategy: Option<Value>,
    #[serde(default)]
    pub reaction_boost: Option<Value>,
    #[serde(default)]
    pub commentary: Option<Value>,
}

/// The AI's decision for the next exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MovePayload")]
pub struct AIMoveResponse {
    strategy: Strategy,
    reaction_boost: f64,
    commentary: String,
}

impl AIMoveResponse {
    /// Validates and builds a response. Commentary is trimmed before its length is checked.
    pub fn new(
        strategy: Strategy,
        reaction_boost: f64,
        commentary: &str,
    ) -> Result<Self, ValidationErrors> {
        let mut check = Checker::default();
        let reaction_boost = check_boost(&mut check, reaction_boost);
        let commentary = check_commentary(&mut check, commentary);
        check.finish()?;

        Ok(Self {
            strategy,
            reaction_boost: reaction_boost.unwrap_or(MIN_REACTION_BOOST),
            commentary: commentary.unwrap_or_default(),
        })
    }

    /// Builds a response from values the caller guarantees to be in range.
    pub(crate) fn trusted(strategy: Strategy, reaction_boost: f64, commentary: &str) -> Self {
        debug_assert!((MIN_REACTION_BOOST..=MAX_REACTION_BOOST).contains(&reaction_boost));
        Self {
            strategy,
            reaction_boost,
            commentary: commentary.to_string(),
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn reaction_boost(&self) -> f64 {
        self.reaction_boost
    }

    pub fn commentary(&self) -> &str {
        &self.commentary
    }
}

fn check_boost(check: &mut Checker, boost: f64) -> Option<f64> {
    if boost.is_finite() && (MIN_REACTION_BOOST..=MAX_REACTION_BOOST).contains(&boost) {
        Some(boost)
    } else {
        check.fail(
            "reaction_boost",
            format!("must be between {MIN_REACTION_BOOST} and {MAX_REACTION_BOOST}"),
        );
        None
    }
}

fn check_commentary(check: &mut Checker, commentary: &str) -> Option<String> {
    let trimmed = commentary.trim();
    let len = trimmed.chars().count();
    if len == 0 {
        check.fail("commentary", "must not be empty");
        None
    } else if len > MAX_COMMENTARY_CHARS {
        check.fail(
            "commentary",
            format!("must be at most {MAX_COMMENTARY_CHARS} characters"),
        );
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl TryFrom<MovePayload> for AIMoveResponse {
    type Error = ValidationErrors;

    fn try_from(raw: MovePayload) -> Result<Self, Self::Error> {
        let mut check = Checker::default();

        let strategy =
            check.choice::<Strategy>("strategy", raw.strategy.as_ref(), &Strategy::allowed());
        let reaction_boost = check
            .number("reaction_boost", raw.reaction_boost.as_ref())
            .and_then(|boost| check_boost(&mut check, boost));
        let commentary = match raw.commentary.as_ref() {
            None => {
                check.fail("commentary", "field required");
                None
            }
            Some(Value::String(text)) => check_commentary(&mut check, text),
            Some(_) => {
                check.fail("commentary", "must be a string");
                None
            }
        };

        match (strategy, reaction_boost, commentary) {
            (Some(strategy), Some(reaction_boost), Some(commentary)) => {
                check.finish()?;
                Ok(Self {
                    strategy,
                    reaction_boost,
                    commentary,
                })
            }
            _ => Err(check
                .finish()
                .err()
                .unwrap_or_else(|| ValidationErrors(Vec::new()))),
        }
    }
}
