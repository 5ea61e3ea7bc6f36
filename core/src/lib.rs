//! Data contracts and the local decision policy for the AI Pong Arena opponent.
//!
//! Nothing in this crate performs I/O: the snapshot and move types, their
//! validation, and the deterministic fallback heuristic that every other
//! decision path falls back to.

mod fallback;
mod schema;
mod validation;

pub use fallback::{fallback_move, DECISIVE_LEAD, FAST_BALL, LONG_RALLY};
pub use schema::{
    AIMoveResponse, Difficulty, GameSnapshot, HitPattern, MovePayload, SnapshotPayload, Strategy,
    UnknownVariant, MAX_COMMENTARY_CHARS, MAX_REACTION_BOOST, MIN_REACTION_BOOST,
};
pub use validation::{ValidationErrors, Violation};
