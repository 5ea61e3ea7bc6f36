use arena_core::ValidationErrors;
use thiserror::Error;

/// Why the model path did not produce a move. Never shown to callers: every
/// variant ends in the fallback heuristic.
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("model request timed out")]
    Timeout,
    #[error("model request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("model service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("no JSON output found in model response")]
    MissingOutput,
    #[error("model output is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("model output violates the move schema: {0}")]
    Invalid(#[from] ValidationErrors),
}

impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AdapterError::Timeout
        } else {
            AdapterError::Transport(err)
        }
    }
}
