//! Decision providers for the AI Pong Arena opponent.
//!
//! [`build_provider`] picks the model-backed [`OpenAiProvider`] when a credential
//! is configured and the deterministic [`LocalProvider`] otherwise. Both always
//! return a valid [`arena_core::AIMoveResponse`].

mod config;
mod error;
mod extract;
mod provider;

pub use config::{LlmConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_MS};
pub use error::AdapterError;
pub use extract::extract_payload;
pub use provider::{
    build_provider, build_request, interpret_envelope, move_schema, DecisionProvider,
    LocalProvider, OpenAiProvider,
};
