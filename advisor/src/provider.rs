use std::sync::Arc;

use arena_core::{
    fallback_move, AIMoveResponse, GameSnapshot, MovePayload, MAX_COMMENTARY_CHARS,
    MAX_REACTION_BOOST, MIN_REACTION_BOOST,
};
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::LlmConfig;
use crate::error::AdapterError;
use crate::extract::extract_payload;

const SYSTEM_PROMPT: &str =
    "You tune a Pong AI. Return strict JSON only. Commentary must be short, competitive, and calm.";

const TEMPERATURE: f64 = 0.4;
const MAX_OUTPUT_TOKENS: u32 = 120;

/// Longest error body kept when the model service answers with a failure status
const MAX_ERROR_BODY: usize = 512;

/// Source of AI paddle decisions.
///
/// Implementations always return a valid move; failures are handled inside.
#[async_trait]
pub trait DecisionProvider: Send + Sync {
    /// Short label for logs
    fn name(&self) -> &'static str;

    async fn decide(&self, snapshot: &GameSnapshot) -> AIMoveResponse;
}

/// Deterministic heuristic, no I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalProvider;

#[async_trait]
impl DecisionProvider for LocalProvider {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn decide(&self, snapshot: &GameSnapshot) -> AIMoveResponse {
        fallback_move(snapshot)
    }
}

/// Asks an OpenAI-compatible responses endpoint for a schema-constrained move,
/// falling back to [`LocalProvider`] on any failure.
pub struct OpenAiProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    fallback: LocalProvider,
}

impl OpenAiProvider {
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self, AdapterError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.responses_url(),
            api_key,
            model: config.model.clone(),
            fallback: LocalProvider,
        })
    }

    /// One attempt against the model service, no retries.
    pub async fn request_move(
        &self,
        snapshot: &GameSnapshot,
    ) -> Result<AIMoveResponse, AdapterError> {
        let body = build_request(&self.model, snapshot)?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|&i| body.is_char_boundary(i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            return Err(AdapterError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: Value = response.json().await?;
        interpret_envelope(&envelope)
    }
}

#[async_trait]
impl DecisionProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn decide(&self, snapshot: &GameSnapshot) -> AIMoveResponse {
        match self.request_move(snapshot).await {
            Ok(response) => {
                tracing::info!(
                    "Model move accepted: strategy={}, reaction_boost={}",
                    response.strategy(),
                    response.reaction_boost()
                );
                response
            }
            Err(e) => {
                tracing::warn!("Model move unavailable, using fallback heuristic: {}", e);
                self.fallback.decide(snapshot).await
            }
        }
    }
}

/// Pick the provider for this process: the model-backed one when a credential
/// is configured, the local heuristic otherwise.
pub fn build_provider(config: &LlmConfig) -> Arc<dyn DecisionProvider> {
    let Some(api_key) = config.api_key.clone() else {
        tracing::info!("OPENAI_API_KEY not set, AI moves use the local heuristic only");
        return Arc::new(LocalProvider);
    };

    match OpenAiProvider::new(config, api_key) {
        Ok(provider) => {
            tracing::info!(
                "AI moves use model '{}' at {} (timeout {}ms)",
                config.model,
                config.base_url,
                config.timeout.as_millis()
            );
            Arc::new(provider)
        }
        Err(e) => {
            tracing::error!("Failed to build model client, using local heuristic: {}", e);
            Arc::new(LocalProvider)
        }
    }
}

/// JSON schema the model output is constrained to
pub fn move_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "strategy": {
                "type": "string",
                "enum": ["aggressive", "defensive", "balanced"],
            },
            "reaction_boost": {
                "type": "number",
                "minimum": MIN_REACTION_BOOST,
                "maximum": MAX_REACTION_BOOST,
            },
            "commentary": {
                "type": "string",
                "minLength": 1,
                "maxLength": MAX_COMMENTARY_CHARS,
            },
        },
        "required": ["strategy", "reaction_boost", "commentary"],
        "additionalProperties": false,
    })
}

/// Request body for the responses endpoint
pub fn build_request(model: &str, snapshot: &GameSnapshot) -> Result<Value, AdapterError> {
    let snapshot_json = serde_json::to_string(snapshot)?;

    Ok(json!({
        "model": model,
        "input": [
            {
                "role": "system",
                "content": [{"type": "input_text", "text": SYSTEM_PROMPT}],
            },
            {
                "role": "user",
                "content": [{
                    "type": "input_text",
                    "text": format!(
                        "Given this game snapshot, return strategy, reaction_boost, and commentary: {}",
                        snapshot_json
                    ),
                }],
            },
        ],
        "temperature": TEMPERATURE,
        "max_output_tokens": MAX_OUTPUT_TOKENS,
        "text": {
            "format": {
                "type": "json_schema",
                "name": "pong_ai_move",
                "strict": true,
                "schema": move_schema(),
            }
        },
    }))
}

/// Turn a response envelope into a validated move.
pub fn interpret_envelope(envelope: &Value) -> Result<AIMoveResponse, AdapterError> {
    let text = extract_payload(envelope)?;
    let raw: MovePayload = serde_json::from_str(text)?;
    Ok(AIMoveResponse::try_from(raw)?)
}
