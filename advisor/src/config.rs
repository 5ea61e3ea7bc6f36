use std::fmt;
use std::time::Duration;

/// Model used when `OPENAI_MODEL` is not set
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// API root used when `OPENAI_BASE_URL` is not set
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Upper bound on one model call, request and response body included
pub const DEFAULT_TIMEOUT_MS: u64 = 8_000;

/// Settings for the generative-model decision path, fixed at process start.
#[derive(Clone)]
pub struct LlmConfig {
    /// Bearer credential. `None` selects fallback-only mode.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

// The credential must never reach the logs.
impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl LlmConfig {
    /// Read `OPENAI_API_KEY`, `OPENAI_MODEL`, `OPENAI_BASE_URL` and `PONG_AI_TIMEOUT_MS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`LlmConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let timeout = match non_blank("PONG_AI_TIMEOUT_MS") {
            None => Duration::from_millis(DEFAULT_TIMEOUT_MS),
            Some(raw) => match raw.parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    tracing::warn!(
                        "Ignoring invalid PONG_AI_TIMEOUT_MS '{}', using {}ms",
                        raw,
                        DEFAULT_TIMEOUT_MS
                    );
                    Duration::from_millis(DEFAULT_TIMEOUT_MS)
                }
            },
        };

        Self {
            api_key: non_blank("OPENAI_API_KEY"),
            model: non_blank("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: non_blank("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout,
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Full URL of the responses endpoint
    pub fn responses_url(&self) -> String {
        format!("{}/responses", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_means_fallback_only() {
        let config = LlmConfig::from_lookup(lookup(&[]));
        assert!(!config.has_credential());
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
        assert_eq!(config.responses_url(), "https://api.openai.com/v1/responses");
    }

    #[test]
    fn blank_key_counts_as_absent() {
        let config = LlmConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "   ")]));
        assert!(!config.has_credential());
    }

    #[test]
    fn overrides_are_applied() {
        let config = LlmConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("OPENAI_BASE_URL", "http://127.0.0.1:4000/v1/"),
            ("PONG_AI_TIMEOUT_MS", "250"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.responses_url(), "http://127.0.0.1:4000/v1/responses");
    }

    #[test]
    fn bad_timeout_keeps_default() {
        for raw in ["soon", "0", "-5"] {
            let config = LlmConfig::from_lookup(lookup(&[("PONG_AI_TIMEOUT_MS", raw)]));
            assert_eq!(config.timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
        }
    }

    #[test]
    fn debug_output_redacts_key() {
        let config = LlmConfig {
            api_key: Some("sk-secret".to_string()),
            ..LlmConfig::default()
        };
        let shown = format!("{:?}", config);
        assert!(!shown.contains("sk-secret"));
        assert!(shown.contains("<redacted>"));
    }
}
