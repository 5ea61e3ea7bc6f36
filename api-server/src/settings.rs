use std::path::PathBuf;

pub const DEFAULT_BIND: &str = "0.0.0.0:8000";
pub const DEFAULT_FRONTEND_DIST: &str = "frontend/dist";

/// Server settings read once from the environment
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub bind: String,
    /// Directory holding the prebuilt frontend (`index.html`, `assets/`)
    pub frontend_dist: PathBuf,
}

impl ServerSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            bind: non_blank("PONG_ARENA_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            frontend_dist: non_blank("PONG_ARENA_FRONTEND_DIST")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FRONTEND_DIST)),
        }
    }
}
