use std::sync::Arc;

use crate::config::Config;
use crate::services::{GeminiProvider, RecommendationProvider, SessionStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn RecommendationProvider>,
    pub sessions: SessionStore,
}

impl AppState {
    /// Creates state around an existing provider with no sessions
    pub fn new(provider: Arc<dyn RecommendationProvider>) -> Self {
        Self {
            provider,
            sessions: SessionStore::new(),
        }
    }

    /// Creates state around an existing provider and session store
    pub fn with_sessions(provider: Arc<dyn RecommendationProvider>, sessions: SessionStore) -> Self {
        Self { provider, sessions }
    }

    /// Creates state backed by the Gemini provider described in `config`
    pub fn from_config(config: &Config) -> Self {
        Self::with_sessions(
            Arc::new(GeminiProvider::from_config(config)),
            SessionStore::with_ttl(config.session_ttl()),
        )
    }
}
