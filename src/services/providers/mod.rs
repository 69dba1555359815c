use tracing::instrument;

/// Recommendation provider abstraction
///
/// A provider turns a fully built prompt into one batch of recommendations.
/// Prompt construction and pagination live outside the provider, so the
/// generative backend can be swapped (or mocked) without touching them.
use crate::{error::FetchError, models::RecommendationItem};

pub mod gemini;

pub use gemini::GeminiProvider;

/// Trait for generative recommendation backends
///
/// One call is one logical request: it either yields a complete batch
/// (possibly empty) or fails as a whole.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationProvider: Send + Sync {
    /// Send `prompt` and return the batch the model produced
    async fn fetch(&self, prompt: &str) -> Result<Vec<RecommendationItem>, FetchError>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Fetch through `provider`, logging the outcome
#[instrument(skip(provider, prompt), fields(provider = provider.name()))]
pub async fn fetch_logged(
    provider: &dyn RecommendationProvider,
    prompt: &str,
) -> Result<Vec<RecommendationItem>, FetchError> {
    match provider.fetch(prompt).await {
        Ok(items) => {
            tracing::info!(results = items.len(), "Recommendation batch fetched");
            Ok(items)
        }
        Err(e) => {
            tracing::error!(error = %e, "Recommendation batch failed");
            Err(e)
        }
    }
}
