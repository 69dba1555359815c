use crate::{
    error::{AppError, AppResult},
    models::{RecommendationItem, RecommendationRequest},
    services::{
        prompt::build_prompt,
        providers::{fetch_logged, RecommendationProvider},
    },
};

/// Fetches a single batch of recommendations outside any session
///
/// Builds the prompt for the requested media type, excluding the supplied
/// titles, and delegates to the configured provider.
pub async fn get_recommendations(
    provider: &dyn RecommendationProvider,
    request: RecommendationRequest,
) -> AppResult<Vec<RecommendationItem>> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(AppError::InvalidInput(
            "Search query cannot be empty".to_string(),
        ));
    }

    let prompt = build_prompt(query, request.media_type, &request.exclude_titles);
    Ok(fetch_logged(provider, &prompt).await?)
}
