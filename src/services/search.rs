use crate::{
    error::FetchError,
    models::{MediaType, RecommendationItem},
    services::{
        prompt::build_prompt,
        providers::{fetch_logged, RecommendationProvider},
        session::FetchMoreTicket,
    },
};

/// Fetches the first page of movies and TV shows concurrently
///
/// Both requests are joined as one unit: the first failure fails the search
/// and the other request is dropped.
pub async fn initial_search(
    provider: &dyn RecommendationProvider,
    query: &str,
) -> Result<(Vec<RecommendationItem>, Vec<RecommendationItem>), FetchError> {
    let movie_prompt = build_prompt(query, MediaType::Movies, &[]);
    let tv_show_prompt = build_prompt(query, MediaType::TvShows, &[]);

    tokio::try_join!(
        fetch_logged(provider, &movie_prompt),
        fetch_logged(provider, &tv_show_prompt),
    )
}

/// Fetches the next page for the list named in `ticket`
pub async fn fetch_more(
    provider: &dyn RecommendationProvider,
    ticket: &FetchMoreTicket,
) -> Result<Vec<RecommendationItem>, FetchError> {
    let prompt = build_prompt(&ticket.query, ticket.media_type, &ticket.exclude_titles);
    fetch_logged(provider, &prompt).await
}
