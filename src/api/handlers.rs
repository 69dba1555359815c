use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{MediaType, RecommendationItem, RecommendationRequest},
    services::{
        cards::{known_platforms, Card, PlatformBadge},
        recommendations,
        session::{SearchSession, SessionPhase},
    },
};

use super::AppState;

pub const NO_RESULTS_NOTICE: &str = "No results found for this category.";
pub const EXHAUSTED_NOTICE: &str = "No more results found.";

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub media_type: MediaType,
}

#[derive(Debug, Serialize)]
pub struct TabView {
    pub media_type: MediaType,
    pub cards: Vec<Card>,
    pub notice: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub query: String,
    pub phase: SessionPhase,
    pub active: MediaType,
    pub has_searched: bool,
    pub can_fetch_more: bool,
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub movies: TabView,
    pub tv_shows: TabView,
}

impl TabView {
    fn build(session: &SearchSession, media_type: MediaType) -> Self {
        let items = session.items(media_type);
        let settled = session.has_searched && session.phase != SessionPhase::Searching;

        let notice = if !settled {
            None
        } else if items.is_empty() {
            Some(NO_RESULTS_NOTICE)
        } else if !session.can_fetch_more {
            Some(EXHAUSTED_NOTICE)
        } else {
            None
        };

        Self {
            media_type,
            cards: items.iter().map(Card::from).collect(),
            notice,
        }
    }
}

impl From<&SearchSession> for SessionView {
    fn from(session: &SearchSession) -> Self {
        Self {
            id: session.id,
            query: session.query.clone(),
            phase: session.phase,
            active: session.active,
            has_searched: session.has_searched,
            can_fetch_more: session.can_fetch_more,
            error: session.error.clone(),
            updated_at: session.updated_at,
            movies: TabView::build(session, MediaType::Movies),
            tv_shows: TabView::build(session, MediaType::TvShows),
        }
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Platforms the prompt steers the model towards, with their icons
pub async fn get_platforms() -> Json<Vec<PlatformBadge>> {
    Json(known_platforms())
}

/// Fetch one batch of recommendations without a session
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<Vec<RecommendationItem>>> {
    tracing::info!(
        request_id = %request_id,
        media_type = %request.media_type,
        excluded = request.exclude_titles.len(),
        "Processing recommendation request"
    );

    let items = recommendations::get_recommendations(state.provider.as_ref(), request).await?;
    Ok(Json(items))
}

/// Create a new idle search session
pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionView>) {
    let session = state.sessions.create().await;
    tracing::info!(session_id = %session.id, "Session created");
    (StatusCode::CREATED, Json(SessionView::from(&session)))
}

/// Get the current state of a session
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SessionView>> {
    let session = state.sessions.get(id).await?;
    Ok(Json(SessionView::from(&session)))
}

/// Drop a session
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Start a new search, replacing whatever the session held
pub async fn search(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(request): Json<SearchRequest>,
) -> AppResult<Json<SessionView>> {
    tracing::info!(request_id = %request_id, session_id = %id, "Processing search request");

    let session = state
        .sessions
        .search(id, &request.query, state.provider.clone())
        .await?;

    tracing::info!(
        request_id = %request_id,
        movies = session.movies.len(),
        tv_shows = session.tv_shows.len(),
        "Search completed"
    );

    Ok(Json(SessionView::from(&session)))
}

/// Append another page to the active list
pub async fn show_more(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SessionView>> {
    tracing::info!(request_id = %request_id, session_id = %id, "Processing show-more request");

    let session = state
        .sessions
        .fetch_more(id, state.provider.clone())
        .await?;
    Ok(Json(SessionView::from(&session)))
}

/// Switch the active list
pub async fn select_active(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectRequest>,
) -> AppResult<Json<SessionView>> {
    let session = state.sessions.select(id, request.media_type).await?;
    Ok(Json(SessionView::from(&session)))
}
