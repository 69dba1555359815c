use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::{sync::RwLock, task::JoinHandle};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, FetchError},
    models::MediaType,
    services::{
        providers::RecommendationProvider,
        search,
        session::SearchSession,
    },
};

/// Idle time after which a session is forgotten
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

/// In-memory registry of search sessions
///
/// The lock is only held to read or swap a session value, never across a
/// provider call. Provider calls and the state update that follows them run
/// on a detached task, so a caller that goes away cannot leave a session
/// stuck mid-fetch. Sessions idle for longer than the TTL are evicted.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, SearchSession>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {} does not exist", id))
}

fn validated_query(query: &str) -> AppResult<String> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::InvalidInput(
            "Search query cannot be empty".to_string(),
        ));
    }
    Ok(query.to_string())
}

/// Runs a provider call on its own task; a panic there becomes a failed fetch
async fn contained<T: Send + 'static>(
    call: impl Future<Output = Result<T, FetchError>> + Send + 'static,
) -> Result<T, FetchError> {
    tokio::spawn(call).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Recommendation task failed");
        Err(FetchError::Network(format!("Recommendation task failed: {}", e)))
    })
}

/// Awaits a detached session task
async fn join<T>(task: JoinHandle<AppResult<T>>) -> AppResult<T> {
    task.await
        .map_err(|e| AppError::Internal(format!("Session task failed: {}", e)))?
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Creates and registers an idle session, evicting expired ones first
    pub async fn create(&self) -> SearchSession {
        let session = SearchSession::new();
        let mut sessions = self.inner.write().await;
        self.evict_expired(&mut sessions);
        sessions.insert(session.id, session.clone());
        session
    }

    pub async fn get(&self, id: Uuid) -> AppResult<SearchSession> {
        self.inner
            .read()
            .await
            .get(&id)
            .filter(|session| !session.is_expired(self.ttl))
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    pub async fn remove(&self, id: Uuid) -> AppResult<()> {
        self.inner
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }

    /// Drops every session idle for longer than the TTL
    pub async fn prune(&self) -> usize {
        let mut sessions = self.inner.write().await;
        self.evict_expired(&mut sessions)
    }

    fn evict_expired(&self, sessions: &mut HashMap<Uuid, SearchSession>) -> usize {
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(self.ttl));
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, remaining = sessions.len(), "Evicted idle sessions");
        }
        evicted
    }

    /// Prunes expired sessions every `every` until the returned task is aborted
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                store.prune().await;
            }
        })
    }

    /// Replaces the session with `transition(current)` and returns the new value
    async fn update<T>(
        &self,
        id: Uuid,
        transition: impl FnOnce(&SearchSession) -> (SearchSession, T),
    ) -> AppResult<(SearchSession, T)> {
        let mut sessions = self.inner.write().await;
        let slot = sessions
            .get_mut(&id)
            .filter(|session| !session.is_expired(self.ttl))
            .ok_or_else(|| not_found(id))?;
        let (next, extra) = transition(slot);
        *slot = next.clone();
        Ok((next, extra))
    }

    /// Runs a fresh search for both media types
    ///
    /// On failure the session records the error and the error is returned.
    /// A search superseded by a newer one returns the current session.
    pub async fn search(
        &self,
        id: Uuid,
        query: &str,
        provider: Arc<dyn RecommendationProvider>,
    ) -> AppResult<SearchSession> {
        let query = validated_query(query)?;
        let (_, ticket) = self.update(id, |session| session.begin_search(&query)).await?;

        tracing::info!(session_id = %id, query = %ticket.query, "Starting search");

        let store = self.clone();
        join(tokio::spawn(async move {
            let search_query = ticket.query.clone();
            let outcome = contained(async move {
                search::initial_search(provider.as_ref(), &search_query).await
            })
            .await;

            let (session, _) = store
                .update(id, |session| {
                    (session.complete_search(&ticket, outcome.clone()), ())
                })
                .await?;

            if session.generation != ticket.generation {
                tracing::info!(session_id = %id, "Search superseded by a newer one");
                return Ok(session);
            }

            outcome?;
            Ok(session)
        }))
        .await
    }

    /// Fetches another page of the active list
    ///
    /// Ignored (the session is returned as-is) when no fetch is allowed right
    /// now, including while another one is outstanding.
    pub async fn fetch_more(
        &self,
        id: Uuid,
        provider: Arc<dyn RecommendationProvider>,
    ) -> AppResult<SearchSession> {
        let (session, ticket) = self
            .update(id, |session| match session.begin_fetch_more() {
                Some((next, ticket)) => (next, Some(ticket)),
                None => (session.clone(), None),
            })
            .await?;

        let Some(ticket) = ticket else {
            tracing::debug!(
                session_id = %id,
                phase = ?session.phase,
                can_fetch_more = session.can_fetch_more,
                "Ignoring fetch-more request"
            );
            return Ok(session);
        };

        tracing::info!(
            session_id = %id,
            media_type = %ticket.media_type,
            excluded = ticket.exclude_titles.len(),
            "Fetching more recommendations"
        );

        let store = self.clone();
        join(tokio::spawn(async move {
            let request = ticket.clone();
            let outcome = contained(async move {
                search::fetch_more(provider.as_ref(), &request).await
            })
            .await;

            let (session, _) = store
                .update(id, |session| {
                    (session.complete_fetch_more(&ticket, outcome.clone()), ())
                })
                .await?;

            if session.generation != ticket.generation {
                tracing::info!(session_id = %id, "Fetch-more superseded by a new search");
                return Ok(session);
            }

            outcome?;
            Ok(session)
        }))
        .await
    }

    pub async fn select(&self, id: Uuid, media_type: MediaType) -> AppResult<SearchSession> {
        let (session, _) = self
            .update(id, |session| (session.select(media_type), ()))
            .await?;
        Ok(session)
    }
}
