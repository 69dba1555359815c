//! Search session state and its transitions.
//!
//! A [`SearchSession`] is a plain value. Every transition borrows the current
//! value and returns the next one, so callers swap the whole state in a
//! single assignment once an asynchronous step has settled.
//!
//! ```text
//! Idle ──search──▶ Searching ──complete──▶ Ready ──more──▶ FetchingMore
//!                      ▲                     ▲                 │
//!                      └──────search─────────┴────complete─────┘
//! ```
//!
//! Each search bumps the session generation. Completions carry the generation
//! they were started under; stale ones are discarded, which is how a new
//! search supersedes anything still in flight.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::FetchError,
    models::{MediaType, RecommendationItem},
    services::prompt::PAGE_SIZE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    Searching,
    Ready,
    FetchingMore,
}

/// Permission to run the initial search for one generation
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTicket {
    pub generation: u64,
    pub query: String,
}

/// Permission to fetch one more page of the active list
#[derive(Debug, Clone, PartialEq)]
pub struct FetchMoreTicket {
    pub generation: u64,
    pub query: String,
    pub media_type: MediaType,
    pub exclude_titles: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SearchSession {
    pub id: Uuid,
    pub query: String,
    pub movies: Vec<RecommendationItem>,
    pub tv_shows: Vec<RecommendationItem>,
    pub active: MediaType,
    pub phase: SessionPhase,
    pub can_fetch_more: bool,
    pub has_searched: bool,
    pub error: Option<String>,
    pub generation: u64,
    pub updated_at: DateTime<Utc>,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchSession {
    /// Creates an idle session with no query
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            query: String::new(),
            movies: Vec::new(),
            tv_shows: Vec::new(),
            active: MediaType::Movies,
            phase: SessionPhase::Idle,
            can_fetch_more: true,
            has_searched: false,
            error: None,
            generation: 0,
            updated_at: Utc::now(),
        }
    }

    pub fn items(&self, media_type: MediaType) -> &[RecommendationItem] {
        match media_type {
            MediaType::Movies => &self.movies,
            MediaType::TvShows => &self.tv_shows,
        }
    }

    fn items_mut(&mut self, media_type: MediaType) -> &mut Vec<RecommendationItem> {
        match media_type {
            MediaType::Movies => &mut self.movies,
            MediaType::TvShows => &mut self.tv_shows,
        }
    }

    fn touched(mut self) -> Self {
        self.updated_at = Utc::now();
        self
    }

    /// Starts a new search, clearing both lists before anything is fetched
    ///
    /// Allowed from every phase; whatever was in flight becomes stale.
    pub fn begin_search(&self, query: &str) -> (Self, SearchTicket) {
        let generation = self.generation + 1;
        let next = Self {
            query: query.to_string(),
            movies: Vec::new(),
            tv_shows: Vec::new(),
            phase: SessionPhase::Searching,
            can_fetch_more: true,
            has_searched: true,
            error: None,
            generation,
            ..self.clone()
        }
        .touched();

        let ticket = SearchTicket {
            generation,
            query: query.to_string(),
        };
        (next, ticket)
    }

    /// Applies the joint outcome of the movies and TV-shows fetches
    ///
    /// Either both lists are installed or, on any failure, both stay empty
    /// and the error is recorded.
    pub fn complete_search(
        &self,
        ticket: &SearchTicket,
        outcome: Result<(Vec<RecommendationItem>, Vec<RecommendationItem>), FetchError>,
    ) -> Self {
        if ticket.generation != self.generation || self.phase != SessionPhase::Searching {
            tracing::debug!(
                session_id = %self.id,
                stale_generation = ticket.generation,
                generation = self.generation,
                "Discarding superseded search result"
            );
            return self.clone();
        }

        let mut next = Self {
            phase: SessionPhase::Ready,
            ..self.clone()
        };

        match outcome {
            Ok((movies, tv_shows)) => {
                next.active = if movies.is_empty() && !tv_shows.is_empty() {
                    MediaType::TvShows
                } else {
                    MediaType::Movies
                };
                next.movies = movies;
                next.tv_shows = tv_shows;
            }
            Err(e) => {
                next.movies.clear();
                next.tv_shows.clear();
                next.error = Some(e.to_string());
            }
        }

        next.touched()
    }

    /// Reserves a fetch-more call for the active list
    ///
    /// Returns `None` when nothing may be fetched: no completed search, the
    /// list is exhausted, or another fetch is already outstanding.
    pub fn begin_fetch_more(&self) -> Option<(Self, FetchMoreTicket)> {
        if self.phase != SessionPhase::Ready || !self.can_fetch_more {
            return None;
        }

        let ticket = FetchMoreTicket {
            generation: self.generation,
            query: self.query.clone(),
            media_type: self.active,
            exclude_titles: self
                .items(self.active)
                .iter()
                .map(|item| item.title.clone())
                .collect(),
        };

        let next = Self {
            phase: SessionPhase::FetchingMore,
            error: None,
            ..self.clone()
        }
        .touched();

        Some((next, ticket))
    }

    /// Applies a fetch-more outcome to the list it was requested for
    ///
    /// Failures leave every list untouched.
    pub fn complete_fetch_more(
        &self,
        ticket: &FetchMoreTicket,
        outcome: Result<Vec<RecommendationItem>, FetchError>,
    ) -> Self {
        if ticket.generation != self.generation || self.phase != SessionPhase::FetchingMore {
            tracing::debug!(
                session_id = %self.id,
                stale_generation = ticket.generation,
                generation = self.generation,
                "Discarding superseded fetch-more result"
            );
            return self.clone();
        }

        let mut next = Self {
            phase: SessionPhase::Ready,
            ..self.clone()
        };

        match outcome {
            Ok(items) => {
                if items.len() < PAGE_SIZE {
                    next.can_fetch_more = false;
                }
                if !items.is_empty() {
                    next.items_mut(ticket.media_type).extend(items);
                }
            }
            Err(e) => next.error = Some(e.to_string()),
        }

        next.touched()
    }

    /// Switches the visible list
    pub fn select(&self, media_type: MediaType) -> Self {
        Self {
            active: media_type,
            ..self.clone()
        }
        .touched()
    }

    /// True once the session has been idle for longer than `ttl`
    pub fn is_expired(&self, ttl: Duration) -> bool {
        (Utc::now() - self.updated_at)
            .to_std()
            .map(|idle| idle > ttl)
            .unwrap_or(false)
    }
}
