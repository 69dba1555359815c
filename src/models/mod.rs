use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;

pub mod gemini;

/// Kind of media a recommendation list holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Movies,
    TvShows,
}

impl MediaType {
    pub const ALL: [MediaType; 2] = [MediaType::Movies, MediaType::TvShows];

    /// Wording used when asking the model for this kind of media
    pub fn prompt_label(&self) -> &'static str {
        match self {
            MediaType::Movies => "movies",
            MediaType::TvShows => "TV shows",
        }
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prompt_label())
    }
}

/// A single movie or TV show suggested by the model
///
/// The title is the only identity a recommendation has; it doubles as the
/// exclusion key when asking for further pages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationItem {
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    /// Expected on a 0-10 scale; absent means unknown
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub streaming_platforms: Vec<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of the stateless single-batch endpoint
#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub query: String,
    pub media_type: MediaType,
    #[serde(default)]
    pub exclude_titles: Vec<String>,
}
