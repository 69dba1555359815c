//! Locating the JSON payload inside a model's free-form text answer.
//!
//! Models asked for JSON still wrap it in prose or code fences now and then.
//! Two strategies are available:
//!
//! - [`ExtractionMode::Greedy`] takes everything from the first `{` to the
//!   last `}`. Unrelated brace groups before or after the payload corrupt it.
//! - [`ExtractionMode::Balanced`] scans for top-level brace-balanced spans
//!   (ignoring braces inside string literals). The first one that parses
//!   and carries a `recommendations` key wins, otherwise the first one that
//!   parses.

use serde::Deserialize;
use serde_json::Value;

use crate::{error::FetchError, models::RecommendationItem};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    Greedy,
    #[default]
    Balanced,
}

/// Span from the first `{` to the last `}` after it
pub fn greedy_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Every top-level brace-balanced span, in order of appearance
///
/// Single pass over `text`. An opening brace that is never closed does not
/// hide a later object: spans closed inside it are still reported.
pub fn balanced_spans(text: &str) -> Vec<&str> {
    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut open: Vec<usize> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' if !open.is_empty() => in_string = true,
            '{' => open.push(idx),
            '}' => {
                let Some(start) = open.pop() else {
                    continue;
                };
                // Spans closed inside this one were nested, not top-level.
                while spans.last().is_some_and(|&(inner, _)| inner > start) {
                    spans.pop();
                }
                spans.push((start, idx + ch.len_utf8()));
            }
            _ => {}
        }
    }

    spans.into_iter().map(|(start, end)| &text[start..end]).collect()
}

/// Parses the JSON object embedded in `text`
pub fn extract_payload(text: &str, mode: ExtractionMode) -> Result<Value, FetchError> {
    match mode {
        ExtractionMode::Greedy => {
            let span = greedy_span(text).ok_or(FetchError::NoJsonFound)?;
            serde_json::from_str(span).map_err(|e| {
                tracing::error!(error = %e, extracted = %span, "Extracted JSON could not be parsed");
                FetchError::MalformedJson
            })
        }
        ExtractionMode::Balanced => {
            let spans = balanced_spans(text);
            if spans.is_empty() {
                return Err(FetchError::NoJsonFound);
            }

            let parsed: Vec<Value> = spans
                .iter()
                .filter_map(|span| serde_json::from_str::<Value>(span).ok())
                .collect();

            let payload = parsed
                .iter()
                .position(|value| value.get("recommendations").is_some())
                .unwrap_or(0);

            parsed
                .into_iter()
                .nth(payload)
                .ok_or_else(|| {
                    tracing::error!(
                        candidates = spans.len(),
                        "No brace-balanced span parsed as JSON"
                    );
                    FetchError::MalformedJson
                })
        }
    }
}

/// Reads the `recommendations` array out of a parsed payload
///
/// A missing or non-array key yields an empty batch. Entries that are not
/// readable items, or have a blank title, are dropped.
pub fn recommendations_from(payload: &Value) -> Vec<RecommendationItem> {
    let Some(entries) = payload.get("recommendations").and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match RecommendationItem::deserialize(entry) {
            Ok(item) if !item.title.trim().is_empty() => Some(item),
            Ok(_) => {
                tracing::warn!("Dropping recommendation with blank title");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Dropping unreadable recommendation");
                None
            }
        })
        .collect()
}

/// Full text-to-batch step of the fetcher
pub fn parse_recommendations(
    text: &str,
    mode: ExtractionMode,
) -> Result<Vec<RecommendationItem>, FetchError> {
    let payload = extract_payload(text, mode)?;
    Ok(recommendations_from(&payload))
}
