/// Generative Language API (Gemini) provider
///
/// Sends the prompt to `models/{model}:generateContent` asking for a JSON
/// answer, then digs the recommendation payload out of the first candidate's
/// text. The API key travels in a header and never appears in a URL.
use std::time::Duration;

use reqwest::{Client as HttpClient, Response};

use crate::{
    config::Config,
    error::FetchError,
    models::{
        gemini::{ErrorEnvelope, GenerateContentRequest, GenerateContentResponse},
        RecommendationItem,
    },
    services::{
        extract::{parse_recommendations, ExtractionMode},
        providers::RecommendationProvider,
    },
};

const API_KEY_HEADER: &str = "x-goog-api-key";
const SAFETY_FINISH_REASON: &str = "SAFETY";

#[derive(Clone)]
pub struct GeminiProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
    timeout: Duration,
    extraction: ExtractionMode,
}

impl GeminiProvider {
    pub fn new(
        api_key: String,
        api_url: String,
        model: String,
        timeout: Duration,
        extraction: ExtractionMode,
    ) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            model,
            timeout,
            extraction,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.gemini_api_key.clone(),
            config.gemini_api_url.clone(),
            config.gemini_model.clone(),
            config.request_timeout(),
            config.json_extraction,
        )
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Request and envelope handling without the deadline
    async fn call(&self, prompt: &str) -> Result<String, FetchError> {
        let response = self
            .http_client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&GenerateContentRequest::json_prompt(prompt))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let envelope: GenerateContentResponse = response.json().await?;
        candidate_text(envelope)
    }
}

/// Message from the error envelope, or a status-based fallback
async fn api_error(response: Response) -> FetchError {
    let status = response.status();
    let message = response
        .json::<ErrorEnvelope>()
        .await
        .ok()
        .and_then(|envelope| envelope.error.message)
        .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));

    tracing::warn!(status = %status, message = %message, "Gemini API returned an error");
    FetchError::Api(message)
}

/// Raw text of the first candidate's first part
fn candidate_text(envelope: GenerateContentResponse) -> Result<String, FetchError> {
    let blocked_prompt = envelope
        .prompt_feedback
        .as_ref()
        .and_then(|feedback| feedback.block_reason.as_ref())
        .is_some();

    let Some(candidate) = envelope.candidates.into_iter().next() else {
        return Err(if blocked_prompt {
            FetchError::SafetyBlocked
        } else {
            FetchError::EmptyResponse
        });
    };

    match candidate.content {
        Some(content) => content
            .parts
            .into_iter()
            .next()
            .and_then(|part| part.text)
            .ok_or(FetchError::EmptyResponse),
        None if candidate.finish_reason.as_deref() == Some(SAFETY_FINISH_REASON) => {
            Err(FetchError::SafetyBlocked)
        }
        None => Err(FetchError::EmptyResponse),
    }
}

#[async_trait::async_trait]
impl RecommendationProvider for GeminiProvider {
    async fn fetch(&self, prompt: &str) -> Result<Vec<RecommendationItem>, FetchError> {
        // Dropping the call future on expiry aborts the request and its timer.
        let text = tokio::time::timeout(self.timeout, self.call(prompt))
            .await
            .map_err(|_| FetchError::Timeout)??;

        parse_recommendations(&text, self.extraction).map_err(|e| {
            tracing::error!(error = %e, raw = %text, "Could not read recommendations from model text");
            e
        })
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
