use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Why a single recommendation batch could not be produced
///
/// Display strings are the messages shown to the user as-is.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("The request took too long and was timed out. Please try again.")]
    Timeout,

    #[error("{0}")]
    Api(String),

    #[error("The query was blocked for safety reasons. Please try a different query.")]
    SafetyBlocked,

    #[error("The AI returned an empty or invalid response.")]
    EmptyResponse,

    #[error("AI did not return a recognizable JSON object.")]
    NoJsonFound,

    #[error("AI response was malformed and could not be repaired.")]
    MalformedJson,

    #[error("Network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            AppError::Fetch(err) => {
                let status = match err {
                    FetchError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                    FetchError::SafetyBlocked => StatusCode::UNPROCESSABLE_ENTITY,
                    _ => StatusCode::BAD_GATEWAY,
                };
                (status, err.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
