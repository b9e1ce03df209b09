use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Client-visible request failures. Attempt-level delivery failures are
/// data, not errors — they never surface here.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("message not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Store(err) => {
                error!("store error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "store unavailable".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub(crate) fn join_error(e: tokio::task::JoinError) -> ApiError {
    ApiError::Store(anyhow::anyhow!("task join error: {e}"))
}
