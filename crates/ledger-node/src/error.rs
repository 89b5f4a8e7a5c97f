use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ledger_core::LedgerError;
use serde_json::json;

/// Failure while reconciling against a single peer.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error("request to {peer} failed: {source}")]
    Fetch {
        peer: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{peer} answered {status}")]
    Status {
        peer: String,
        status: reqwest::StatusCode,
    },
    #[error("could not decode chain from {peer}: {source}")]
    Decode {
        peer: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("chain from {peer} exceeds {limit} bytes")]
    TooLarge { peer: String, limit: usize },
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("validation task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Error body returned by every handler: `{"error": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
