use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use news_core::NewsError;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing or invalid admin token")]
    Unauthorized,
    #[error("settings writes are disabled")]
    WritesDisabled,
    #[error("proxy failure: {0}")]
    Proxy(#[source] NewsError),
    #[error("server error: {0}")]
    Internal(#[from] NewsError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::WritesDisabled => StatusCode::FORBIDDEN,
            ApiError::Proxy(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "Unauthorized",
            ApiError::WritesDisabled => "Forbidden",
            ApiError::Proxy(_) => "Proxy failure",
            ApiError::Internal(_) => "Server error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(error = %self, "request failed");
        }
        let details = match &self {
            ApiError::Proxy(err) | ApiError::Internal(err) => err.to_string(),
            other => other.to_string(),
        };
        (status, Json(json!({ "error": self.label(), "details": details }))).into_response()
    }
}
