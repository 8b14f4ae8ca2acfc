// Error type shared by the key lifecycle components and the HTTP layer

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JwksError {
    #[error("No valid keys available")]
    NoValidKey,

    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Same body shape for every failure: `{"error": "<message>"}`.
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
}

impl IntoResponse for JwksError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            JwksError::NoValidKey => (StatusCode::SERVICE_UNAVAILABLE, "No valid keys available."),
            JwksError::KeyGeneration(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Key pair generation failed.")
            }
            JwksError::Signing(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Token signing failed."),
            JwksError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "An internal error occurred.")
            }
        };

        if !matches!(self, JwksError::NoValidKey) {
            tracing::error!(error = %self, "request failed");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
