/*
 * Responsibility
 * - AppError shared by the HTTP surface
 * - IntoResponse (HTTP status / JSON error body)
 * - ClaimError from the pipeline mapped to a status in one place
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::claims::ClaimError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::BadRequest { code, message } => (StatusCode::BAD_REQUEST, code, message),
            AppError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error".into(),
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ClaimError> for AppError {
    fn from(e: ClaimError) -> Self {
        match e {
            ClaimError::MalformedHeader | ClaimError::MalformedToken { .. } => {
                AppError::Unauthorized(e.to_string())
            }
            ClaimError::InvalidHeaderValue { .. } => {
                AppError::bad_request("INVALID_CLAIM_HEADER", e.to_string())
            }
            // Matching errors are consumed by conditions and verifiers and
            // never leave the pipeline; treat one escaping as a server bug.
            ClaimError::MissingExpectedValue { .. } | ClaimError::ResourceMismatch { .. } => {
                AppError::Internal
            }
        }
    }
}
