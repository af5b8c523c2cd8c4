//! # API Errors
//!
//! Maps store failures to HTTP responses with a `{"detail": "..."}` body.

use crate::infrastructure::persistence::RepositoryError;
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable reason.
    pub detail: String,
}

/// Error returned by handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No record with the requested key. Holds the entity label.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Business key already taken. Holds the entity label.
    #[error("{0} ID already exists")]
    Duplicate(&'static str),

    /// Missing or malformed credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Request body, path or query string could not be extracted.
    #[error("{detail}")]
    Rejected {
        /// Status chosen by the extractor.
        status: StatusCode,
        /// Extractor message.
        detail: String,
    },

    /// Any other store failure.
    #[error("internal error: {0}")]
    Internal(RepositoryError),
}

impl ApiError {
    /// Returns the HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Duplicate(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Rejected { status, .. } => *status,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity_type, .. } => Self::NotFound(entity_type),
            RepositoryError::Duplicate { entity_type, .. } => Self::Duplicate(entity_type),
            other => Self::Internal(other),
        }
    }
}

macro_rules! from_rejection {
    ($($rejection:ty),+) => {
        $(
            impl From<$rejection> for ApiError {
                fn from(rejection: $rejection) -> Self {
                    Self::Rejected {
                        status: rejection.status(),
                        detail: rejection.body_text(),
                    }
                }
            }
        )+
    };
}

from_rejection!(JsonRejection, PathRejection, QueryRejection);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            Self::Internal(err) => {
                error!(error = %err, "request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        let mut response = (status, Json(ErrorResponse { detail })).into_response();
        if matches!(self, Self::Unauthorized(_)) {
            response.headers_mut().insert(
                axum::http::header::WWW_AUTHENTICATE,
                axum::http::HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}
