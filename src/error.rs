//! Error taxonomy for the matching/playlist core.
//!
//! Stores keep returning `anyhow::Result` internally; the managers wrap
//! rule violations in these variants so the HTTP layer can map them onto
//! status codes without string matching.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed request content: bad action value, self-swipe, missing
    /// song payload. Rejected before any mutation.
    #[error("{0}")]
    Validation(String),

    /// Duplicate swipe, duplicate track, duplicate membership. Rejected
    /// without mutation; callers treat it as a no-op with explanation.
    #[error("{0}")]
    Conflict(String),

    /// The named entity was absent.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The caller is not a party to the match/playlist it addressed.
    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let status = match &self {
            CoreError::Validation(_) => StatusCode::BAD_REQUEST,
            CoreError::Conflict(_) => StatusCode::CONFLICT,
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
            CoreError::Storage(err) => {
                tracing::error!("Storage error: {:?}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_entity() {
        assert_eq!(CoreError::NotFound("Match").to_string(), "Match not found");
    }
}
