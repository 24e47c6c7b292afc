//! Application error types and HTTP response mapping.
//!
//! Defines `AppError` for every failure a request can hit and implements
//! Axum's `IntoResponse` to turn it into a status code with a JSON body.
//!
//! Error mappings:
//! - `RepoNotFound`, `PathNotFound`, `CommitNotFound` → 404
//! - `InvalidPath`, `InvalidQuery`, blame range and binary-file errors → 400
//! - malformed or unreadable ignore-revs file → 422
//! - `Git`, `Internal`, history failures → 500

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::blame::BlameError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Blame error: {0}")]
    Blame(#[from] BlameError),

    #[error("Repository not found: {0}")]
    RepoNotFound(String),

    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Commit not found: {0}")]
    CommitNotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Git(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::RepoNotFound(_) | AppError::PathNotFound(_) | AppError::CommitNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            AppError::InvalidPath(_) | AppError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            AppError::Blame(e) => match e {
                BlameError::BinaryBlob | BlameError::RangeOutOfBounds { .. } => {
                    StatusCode::BAD_REQUEST
                }
                BlameError::IgnoreList(_) => StatusCode::UNPROCESSABLE_ENTITY,
                BlameError::Unattributed { .. } | BlameError::History(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blame::{HistoryError, IgnoreListError};
    use test_case::test_case;

    #[test_case(AppError::PathNotFound("a.rs".into()), StatusCode::NOT_FOUND ; "missing path")]
    #[test_case(AppError::InvalidPath("dir".into()), StatusCode::BAD_REQUEST ; "invalid path")]
    #[test_case(AppError::Blame(BlameError::BinaryBlob), StatusCode::BAD_REQUEST ; "binary")]
    #[test_case(
        AppError::Blame(BlameError::RangeOutOfBounds { start: 5, end: 9, total: 3 }),
        StatusCode::BAD_REQUEST ; "range"
    )]
    #[test_case(
        AppError::Blame(BlameError::IgnoreList(IgnoreListError::Malformed { line_number: 2, content: "zz".into() })),
        StatusCode::UNPROCESSABLE_ENTITY ; "malformed ignore file"
    )]
    #[test_case(AppError::Blame(BlameError::Unattributed { line: 4 }), StatusCode::INTERNAL_SERVER_ERROR ; "unattributed")]
    #[test_case(
        AppError::Blame(BlameError::History(HistoryError::Backend("boom".into()))),
        StatusCode::INTERNAL_SERVER_ERROR ; "history"
    )]
    fn test_status_mapping(error: AppError, expected: StatusCode) {
        assert_eq!(error.status(), expected);
    }

    #[tokio::test]
    async fn test_response_body_carries_message() {
        let response = AppError::CommitNotFound("deadbeef".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Commit not found: deadbeef");
    }
}
