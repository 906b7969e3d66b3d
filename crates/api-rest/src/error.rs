//! # API Error Types
//!
//! Maps storage and configuration errors to HTTP status codes with a short plain-text body.
//! Internal details of 5xx errors are logged but never returned to clients.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use holdings_core::{CoreError, FilesError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Files(#[from] FilesError),

    #[error(transparent)]
    Core(#[from] CoreError),

    /// Missing or wrong Basic credentials. Carries the offered user name, if any.
    #[error("Authentication failure for {0}")]
    Unauthorized(String),

    /// A blocking task panicked or was cancelled.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Files(err) => match err {
                FilesError::InvalidId(_) | FilesError::InvalidPath(_) => StatusCode::BAD_REQUEST,
                FilesError::Traversal { .. } => StatusCode::UNAUTHORIZED,
                FilesError::Locked(_) => StatusCode::LOCKED,
                FilesError::HoldingNotFound(_) | FilesError::FileNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                FilesError::InvalidRootDirectory(_) | FilesError::Io(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Core(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Files(FilesError::Traversal { .. }) => "path escapes the holding".to_string(),
            Self::Files(FilesError::HoldingNotFound(_)) => "holding not found on disk".to_string(),
            Self::Unauthorized(_) => "API key is incorrect".to_string(),
            other if other.status().is_server_error() => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "request rejected");
        }

        let body = format!("{}\n", self.public_message());
        let mut response = (status, body).into_response();
        if matches!(self, Self::Unauthorized(_)) {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                header::HeaderValue::from_static("Basic realm=\"holdings\""),
            );
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holdings_core::HoldingId;
    use std::path::PathBuf;

    fn id() -> HoldingId {
        HoldingId::parse("0f5e2a3c-9b1d-4c8e-a7f6-3d2b1c0e9f8a").unwrap()
    }

    #[test]
    fn test_status_mapping() {
        let invalid = HoldingId::parse("nope").unwrap_err();
        assert_eq!(
            ApiError::from(FilesError::from(invalid)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(FilesError::InvalidPath(".".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(FilesError::Traversal {
                root: PathBuf::from("/lib"),
                target: PathBuf::from("../x"),
            })
            .status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(FilesError::Locked(id())).status(),
            StatusCode::LOCKED
        );
        assert_eq!(
            ApiError::from(FilesError::HoldingNotFound(id())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(FilesError::Io(std::io::Error::other("disk"))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Unauthorized("bob".into()).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_internal_detail_hidden() {
        let err = ApiError::from(FilesError::Io(std::io::Error::other("/secret/path")));
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_traversal_does_not_leak_root() {
        let err = ApiError::from(FilesError::Traversal {
            root: PathBuf::from("/srv/library/ab/x/music"),
            target: PathBuf::from("../lock"),
        });
        assert!(!err.public_message().contains("/srv/library"));
    }

    #[test]
    fn test_unauthorized_sets_challenge() {
        let response = ApiError::Unauthorized("bob".into()).into_response();
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    }
}
