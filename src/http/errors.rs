//! HTTP-facing error type.
//!
//! Handlers and middleware return [`ApiError`]; its response carries the
//! status and an [`ErrorMessage`] extension that the error view layer turns
//! into the XML error document.

use axum::Extension;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error;

use crate::errors::{AuthError, HttpError, ImageError, RegistrationError, StorageError};

/// Human readable message attached to error responses
#[derive(Clone, Debug)]
pub struct ErrorMessage(pub String);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    PayloadTooLarge(String),
}

impl ApiError {
    pub fn not_found(what: &str) -> Self {
        ApiError::NotFound(format!("{} not found.", what))
    }

    pub fn missing_parameter(name: &'static str) -> Self {
        RegistrationError::MissingParameter(name).into()
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(err) => err.status(),
            ApiError::Registration(err) => err.status(),
            ApiError::Image(ImageError::UnsupportedFileType) => StatusCode::BAD_REQUEST,
            ApiError::Image(ImageError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Storage(_) | ApiError::Http(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
            "Internal server error.".to_string()
        } else {
            self.to_string()
        };

        (status, Extension(ErrorMessage(message))).into_response()
    }
}
