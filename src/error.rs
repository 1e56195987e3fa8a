//! Request-level error taxonomy and its JSON wire format.
//!
//! Every variant maps to a fixed status code, message, and type tag. Handlers
//! return `Result<_, ApiError>` and axum renders the error through
//! [`IntoResponse`].

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::models::CorruptField;

/// Type tag carried by every error body.
const API_ERROR_TYPE: &str = "api_error";

/// Errors a request can end in.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A query or path parameter failed validation. The payload says which
    /// and is only logged; clients always see the fixed message.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No rows survived the filters, or the requested station does not exist.
    #[error("resource not found")]
    NotFound,

    /// The store could not be reached or the query failed.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] sqlx::Error),

    /// A stored row could not be materialized.
    #[error(transparent)]
    CorruptRow(#[from] CorruptField),
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub status_code: u16,
}

impl ApiError {
    // ---
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidParameter(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::StorageUnavailable(_) | ApiError::CorruptRow(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing message. Fixed per variant.
    pub fn message(&self) -> &'static str {
        match self {
            ApiError::InvalidParameter(_) => "Bad query parameter.",
            ApiError::NotFound => "Resource not found.",
            ApiError::StorageUnavailable(_) | ApiError::CorruptRow(_) => "Internal server error.",
        }
    }

    /// Value of the `X-Error` response header.
    fn header(&self) -> &'static str {
        match self {
            ApiError::InvalidParameter(_) => "Bad query parameter",
            ApiError::NotFound => "Resource not found",
            ApiError::StorageUnavailable(_) | ApiError::CorruptRow(_) => "Internal server error",
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            message: self.message(),
            kind: API_ERROR_TYPE,
            status_code: self.status_code().as_u16(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // ---
        match &self {
            ApiError::InvalidParameter(reason) => tracing::debug!("Rejecting request: {}", reason),
            ApiError::NotFound => tracing::debug!("No matching resource"),
            ApiError::StorageUnavailable(_) | ApiError::CorruptRow(_) => {
                tracing::error!("Request failed: {}", self)
            }
        }

        let mut response = (self.status_code(), Json(self.body())).into_response();
        response
            .headers_mut()
            .insert("x-error", HeaderValue::from_static(self.header()));
        response
    }
}
