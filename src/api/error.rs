//! Error responses
//!
//! Every failure leaves the API as `{success: false, message}`. Ledger errors map
//! to a status by kind; request bodies that cannot be decoded are a 400.

use crate::types::LedgerError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tokio::task::JoinError;
use tracing::error;

const PERSISTENCE_MESSAGE: &str = "Failed to save data";

/// Error body shared by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

/// An error ready to be rendered as an HTTP response
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Session lookups answer 401 for unknown and expired tokens alike
    pub fn unauthorized(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound { .. } | LedgerError::Expired { .. } => {
                ApiError::new(StatusCode::UNAUTHORIZED, err.to_string())
            }
            other => other.into(),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        let status = match &err {
            LedgerError::NotFound { .. } => StatusCode::NOT_FOUND,
            LedgerError::Expired { .. } => StatusCode::UNAUTHORIZED,
            LedgerError::Persistence { .. } | LedgerError::ArithmeticOverflow { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ if err.is_validation() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match err {
            LedgerError::Persistence { .. } => PERSISTENCE_MESSAGE.to_string(),
            other => other.to_string(),
        };
        ApiError { status, message }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            format!("Invalid request body: {}", rejection.body_text()),
        )
    }
}

impl From<JoinError> for ApiError {
    fn from(err: JoinError) -> Self {
        error!(error = %err, "blocking task failed");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            success: false,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
