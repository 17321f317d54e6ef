//! Error responses for the control API
//!
//! Every error is returned as a JSON body with an `error` field.

use crate::control::ModeError;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

pub const PERMISSION_DENIED_MESSAGE: &str =
    "Permission denied. Service must run as root to modify config.";
pub const PERMISSION_DENIED_HINT: &str =
    "Run the microservice with sudo or configure proper permissions";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 400 - missing or invalid input
    BadRequest(String),
    /// 403 - config file not writable by this process
    PermissionDenied,
    /// 500 - anything else, with the raw message
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PermissionDenied => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ModeError> for ApiError {
    fn from(err: ModeError) -> Self {
        match err {
            ModeError::PermissionDenied { .. } => ApiError::PermissionDenied,
            ModeError::Io(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = match self {
            ApiError::BadRequest(message) | ApiError::Internal(message) => {
                json!({ "error": message })
            }
            ApiError::PermissionDenied => json!({
                "error": PERMISSION_DENIED_MESSAGE,
                "hint": PERMISSION_DENIED_HINT,
            }),
        };
        (status, Json(body)).into_response()
    }
}
