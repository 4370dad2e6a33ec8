//! Application error type mapping to HTTP status codes.
//!
//! The mapping follows the error taxonomy: lookup misses are 404, caller
//! state errors are 409, malformed requests are 400, and a double storage
//! failure is 502 so clients can distinguish "retry later" from their own
//! mistakes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use lendia_types::error::{DeskError, GatewayError, SessionError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Errors surfaced by the loan desk.
    Desk(DeskError),
    /// Malformed request (bad UUID, bad query parameter).
    BadRequest(String),
}

impl From<DeskError> for AppError {
    fn from(e: DeskError) -> Self {
        AppError::Desk(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Desk(DeskError::UnknownLoanType(e)) => {
                (StatusCode::NOT_FOUND, "UNKNOWN_LOAN_TYPE", e.to_string())
            }
            AppError::Desk(DeskError::Session(SessionError::NotFound)) => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                "Session not found".to_string(),
            ),
            AppError::Desk(DeskError::Session(e @ SessionError::InvalidState { .. })) => {
                (StatusCode::CONFLICT, "INVALID_SESSION_STATE", e.to_string())
            }
            AppError::Desk(DeskError::Engine(e)) => {
                (StatusCode::CONFLICT, "INVALID_SESSION_STATE", e.to_string())
            }
            AppError::Desk(DeskError::ApplicationNotFound) => (
                StatusCode::NOT_FOUND,
                "APPLICATION_NOT_FOUND",
                "Application not found".to_string(),
            ),
            AppError::Desk(DeskError::Persistence(e @ GatewayError::InvalidRecordState(_))) => {
                (StatusCode::CONFLICT, "INVALID_RECORD_STATE", e.to_string())
            }
            AppError::Desk(DeskError::Persistence(e @ GatewayError::BothStoresFailed { .. })) => (
                StatusCode::BAD_GATEWAY,
                "PERSISTENCE_FAILED",
                format!("{e}; please retry"),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
