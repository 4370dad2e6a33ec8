//! Conversational flow HTTP handlers.
//!
//! Endpoints:
//! - POST /api/v1/chat/start   - Open a session for a loan type
//! - POST /api/v1/chat/message - Post one applicant message

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use lendia_core::desk::{MessageOutcome, SessionStarted};

use crate::http::error::AppError;
use crate::state::AppState;

/// Request body for POST /chat/start.
#[derive(Debug, Deserialize)]
pub struct StartChatRequest {
    /// Loan type identifier: education, home, personal, gold, business, car.
    pub loan_type: String,
}

/// Request body for POST /chat/message.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub session_id: Uuid,
    pub message: String,
}

/// POST /api/v1/chat/start - open a session and return the first prompt.
pub async fn start_chat(
    State(state): State<AppState>,
    Json(request): Json<StartChatRequest>,
) -> Result<Json<SessionStarted>, AppError> {
    let started = state.desk.start_session(&request.loan_type).await?;
    Ok(Json(started))
}

/// POST /api/v1/chat/message - apply one applicant message to its session.
pub async fn post_message(
    State(state): State<AppState>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<MessageOutcome>, AppError> {
    let outcome = state
        .desk
        .post_message(request.session_id, &request.message)
        .await?;
    Ok(Json(outcome))
}
