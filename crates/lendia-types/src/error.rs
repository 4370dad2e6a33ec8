//! Error types for Lendia, one enum per concern.
//!
//! The taxonomy follows how callers must react:
//! - [`ValidationError`]: user-correctable; the session keeps its state and
//!   re-asks the same question.
//! - [`SessionError`], [`EngineError`], [`GatewayError::InvalidRecordState`]:
//!   caller state errors, surfaced as 4xx-equivalents.
//! - [`ProductError`], lookup misses: surfaced as not-found.
//! - [`StoreError`], [`GenerationError`]: dependency failures, recovered
//!   locally where a fallback exists.
//! - [`GatewayError::BothStoresFailed`]: fatal; always logged and returned,
//!   never swallowed.

use thiserror::Error;

use crate::application::ApplicationStatus;

/// A rejected applicant input. The session stays in `collecting` and the
/// same prompt is re-asked.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{reason}")]
pub struct ValidationError {
    /// Name of the field that rejected the input.
    pub field: String,
    /// Human-readable explanation, shown to the applicant verbatim.
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors related to product lookup.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    #[error("unknown loan type: '{0}'")]
    UnknownLoanType(String),
}

/// Errors related to session lifecycle and state transitions.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SessionError {
    #[error("session not found")]
    NotFound,

    #[error("operation '{attempted}' is invalid in session state '{current}'")]
    InvalidState {
        current: ApplicationStatus,
        attempted: &'static str,
    },
}

/// Errors from the eligibility engine.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    #[error("application is not complete (status: '{0}')")]
    IncompleteApplication(ApplicationStatus),

    #[error("application has already been scored")]
    AlreadyScored,
}

/// Errors from one backing store. Recovered by the gateway where the other
/// store can take the operation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("store connection error: {0}")]
    Connection(String),

    #[error("store query error: {0}")]
    Query(String),

    #[error("store serialization error: {0}")]
    Serialization(String),

    #[error("store attempt timed out")]
    Timeout,
}

/// Errors from the persistence gateway.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GatewayError {
    /// The record was not scored before being handed to storage.
    #[error("record is not scored (status: '{0}')")]
    InvalidRecordState(ApplicationStatus),

    /// Both the primary and the secondary store rejected the operation.
    #[error("both stores failed (primary: {primary}; secondary: {secondary})")]
    BothStoresFailed {
        primary: StoreError,
        secondary: StoreError,
    },
}

/// The injected text-generation capability is unavailable. Callers fall
/// back to templated prompts; a session is never aborted over this.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GenerationError {
    #[error("text generation unavailable: {0}")]
    Unavailable(String),
}

/// Facade-level error union returned by the desk operations, ready for
/// transport mapping by the API layer.
#[derive(Debug, Clone, Error)]
pub enum DeskError {
    #[error(transparent)]
    UnknownLoanType(#[from] ProductError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("application not found")]
    ApplicationNotFound,

    #[error(transparent)]
    Persistence(#[from] GatewayError),
}
