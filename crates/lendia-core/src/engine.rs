//! Eligibility engine: the single gate between a completed application and
//! its scored result.
//!
//! Scoring itself is a pure product function; the engine's job is the
//! status discipline around it. A record is scored exactly once -- a second
//! evaluation is rejected rather than silently served from a cache, so
//! callers can never double-count an offer.

use lendia_types::application::{ApplicationRecord, ApplicationStatus, EligibilityResult};
use lendia_types::error::EngineError;
use tracing::info;

use crate::product::LoanProduct;

/// Evaluates completed applications against their product's scoring rules.
#[derive(Debug, Default, Clone, Copy)]
pub struct EligibilityEngine;

impl EligibilityEngine {
    pub fn new() -> Self {
        Self
    }

    /// Score a completed record, transitioning it to `scored`.
    ///
    /// Fails with [`EngineError::IncompleteApplication`] when collection has
    /// not finished, and with [`EngineError::AlreadyScored`] when the record
    /// was evaluated before.
    pub fn evaluate(
        &self,
        record: &mut ApplicationRecord,
        product: &dyn LoanProduct,
    ) -> Result<EligibilityResult, EngineError> {
        match record.status {
            ApplicationStatus::Complete => {}
            ApplicationStatus::Scored | ApplicationStatus::Persisted => {
                return Err(EngineError::AlreadyScored);
            }
            other => return Err(EngineError::IncompleteApplication(other)),
        }

        let result = product.score(record);
        record.status = ApplicationStatus::Scored;

        info!(
            application_id = %record.id,
            loan_type = %record.loan_type,
            decision = %result.decision,
            approved_amount = result.approved_amount,
            "Application scored"
        );
        Ok(result)
    }
}
