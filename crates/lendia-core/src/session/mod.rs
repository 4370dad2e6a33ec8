//! Conversational application session: the collection state machine.
//!
//! A session walks an applicant through its product's field sequence one
//! question at a time. A rejected answer leaves the cursor where it is and
//! the same question is re-asked -- retry in place, never a hard failure.
//! Reaching the end of the sequence is the only path to `complete`.

pub mod store;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use lendia_types::application::{ApplicationRecord, ApplicationStatus, EligibilityResult};
use lendia_types::error::{SessionError, ValidationError};
use lendia_types::loan::{FieldSpec, LoanType};

use crate::engine::EligibilityEngine;
use crate::product::LoanProduct;

/// One prompt/reply exchange in the conversation history.
#[derive(Debug, Clone)]
pub struct Turn {
    pub prompt: String,
    pub reply: String,
}

/// Outcome of submitting one applicant message.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Value accepted; the cursor now points at `next_index`.
    Advanced { next_index: usize },
    /// Value accepted and the field sequence is complete.
    Completed,
    /// Validation failed; cursor and state unchanged, re-ask the same field.
    Rejected(ValidationError),
}

/// A single applicant's in-progress conversation for one loan type.
///
/// Owned exclusively by the [`store::SessionStore`]; per-session mutual
/// exclusion is the store's mutex, not this type's concern.
#[derive(Debug)]
pub struct ApplicationSession {
    id: Uuid,
    record: ApplicationRecord,
    cursor: usize,
    history: Vec<Turn>,
    /// The prompt most recently shown to the applicant; paired with the
    /// next reply when it arrives.
    pending_prompt: String,
    last_activity: DateTime<Utc>,
}

impl ApplicationSession {
    /// Start a session: fresh record, cursor at the first field.
    pub fn new(loan_type: LoanType) -> Self {
        Self {
            id: Uuid::now_v7(),
            record: ApplicationRecord::new(loan_type),
            cursor: 0,
            history: Vec::new(),
            pending_prompt: String::new(),
            last_activity: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn record(&self) -> &ApplicationRecord {
        &self.record
    }

    pub fn status(&self) -> ApplicationStatus {
        self.record.status
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    /// The field the applicant is currently being asked, if collecting.
    pub fn current_field<'a>(&self, product: &'a dyn LoanProduct) -> Option<&'a FieldSpec> {
        product.field_sequence().get(self.cursor)
    }

    /// Record the prompt just shown to the applicant.
    pub fn set_pending_prompt(&mut self, prompt: impl Into<String>) {
        self.pending_prompt = prompt.into();
    }

    /// Apply one applicant reply to the field at the cursor.
    ///
    /// Only valid while `collecting`. On acceptance the value is stored and
    /// the cursor advances; on the last field the record transitions to
    /// `complete`. A validation failure is a normal outcome, not an error.
    pub fn submit(
        &mut self,
        product: &dyn LoanProduct,
        raw: &str,
    ) -> Result<SubmitOutcome, SessionError> {
        if self.record.status != ApplicationStatus::Collecting {
            return Err(SessionError::InvalidState {
                current: self.record.status,
                attempted: "submit",
            });
        }

        self.last_activity = Utc::now();
        self.history.push(Turn {
            prompt: std::mem::take(&mut self.pending_prompt),
            reply: raw.to_string(),
        });

        // The cursor stays below the sequence length while collecting; the
        // transition to complete happens the moment it reaches the end.
        let sequence = product.field_sequence();
        let spec = &sequence[self.cursor];

        match product.validate(spec.name, raw) {
            Ok(value) => {
                self.record.fields.insert(spec.name.to_string(), value);
                self.cursor += 1;
                if self.cursor == sequence.len() {
                    self.record.status = ApplicationStatus::Complete;
                    Ok(SubmitOutcome::Completed)
                } else {
                    Ok(SubmitOutcome::Advanced {
                        next_index: self.cursor,
                    })
                }
            }
            Err(err) => Ok(SubmitOutcome::Rejected(err)),
        }
    }

    /// Score the completed record, transitioning it to `scored`.
    ///
    /// Only valid in `complete`; persistence and the final `persisted` /
    /// `failed` transition are driven by the caller, which must not hold
    /// this session locked across the storage write.
    pub fn finalize(
        &mut self,
        engine: &EligibilityEngine,
        product: &dyn LoanProduct,
    ) -> Result<EligibilityResult, SessionError> {
        if self.record.status != ApplicationStatus::Complete {
            return Err(SessionError::InvalidState {
                current: self.record.status,
                attempted: "finalize",
            });
        }

        self.last_activity = Utc::now();
        engine
            .evaluate(&mut self.record, product)
            .map_err(|_| SessionError::InvalidState {
                current: self.record.status,
                attempted: "finalize",
            })
    }

    /// Mark the application durably stored.
    pub fn mark_persisted(&mut self) {
        self.record.status = ApplicationStatus::Persisted;
        self.last_activity = Utc::now();
    }

    /// Terminal failure: expiry, abandonment, or unrecoverable persistence.
    pub fn mark_failed(&mut self) {
        self.record.status = ApplicationStatus::Failed;
        self.last_activity = Utc::now();
    }

    /// Whether the session has been idle longer than `timeout` as of `now`.
    pub fn idle_since(&self, now: DateTime<Utc>, timeout: chrono::Duration) -> bool {
        now - self.last_activity > timeout
    }

    #[cfg(test)]
    pub(crate) fn set_last_activity(&mut self, at: DateTime<Utc>) {
        self.last_activity = at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::gold::GoldLoan;
    use crate::product::registry::ProductRegistry;
    use lendia_types::config::GoldTerms;

    fn gold() -> GoldLoan {
        GoldLoan::new(GoldTerms::default())
    }

    const GOLD_ANSWERS: &[&str] = &[
        "Suresh Iyer",
        "suresh.iyer@example.com",
        "8876543210",
        "45",
        "600000",
        "720",
        "Salaried",
        "800000",
        "500000",
        "2",
    ];

    #[test]
    fn test_valid_submit_advances_cursor_by_one() {
        let product = gold();
        let mut session = ApplicationSession::new(LoanType::Gold);
        session.set_pending_prompt("name?");

        let outcome = session.submit(&product, "Suresh Iyer").unwrap();
        assert!(matches!(outcome, SubmitOutcome::Advanced { next_index: 1 }));
        assert_eq!(session.cursor(), 1);
        assert_eq!(session.status(), ApplicationStatus::Collecting);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_invalid_submit_keeps_cursor_and_state() {
        let product = gold();
        let mut session = ApplicationSession::new(LoanType::Gold);

        // Name then email; a bad email must not advance.
        session.submit(&product, "Suresh Iyer").unwrap();
        let outcome = session.submit(&product, "not-an-email").unwrap();

        match outcome {
            SubmitOutcome::Rejected(err) => assert_eq!(err.field, "Customer_Email"),
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(session.cursor(), 1);
        assert_eq!(session.status(), ApplicationStatus::Collecting);
        // The failed exchange still lands in history.
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn test_completing_all_fields_transitions_to_complete() {
        let product = gold();
        let mut session = ApplicationSession::new(LoanType::Gold);

        for (i, answer) in GOLD_ANSWERS.iter().enumerate() {
            let outcome = session.submit(&product, answer).unwrap();
            if i + 1 == GOLD_ANSWERS.len() {
                assert!(matches!(outcome, SubmitOutcome::Completed));
            } else {
                assert!(matches!(outcome, SubmitOutcome::Advanced { .. }));
            }
        }
        assert_eq!(session.status(), ApplicationStatus::Complete);
        assert_eq!(session.cursor(), product.field_sequence().len());
    }

    #[test]
    fn test_submit_after_complete_is_invalid_state() {
        let product = gold();
        let mut session = ApplicationSession::new(LoanType::Gold);
        for answer in GOLD_ANSWERS {
            session.submit(&product, answer).unwrap();
        }

        let err = session.submit(&product, "anything").unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidState {
                current: ApplicationStatus::Complete,
                attempted: "submit",
            }
        );
    }

    #[test]
    fn test_finalize_requires_complete() {
        let product = gold();
        let mut session = ApplicationSession::new(LoanType::Gold);
        let engine = EligibilityEngine::new();

        let err = session.finalize(&engine, &product).unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidState {
                current: ApplicationStatus::Collecting,
                attempted: "finalize",
            }
        );
    }

    #[test]
    fn test_finalize_scores_the_record() {
        let product = gold();
        let mut session = ApplicationSession::new(LoanType::Gold);
        for answer in GOLD_ANSWERS {
            session.submit(&product, answer).unwrap();
        }

        let engine = EligibilityEngine::new();
        let result = session.finalize(&engine, &product).unwrap();
        assert_eq!(session.status(), ApplicationStatus::Scored);
        assert!(result.approved_amount > 0.0);

        // Finalizing twice is an invalid state transition.
        let err = session.finalize(&engine, &product).unwrap_err();
        assert!(matches!(err, SessionError::InvalidState { .. }));
    }

    #[test]
    fn test_current_field_tracks_cursor() {
        let registry = ProductRegistry::default();
        let product = registry.resolve(LoanType::Gold).unwrap();
        let mut session = ApplicationSession::new(LoanType::Gold);

        assert_eq!(session.current_field(product).unwrap().name, "Customer_Name");
        session.submit(product, "Suresh Iyer").unwrap();
        assert_eq!(session.current_field(product).unwrap().name, "Customer_Email");
    }
}
