//! The loan desk: the core's external interface.
//!
//! Orchestrates the registry, session store, eligibility engine, gateway,
//! and prompt generator behind the four operations the transport layer
//! calls: start a session, post a message, fetch an application, list
//! applications.
//!
//! Locking discipline: a session's mutex is held for the duration of one
//! submit, but never across the persistence write -- the gateway may block
//! on a slow backend, and the session must stay sweepable and observable
//! meanwhile. The lock is re-acquired afterwards only to record the
//! `persisted`/`failed` transition.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use lendia_types::application::{ApplicationStatus, EligibilityResult, StoredApplication};
use lendia_types::error::DeskError;
use lendia_types::loan::LoanType;

use crate::engine::EligibilityEngine;
use crate::generate::{PromptContext, PromptGenerator, TemplatePromptGenerator};
use crate::persistence::PersistenceGateway;
use crate::product::fields::F_CUSTOMER_NAME;
use crate::product::ProductRegistry;
use crate::session::store::SessionStore;
use crate::session::{ApplicationSession, SubmitOutcome};

/// Response to a successful session start.
#[derive(Debug, Serialize)]
pub struct SessionStarted {
    pub session_id: Uuid,
    pub loan_type: LoanType,
    pub first_prompt: String,
    /// Total number of fields the product will collect.
    pub field_count: usize,
}

/// Response to one posted message.
#[derive(Debug, Serialize)]
pub struct MessageOutcome {
    /// The next assistant message: a follow-up question, a re-prompt, or
    /// the final decision summary.
    pub reply: String,
    pub state: ApplicationStatus,
    /// Present once the application has been scored and persisted.
    pub result: Option<EligibilityResult>,
}

/// Facade over the conversational core.
pub struct LoanDesk<G: PromptGenerator> {
    registry: ProductRegistry,
    engine: EligibilityEngine,
    sessions: Arc<SessionStore>,
    gateway: Arc<PersistenceGateway>,
    generator: G,
}

impl<G: PromptGenerator> LoanDesk<G> {
    pub fn new(
        registry: ProductRegistry,
        sessions: Arc<SessionStore>,
        gateway: Arc<PersistenceGateway>,
        generator: G,
    ) -> Self {
        Self {
            registry,
            engine: EligibilityEngine::new(),
            sessions,
            gateway,
            generator,
        }
    }

    /// The session store, for wiring the background sweeper.
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Registered loan types for the catalog endpoint.
    pub fn loan_types(&self) -> Vec<LoanType> {
        self.registry.loan_types()
    }

    /// Open a session for a loan type and return the first prompt.
    pub async fn start_session(&self, loan_type: &str) -> Result<SessionStarted, DeskError> {
        let product = self.registry.resolve_str(loan_type)?;
        let resolved = product.loan_type();

        let mut session = ApplicationSession::new(resolved);
        let sequence = product.field_sequence();
        let first_prompt = self
            .prompt(PromptContext::Greeting {
                loan_type: resolved,
                field: &sequence[0],
            })
            .await;
        session.set_pending_prompt(first_prompt.clone());

        let session_id = self.sessions.insert(session);
        info!(session_id = %session_id, loan_type = %resolved, "Session started");

        Ok(SessionStarted {
            session_id,
            loan_type: resolved,
            first_prompt,
            field_count: sequence.len(),
        })
    }

    /// Apply one applicant message to its session.
    ///
    /// Drives the full tail of the flow when the last field is accepted:
    /// evaluation, persistence, and the final state transition.
    pub async fn post_message(
        &self,
        session_id: Uuid,
        text: &str,
    ) -> Result<MessageOutcome, DeskError> {
        let handle = self.sessions.get(&session_id)?;
        let mut session = handle.lock().await;
        let loan_type = session.record().loan_type;
        let product = self.registry.resolve(loan_type)?;
        let total = product.field_sequence().len();

        match session.submit(product, text)? {
            SubmitOutcome::Rejected(validation) => {
                // Retry in place: same field, same cursor.
                let field = &product.field_sequence()[session.cursor()];
                let reply = self
                    .prompt(PromptContext::Retry {
                        field,
                        error: &validation,
                    })
                    .await;
                session.set_pending_prompt(reply.clone());
                Ok(MessageOutcome {
                    reply,
                    state: session.status(),
                    result: None,
                })
            }
            SubmitOutcome::Advanced { next_index } => {
                let field = &product.field_sequence()[next_index];
                let reply = self
                    .prompt(PromptContext::NextField {
                        loan_type,
                        field,
                        position: next_index,
                        total,
                    })
                    .await;
                session.set_pending_prompt(reply.clone());
                Ok(MessageOutcome {
                    reply,
                    state: session.status(),
                    result: None,
                })
            }
            SubmitOutcome::Completed => {
                let result = session.finalize(&self.engine, product)?;
                let record = session.record().clone();

                // Release the session while the gateway may block on I/O.
                drop(session);
                let saved = self.gateway.save(&record, &result).await;
                let mut session = handle.lock().await;

                match saved {
                    Ok(receipt) => {
                        session.mark_persisted();
                        if let Some(note) = &receipt.degraded {
                            warn!(application_id = %record.id, %note, "Application persisted degraded");
                        }

                        let name = record.text(F_CUSTOMER_NAME);
                        let reply = self
                            .prompt(PromptContext::Decision {
                                loan_type,
                                applicant_name: (!name.is_empty()).then_some(name),
                                result: &result,
                            })
                            .await;
                        Ok(MessageOutcome {
                            reply,
                            state: session.status(),
                            result: Some(result),
                        })
                    }
                    Err(err) => {
                        session.mark_failed();
                        error!(
                            application_id = %record.id,
                            error = %err,
                            "Persistence failed on both stores; session failed"
                        );
                        Err(DeskError::Persistence(err))
                    }
                }
            }
        }
    }

    /// Fetch one persisted application with its eligibility result.
    pub async fn get_application(&self, id: Uuid) -> Result<StoredApplication, DeskError> {
        match self.gateway.read(&id).await? {
            Some(application) => Ok(application),
            None => Err(DeskError::ApplicationNotFound),
        }
    }

    /// List persisted applications, optionally filtered by loan type.
    pub async fn list_applications(
        &self,
        loan_type: Option<LoanType>,
    ) -> Result<Vec<StoredApplication>, DeskError> {
        Ok(self.gateway.list_by_type(loan_type).await?)
    }

    /// Generate the next assistant message, degrading to the deterministic
    /// template when the generator is unavailable.
    async fn prompt(&self, context: PromptContext<'_>) -> String {
        match self.generator.generate(&context).await {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "Prompt generation unavailable, using template");
                TemplatePromptGenerator::render(&context)
            }
        }
    }
}

/// Desk wired with the deterministic template generator.
pub type TemplateLoanDesk = LoanDesk<TemplatePromptGenerator>;

impl TemplateLoanDesk {
    /// Convenience constructor with the default catalog and templates.
    pub fn with_templates(
        sessions: Arc<SessionStore>,
        gateway: Arc<PersistenceGateway>,
    ) -> Self {
        LoanDesk::new(
            ProductRegistry::default(),
            sessions,
            gateway,
            TemplatePromptGenerator::new(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::financial::calculate_emi;
    use crate::persistence::store::ApplicationStore;
    use crate::persistence::BoxApplicationStore;
    use lendia_types::application::Decision;
    use lendia_types::config::{GatewayConfig, SessionConfig};
    use lendia_types::error::{GenerationError, SessionError, StoreError};

    use std::collections::HashMap;
    use std::sync::Mutex;

    // --- In-memory store ---

    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<HashMap<Uuid, StoredApplication>>,
        fail_writes: bool,
    }

    impl MemoryStore {
        fn failing() -> Self {
            Self {
                rows: Mutex::new(HashMap::new()),
                fail_writes: true,
            }
        }
    }

    impl ApplicationStore for MemoryStore {
        fn name(&self) -> &str {
            "memory"
        }

        async fn write(&self, application: &StoredApplication) -> Result<(), StoreError> {
            if self.fail_writes {
                return Err(StoreError::Connection("down".to_string()));
            }
            self.rows
                .lock()
                .unwrap()
                .insert(application.record.id, application.clone());
            Ok(())
        }

        async fn read(&self, id: &Uuid) -> Result<Option<StoredApplication>, StoreError> {
            if self.fail_writes {
                return Err(StoreError::Connection("down".to_string()));
            }
            Ok(self.rows.lock().unwrap().get(id).cloned())
        }

        async fn list(
            &self,
            loan_type: Option<LoanType>,
        ) -> Result<Vec<StoredApplication>, StoreError> {
            if self.fail_writes {
                return Err(StoreError::Connection("down".to_string()));
            }
            Ok(self
                .rows
                .lock()
                .unwrap()
                .values()
                .filter(|app| loan_type.is_none_or(|lt| app.record.loan_type == lt))
                .cloned()
                .collect())
        }
    }

    /// Generator that always fails, to exercise the template fallback.
    struct UnavailableGenerator;

    impl PromptGenerator for UnavailableGenerator {
        fn generate(
            &self,
            _context: &PromptContext<'_>,
        ) -> impl std::future::Future<Output = Result<String, GenerationError>> + Send {
            async { Err(GenerationError::Unavailable("service offline".to_string())) }
        }
    }

    fn desk() -> TemplateLoanDesk {
        desk_with_session_config(SessionConfig::default())
    }

    fn desk_with_session_config(config: SessionConfig) -> TemplateLoanDesk {
        let gateway = PersistenceGateway::new(
            BoxApplicationStore::new(MemoryStore::default()),
            BoxApplicationStore::new(MemoryStore::default()),
            &GatewayConfig::default(),
        );
        LoanDesk::with_templates(
            Arc::new(SessionStore::new(config)),
            Arc::new(gateway),
        )
    }

    const EDUCATION_ANSWERS: &[&str] = &[
        "Riya Sharma",
        "riya.sharma@example.com",
        "9876543210",
        "24",
        "82",
        "STEM",
        "Tier1",
        "1200000",
        "5000000",
        "760",
        "Secured",
        "5",
        "800000",
    ];

    #[tokio::test]
    async fn test_education_scenario_end_to_end() {
        let desk = desk();
        let started = desk.start_session("education").await.unwrap();
        assert_eq!(started.loan_type, LoanType::Education);
        assert_eq!(started.field_count, 13);
        assert!(started.first_prompt.contains("full name"));

        // An invalid first answer re-prompts without advancing.
        let outcome = desk.post_message(started.session_id, "R").await.unwrap();
        assert_eq!(outcome.state, ApplicationStatus::Collecting);
        assert!(outcome.result.is_none());
        assert!(outcome.reply.contains("complete customer name"));

        // Answer everything; the last message carries the decision.
        let mut last = None;
        for answer in EDUCATION_ANSWERS {
            last = Some(desk.post_message(started.session_id, answer).await.unwrap());
        }
        let last = last.unwrap();
        assert_eq!(last.state, ApplicationStatus::Persisted);

        let result = last.result.unwrap();
        assert!(matches!(
            result.decision,
            Decision::Approved | Decision::Declined | Decision::Conditional
        ));
        assert_eq!(result.decision, Decision::Approved);

        // EMI consistent with the amortization formula.
        let expected = calculate_emi(result.approved_amount, result.annual_rate_percent, 60);
        assert!((result.emi - expected).abs() < 1e-6);

        // The final reply names the applicant.
        assert!(last.reply.contains("Riya Sharma"));
    }

    #[tokio::test]
    async fn test_invalid_amount_leaves_cursor_in_place() {
        let desk = desk();
        let started = desk.start_session("education").await.unwrap();

        // Walk up to the amount field, then feed it a negative value.
        for answer in &EDUCATION_ANSWERS[..EDUCATION_ANSWERS.len() - 1] {
            desk.post_message(started.session_id, answer).await.unwrap();
        }
        let outcome = desk
            .post_message(started.session_id, "-500000")
            .await
            .unwrap();
        assert_eq!(outcome.state, ApplicationStatus::Collecting);
        assert!(outcome.reply.contains("positive"));

        // The same field accepts a valid retry and the flow completes.
        let outcome = desk
            .post_message(started.session_id, "800000")
            .await
            .unwrap();
        assert_eq!(outcome.state, ApplicationStatus::Persisted);
    }

    #[tokio::test]
    async fn test_unknown_loan_type() {
        let desk = desk();
        let err = desk.start_session("mortgage").await.unwrap_err();
        assert!(matches!(err, DeskError::UnknownLoanType(_)));
    }

    #[tokio::test]
    async fn test_post_message_unknown_session() {
        let desk = desk();
        let err = desk
            .post_message(Uuid::now_v7(), "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, DeskError::Session(SessionError::NotFound)));
    }

    #[tokio::test]
    async fn test_get_application_before_finalize_is_not_found() {
        let desk = desk();
        let started = desk.start_session("car").await.unwrap();

        // The in-flight application id is not yet visible in storage.
        let handle = desk.sessions().get(&started.session_id).unwrap();
        let application_id = handle.lock().await.record().id;
        drop(handle);

        let err = desk.get_application(application_id).await.unwrap_err();
        assert!(matches!(err, DeskError::ApplicationNotFound));
    }

    #[tokio::test]
    async fn test_persisted_application_is_readable_and_listable() {
        let desk = desk();
        let started = desk.start_session("education").await.unwrap();
        for answer in EDUCATION_ANSWERS {
            desk.post_message(started.session_id, answer).await.unwrap();
        }

        let handle = desk.sessions().get(&started.session_id).unwrap();
        let application_id = handle.lock().await.record().id;
        drop(handle);

        let stored = desk.get_application(application_id).await.unwrap();
        assert_eq!(stored.record.loan_type, LoanType::Education);
        assert_eq!(stored.record.status, ApplicationStatus::Scored);
        assert_eq!(stored.result.decision, Decision::Approved);

        let education = desk
            .list_applications(Some(LoanType::Education))
            .await
            .unwrap();
        assert_eq!(education.len(), 1);
        let cars = desk.list_applications(Some(LoanType::Car)).await.unwrap();
        assert!(cars.is_empty());
    }

    #[tokio::test]
    async fn test_both_stores_down_fails_session_and_surfaces_error() {
        let gateway = PersistenceGateway::new(
            BoxApplicationStore::new(MemoryStore::failing()),
            BoxApplicationStore::new(MemoryStore::failing()),
            &GatewayConfig::default(),
        );
        let desk = LoanDesk::with_templates(
            Arc::new(SessionStore::new(SessionConfig::default())),
            Arc::new(gateway),
        );

        let started = desk.start_session("education").await.unwrap();
        for answer in &EDUCATION_ANSWERS[..EDUCATION_ANSWERS.len() - 1] {
            desk.post_message(started.session_id, answer).await.unwrap();
        }
        let err = desk
            .post_message(started.session_id, EDUCATION_ANSWERS[EDUCATION_ANSWERS.len() - 1])
            .await
            .unwrap_err();
        assert!(matches!(err, DeskError::Persistence(_)));

        // The session is terminally failed, not silently lost.
        let handle = desk.sessions().get(&started.session_id).unwrap();
        assert_eq!(handle.lock().await.status(), ApplicationStatus::Failed);
    }

    #[tokio::test]
    async fn test_expired_session_is_unreachable() {
        let desk = desk_with_session_config(SessionConfig {
            idle_timeout_minutes: 0,
            audit_retention_hours: 24,
            sweep_interval_secs: 60,
        });
        let started = desk.start_session("education").await.unwrap();

        // Any inactivity now exceeds the zero-minute window.
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        desk.sessions().sweep_expired(chrono::Utc::now());

        let err = desk
            .post_message(started.session_id, "Riya Sharma")
            .await
            .unwrap_err();
        assert!(matches!(err, DeskError::Session(SessionError::NotFound)));
    }

    #[tokio::test]
    async fn test_generator_failure_degrades_to_template() {
        let gateway = PersistenceGateway::new(
            BoxApplicationStore::new(MemoryStore::default()),
            BoxApplicationStore::new(MemoryStore::default()),
            &GatewayConfig::default(),
        );
        let desk = LoanDesk::new(
            ProductRegistry::default(),
            Arc::new(SessionStore::new(SessionConfig::default())),
            Arc::new(gateway),
            UnavailableGenerator,
        );

        // The session still opens with a usable templated prompt.
        let started = desk.start_session("gold").await.unwrap();
        assert!(started.first_prompt.contains("full name"));

        let outcome = desk
            .post_message(started.session_id, "Suresh Iyer")
            .await
            .unwrap();
        assert_eq!(outcome.state, ApplicationStatus::Collecting);
        assert!(outcome.reply.contains("email"));
    }
}
