//! Primary-then-secondary persistence gateway.
//!
//! Writes try the primary store first under a bounded per-attempt timeout;
//! any primary failure falls back to the secondary transparently, with the
//! degradation logged rather than surfaced. The caller sees failure only
//! when both stores reject the operation -- a scored application is never
//! lost silently. Reads follow the same policy, preferring the primary and
//! falling through to the secondary on failure or miss.

use std::time::Duration;

use chrono::Utc;
use tracing::{error, warn};
use uuid::Uuid;

use lendia_types::application::{
    ApplicationRecord, ApplicationStatus, EligibilityResult, StoredApplication,
};
use lendia_types::config::GatewayConfig;
use lendia_types::error::{GatewayError, StoreError};
use lendia_types::loan::LoanType;

use super::box_store::BoxApplicationStore;

/// Receipt for a successful save, naming the store that accepted it.
#[derive(Debug)]
pub struct SaveReceipt {
    /// Backend that accepted the write.
    pub store: String,
    /// Degradation notice when the secondary had to take the write.
    pub degraded: Option<String>,
}

/// Durable write/read path over a primary and a secondary store.
pub struct PersistenceGateway {
    primary: BoxApplicationStore,
    secondary: BoxApplicationStore,
    attempt_timeout: Duration,
}

impl PersistenceGateway {
    pub fn new(
        primary: BoxApplicationStore,
        secondary: BoxApplicationStore,
        config: &GatewayConfig,
    ) -> Self {
        Self {
            primary,
            secondary,
            attempt_timeout: config.attempt_timeout(),
        }
    }

    /// Persist a scored application.
    ///
    /// Requires `record.status == scored`; the gateway performs no other
    /// validation. Succeeds if either store accepts the write.
    pub async fn save(
        &self,
        record: &ApplicationRecord,
        result: &EligibilityResult,
    ) -> Result<SaveReceipt, GatewayError> {
        if record.status != ApplicationStatus::Scored {
            return Err(GatewayError::InvalidRecordState(record.status));
        }

        let application = StoredApplication {
            record: record.clone(),
            result: result.clone(),
            persisted_at: Utc::now(),
        };

        let primary_err = match self.attempt_write(&self.primary, &application).await {
            Ok(()) => {
                return Ok(SaveReceipt {
                    store: self.primary.name().to_string(),
                    degraded: None,
                });
            }
            Err(err) => err,
        };

        warn!(
            application_id = %record.id,
            store = self.primary.name(),
            error = %primary_err,
            "Primary store rejected write, falling back to secondary"
        );

        match self.attempt_write(&self.secondary, &application).await {
            Ok(()) => Ok(SaveReceipt {
                store: self.secondary.name().to_string(),
                degraded: Some(format!(
                    "primary store '{}' unavailable ({primary_err}), wrote to '{}'",
                    self.primary.name(),
                    self.secondary.name()
                )),
            }),
            Err(secondary_err) => {
                let err = GatewayError::BothStoresFailed {
                    primary: primary_err,
                    secondary: secondary_err,
                };
                error!(
                    application_id = %record.id,
                    error = %err,
                    "Both stores rejected the write"
                );
                Err(err)
            }
        }
    }

    /// Read one application, preferring the primary.
    ///
    /// A primary miss also falls through to the secondary: during a past
    /// degradation the row may have landed there.
    pub async fn read(&self, id: &Uuid) -> Result<Option<StoredApplication>, GatewayError> {
        let primary_err = match self.attempt(self.primary.read(id)).await {
            Ok(Some(application)) => return Ok(Some(application)),
            Ok(None) => None,
            Err(err) => {
                warn!(
                    store = self.primary.name(),
                    error = %err,
                    "Primary store read failed, falling back to secondary"
                );
                Some(err)
            }
        };

        match self.attempt(self.secondary.read(id)).await {
            Ok(found) => Ok(found),
            Err(secondary_err) => match primary_err {
                Some(primary) => Err(GatewayError::BothStoresFailed {
                    primary,
                    secondary: secondary_err,
                }),
                // Primary answered (a miss); a secondary failure then means
                // the application is simply not visible anywhere healthy.
                None => Ok(None),
            },
        }
    }

    /// List applications by type, preferring the primary.
    pub async fn list_by_type(
        &self,
        loan_type: Option<LoanType>,
    ) -> Result<Vec<StoredApplication>, GatewayError> {
        let primary_err = match self.attempt(self.primary.list(loan_type)).await {
            Ok(applications) => return Ok(applications),
            Err(err) => {
                warn!(
                    store = self.primary.name(),
                    error = %err,
                    "Primary store list failed, falling back to secondary"
                );
                err
            }
        };

        self.attempt(self.secondary.list(loan_type))
            .await
            .map_err(|secondary_err| GatewayError::BothStoresFailed {
                primary: primary_err,
                secondary: secondary_err,
            })
    }

    async fn attempt_write(
        &self,
        store: &BoxApplicationStore,
        application: &StoredApplication,
    ) -> Result<(), StoreError> {
        self.attempt(store.write(application)).await
    }

    /// Bound one store attempt so a hung backend cannot stall the caller
    /// past the fallback budget.
    async fn attempt<T>(
        &self,
        operation: impl std::future::Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.attempt_timeout, operation).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::store::ApplicationStore;
    use lendia_types::application::Decision;

    use std::collections::HashMap;
    use std::sync::Mutex;

    // --- Mock stores ---

    /// In-memory store that can be told to fail or hang.
    struct MockStore {
        name: String,
        rows: Mutex<HashMap<Uuid, StoredApplication>>,
        mode: Mode,
    }

    #[derive(Clone, Copy)]
    enum Mode {
        Ok,
        Failing,
        Hanging,
    }

    impl MockStore {
        fn ok(name: &str) -> Self {
            Self::with_mode(name, Mode::Ok)
        }

        fn failing(name: &str) -> Self {
            Self::with_mode(name, Mode::Failing)
        }

        fn hanging(name: &str) -> Self {
            Self::with_mode(name, Mode::Hanging)
        }

        fn with_mode(name: &str, mode: Mode) -> Self {
            Self {
                name: name.to_string(),
                rows: Mutex::new(HashMap::new()),
                mode,
            }
        }

        async fn gate(&self) -> Result<(), StoreError> {
            match self.mode {
                Mode::Ok => Ok(()),
                Mode::Failing => Err(StoreError::Connection("connection refused".to_string())),
                Mode::Hanging => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(())
                }
            }
        }
    }

    impl ApplicationStore for MockStore {
        fn name(&self) -> &str {
            &self.name
        }

        async fn write(&self, application: &StoredApplication) -> Result<(), StoreError> {
            self.gate().await?;
            self.rows
                .lock()
                .unwrap()
                .insert(application.record.id, application.clone());
            Ok(())
        }

        async fn read(&self, id: &Uuid) -> Result<Option<StoredApplication>, StoreError> {
            self.gate().await?;
            Ok(self.rows.lock().unwrap().get(id).cloned())
        }

        async fn list(
            &self,
            loan_type: Option<LoanType>,
        ) -> Result<Vec<StoredApplication>, StoreError> {
            self.gate().await?;
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

    fn scored_record() -> (ApplicationRecord, EligibilityResult) {
        let mut record = ApplicationRecord::new(LoanType::Education);
        record.status = ApplicationStatus::Scored;
        let result = EligibilityResult {
            decision: Decision::Approved,
            approved_amount: 800_000.0,
            annual_rate_percent: 9.5,
            emi: 16_801.0,
            reasons: vec!["test".to_string()],
        };
        (record, result)
    }

    fn gateway(primary: MockStore, secondary: MockStore) -> PersistenceGateway {
        PersistenceGateway::new(
            BoxApplicationStore::new(primary),
            BoxApplicationStore::new(secondary),
            &GatewayConfig {
                attempt_timeout_ms: 200,
            },
        )
    }

    #[tokio::test]
    async fn test_save_happy_path_uses_primary() {
        let gateway = gateway(MockStore::ok("sqlite"), MockStore::ok("jsonfile"));
        let (record, result) = scored_record();

        let receipt = gateway.save(&record, &result).await.unwrap();
        assert_eq!(receipt.store, "sqlite");
        assert!(receipt.degraded.is_none());

        let stored = gateway.read(&record.id).await.unwrap().unwrap();
        assert_eq!(stored.record.id, record.id);
    }

    #[tokio::test]
    async fn test_save_falls_back_when_primary_fails() {
        let gateway = gateway(MockStore::failing("sqlite"), MockStore::ok("jsonfile"));
        let (record, result) = scored_record();

        let receipt = gateway.save(&record, &result).await.unwrap();
        assert_eq!(receipt.store, "jsonfile");
        let degraded = receipt.degraded.unwrap();
        assert!(degraded.contains("sqlite"), "got: {degraded}");

        // The row is readable through the fallback read path.
        let stored = gateway.read(&record.id).await.unwrap().unwrap();
        assert_eq!(stored.record.id, record.id);
    }

    #[tokio::test]
    async fn test_save_fails_only_when_both_stores_fail() {
        let gateway = gateway(MockStore::failing("sqlite"), MockStore::failing("jsonfile"));
        let (record, result) = scored_record();

        let err = gateway.save(&record, &result).await.unwrap_err();
        assert!(matches!(err, GatewayError::BothStoresFailed { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_primary_times_out_and_falls_back() {
        let gateway = gateway(MockStore::hanging("sqlite"), MockStore::ok("jsonfile"));
        let (record, result) = scored_record();

        let receipt = gateway.save(&record, &result).await.unwrap();
        assert_eq!(receipt.store, "jsonfile");
        assert!(receipt.degraded.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_save_rejects_unscored_record() {
        let gateway = gateway(MockStore::ok("sqlite"), MockStore::ok("jsonfile"));
        let (mut record, result) = scored_record();
        record.status = ApplicationStatus::Collecting;

        let err = gateway.save(&record, &result).await.unwrap_err();
        assert_eq!(
            err,
            GatewayError::InvalidRecordState(ApplicationStatus::Collecting)
        );
    }

    #[tokio::test]
    async fn test_read_miss_on_primary_checks_secondary() {
        let primary = MockStore::ok("sqlite");
        let secondary = MockStore::ok("jsonfile");
        let (record, result) = scored_record();

        // Seed only the secondary, as after a degraded save.
        let application = StoredApplication {
            record: record.clone(),
            result,
            persisted_at: Utc::now(),
        };
        secondary.write(&application).await.unwrap();

        let gateway = gateway(primary, secondary);
        let stored = gateway.read(&record.id).await.unwrap().unwrap();
        assert_eq!(stored.record.id, record.id);
    }

    #[tokio::test]
    async fn test_read_absent_everywhere_is_none() {
        let gateway = gateway(MockStore::ok("sqlite"), MockStore::ok("jsonfile"));
        assert!(gateway.read(&Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_falls_back_and_filters() {
        let primary = MockStore::failing("sqlite");
        let secondary = MockStore::ok("jsonfile");
        let (record, result) = scored_record();
        let application = StoredApplication {
            record,
            result,
            persisted_at: Utc::now(),
        };
        secondary.write(&application).await.unwrap();

        let gateway = gateway(primary, secondary);
        let education = gateway
            .list_by_type(Some(LoanType::Education))
            .await
            .unwrap();
        assert_eq!(education.len(), 1);

        let cars = gateway.list_by_type(Some(LoanType::Car)).await.unwrap();
        assert!(cars.is_empty());
    }
}
