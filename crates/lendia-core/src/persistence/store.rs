//! ApplicationStore trait definition.
//!
//! The port implemented by each storage backend (SQLite, JSON files).
//! Implementations live in lendia-infra. Uses native async fn in traits
//! (RPITIT); the object-safe wrapper is [`super::BoxApplicationStore`].

use uuid::Uuid;

use lendia_types::application::StoredApplication;
use lendia_types::error::StoreError;
use lendia_types::loan::LoanType;

/// One durable backend for scored applications.
pub trait ApplicationStore: Send + Sync {
    /// Short backend name for logs ("sqlite", "jsonfile").
    fn name(&self) -> &str;

    /// Write one scored application. Replaces an existing row with the
    /// same id, so retries are idempotent.
    fn write(
        &self,
        application: &StoredApplication,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Read one application by id. `Ok(None)` is a miss, not a failure.
    fn read(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<StoredApplication>, StoreError>> + Send;

    /// List applications, newest first, optionally filtered by loan type.
    fn list(
        &self,
        loan_type: Option<LoanType>,
    ) -> impl std::future::Future<Output = Result<Vec<StoredApplication>, StoreError>> + Send;
}
