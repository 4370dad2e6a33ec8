//! BoxApplicationStore -- object-safe dynamic dispatch wrapper for
//! ApplicationStore.
//!
//! 1. Define an object-safe `ApplicationStoreDyn` trait with boxed futures
//! 2. Blanket-impl `ApplicationStoreDyn` for all `T: ApplicationStore`
//! 3. `BoxApplicationStore` wraps `Box<dyn ApplicationStoreDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use uuid::Uuid;

use lendia_types::application::StoredApplication;
use lendia_types::error::StoreError;
use lendia_types::loan::LoanType;

use super::store::ApplicationStore;

/// Object-safe version of [`ApplicationStore`] with boxed futures.
///
/// Exists solely to enable dynamic dispatch; a blanket implementation is
/// provided for all types implementing `ApplicationStore`.
pub trait ApplicationStoreDyn: Send + Sync {
    fn name(&self) -> &str;

    fn write_boxed<'a>(
        &'a self,
        application: &'a StoredApplication,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + 'a>>;

    fn read_boxed<'a>(
        &'a self,
        id: &'a Uuid,
    ) -> Pin<Box<dyn Future<Output = Result<Option<StoredApplication>, StoreError>> + Send + 'a>>;

    fn list_boxed<'a>(
        &'a self,
        loan_type: Option<LoanType>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<StoredApplication>, StoreError>> + Send + 'a>>;
}

/// Blanket implementation: any `ApplicationStore` is an `ApplicationStoreDyn`.
impl<T: ApplicationStore> ApplicationStoreDyn for T {
    fn name(&self) -> &str {
        ApplicationStore::name(self)
    }

    fn write_boxed<'a>(
        &'a self,
        application: &'a StoredApplication,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + 'a>> {
        Box::pin(self.write(application))
    }

    fn read_boxed<'a>(
        &'a self,
        id: &'a Uuid,
    ) -> Pin<Box<dyn Future<Output = Result<Option<StoredApplication>, StoreError>> + Send + 'a>>
    {
        Box::pin(self.read(id))
    }

    fn list_boxed<'a>(
        &'a self,
        loan_type: Option<LoanType>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<StoredApplication>, StoreError>> + Send + 'a>> {
        Box::pin(self.list(loan_type))
    }
}

/// Type-erased application store for runtime backend selection.
///
/// `ApplicationStore` uses RPITIT and cannot be a trait object directly;
/// this wrapper provides equivalent methods delegating to the inner
/// `ApplicationStoreDyn` object.
pub struct BoxApplicationStore {
    inner: Box<dyn ApplicationStoreDyn + Send + Sync>,
}

impl BoxApplicationStore {
    /// Wrap a concrete `ApplicationStore` in a type-erased box.
    pub fn new<T: ApplicationStore + 'static>(store: T) -> Self {
        Self {
            inner: Box::new(store),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn write(&self, application: &StoredApplication) -> Result<(), StoreError> {
        self.inner.write_boxed(application).await
    }

    pub async fn read(&self, id: &Uuid) -> Result<Option<StoredApplication>, StoreError> {
        self.inner.read_boxed(id).await
    }

    pub async fn list(
        &self,
        loan_type: Option<LoanType>,
    ) -> Result<Vec<StoredApplication>, StoreError> {
        self.inner.list_boxed(loan_type).await
    }
}
