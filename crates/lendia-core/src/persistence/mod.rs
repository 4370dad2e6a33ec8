//! Durable persistence: the storage port and the fallback gateway.
//!
//! The gateway never touches a database directly; it composes two
//! [`store::ApplicationStore`] instances (primary and secondary) behind a
//! fixed try-primary-then-secondary policy.

pub mod box_store;
pub mod gateway;
pub mod store;

pub use box_store::BoxApplicationStore;
pub use gateway::{PersistenceGateway, SaveReceipt};
pub use store::ApplicationStore;
