//! SQLite persistence: the structured, queryable primary store.

pub mod application;
pub mod pool;

pub use application::SqliteApplicationStore;
pub use pool::DatabasePool;
