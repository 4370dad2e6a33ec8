//! Infrastructure adapters for Lendia.
//!
//! Implements the storage port from `lendia-core` twice: a SQLite store
//! (the structured, queryable primary) and a JSON file store (the local,
//! durable secondary the gateway falls back to). Also hosts the data-dir
//! resolution and `config.toml` loading.

pub mod config;
pub mod filestore;
pub mod sqlite;
