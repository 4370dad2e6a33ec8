//! Shared domain types for Lendia.
//!
//! This crate contains the core domain types used across the Lendia platform:
//! loan products and field specs, application records, eligibility results,
//! configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod application;
pub mod config;
pub mod error;
pub mod loan;
