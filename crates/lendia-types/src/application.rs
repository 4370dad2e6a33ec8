//! Application records, eligibility results, and their lifecycle status.
//!
//! An `ApplicationRecord` is the single applicant-facing unit of data: the
//! validated field map for one loan type. It is mutated only by the owning
//! session during collection and becomes immutable once scored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::loan::{FieldValue, LoanType};

/// Lifecycle status of an application.
///
/// Progresses `collecting -> complete -> scored -> persisted`; `failed` is
/// terminal and reachable from any non-terminal state. Maps to the CHECK
/// constraint in the SQLite schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Collecting,
    Complete,
    Scored,
    Persisted,
    Failed,
}

impl ApplicationStatus {
    /// Whether the application has reached a state it can never leave.
    pub const fn is_terminal(self) -> bool {
        matches!(self, ApplicationStatus::Persisted | ApplicationStatus::Failed)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationStatus::Collecting => write!(f, "collecting"),
            ApplicationStatus::Complete => write!(f, "complete"),
            ApplicationStatus::Scored => write!(f, "scored"),
            ApplicationStatus::Persisted => write!(f, "persisted"),
            ApplicationStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "collecting" => Ok(ApplicationStatus::Collecting),
            "complete" => Ok(ApplicationStatus::Complete),
            "scored" => Ok(ApplicationStatus::Scored),
            "persisted" => Ok(ApplicationStatus::Persisted),
            "failed" => Ok(ApplicationStatus::Failed),
            other => Err(format!("invalid application status: '{other}'")),
        }
    }
}

impl Default for ApplicationStatus {
    fn default() -> Self {
        ApplicationStatus::Collecting
    }
}

/// One applicant's data for a single loan type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: Uuid,
    pub loan_type: LoanType,
    /// Field name to validated value. Never holds a value that failed its
    /// spec's predicate.
    pub fields: BTreeMap<String, FieldValue>,
    pub created_at: DateTime<Utc>,
    pub status: ApplicationStatus,
}

impl ApplicationRecord {
    /// Create a fresh record in `collecting` status.
    pub fn new(loan_type: LoanType) -> Self {
        Self {
            id: Uuid::now_v7(),
            loan_type,
            fields: BTreeMap::new(),
            created_at: Utc::now(),
            status: ApplicationStatus::Collecting,
        }
    }

    /// Numeric field lookup for scoring.
    ///
    /// Missing or non-numeric fields read as zero; a complete record always
    /// carries a validated value for every field its product collects.
    pub fn number(&self, name: &str) -> f64 {
        self.fields
            .get(name)
            .and_then(FieldValue::as_number)
            .unwrap_or(0.0)
    }

    /// Textual field lookup for scoring (text and choice values).
    pub fn text(&self, name: &str) -> &str {
        self.fields
            .get(name)
            .and_then(FieldValue::as_str)
            .unwrap_or("")
    }
}

/// Outcome of scoring one application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Declined,
    Conditional,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Approved => write!(f, "approved"),
            Decision::Declined => write!(f, "declined"),
            Decision::Conditional => write!(f, "conditional"),
        }
    }
}

impl FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "approved" => Ok(Decision::Approved),
            "declined" => Ok(Decision::Declined),
            "conditional" => Ok(Decision::Conditional),
            other => Err(format!("invalid decision: '{other}'")),
        }
    }
}

/// Eligibility decision with computed terms.
///
/// Produced at most once per application record; the engine enforces this by
/// rejecting a second evaluation rather than silently returning a cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub decision: Decision,
    /// Amount offered, in INR. Zero when declined.
    pub approved_amount: f64,
    /// Annual interest rate as a percentage (e.g. 10.5 for 10.5%).
    pub annual_rate_percent: f64,
    /// Monthly repayment at the offered amount and rate.
    pub emi: f64,
    /// Human-readable reasons behind the decision.
    pub reasons: Vec<String>,
}

/// A scored application as written to the backing stores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredApplication {
    pub record: ApplicationRecord,
    pub result: EligibilityResult,
    pub persisted_at: DateTime<Utc>,
}
