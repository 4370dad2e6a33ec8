//! Loan product categories and field specifications.
//!
//! A `LoanProduct` (defined in lendia-core) owns an ordered sequence of
//! [`FieldSpec`]s describing the data it collects from an applicant.
//! Specs are built once at product construction and never mutated.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// The six loan categories Lendia originates.
///
/// Immutable once chosen for a session. Maps to the CHECK constraint in the
/// SQLite schema: `CHECK (loan_type IN ('education', 'home', 'personal',
/// 'gold', 'business', 'car'))`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanType {
    Education,
    Home,
    Personal,
    Gold,
    Business,
    Car,
}

impl LoanType {
    /// All loan types, in catalog order.
    pub const ALL: [LoanType; 6] = [
        LoanType::Education,
        LoanType::Home,
        LoanType::Personal,
        LoanType::Gold,
        LoanType::Business,
        LoanType::Car,
    ];

    /// Short customer-facing description, used by the catalog endpoint.
    pub const fn description(self) -> &'static str {
        match self {
            LoanType::Education => "Loans for higher education, courses, and academic expenses",
            LoanType::Home => {
                "Loans for purchasing, constructing, or renovating residential properties"
            }
            LoanType::Personal => {
                "Unsecured loans for personal expenses like medical, travel, or weddings"
            }
            LoanType::Gold => "Secured loans against gold jewelry and ornaments",
            LoanType::Business => {
                "Loans for business expansion, working capital, and commercial purposes"
            }
            LoanType::Car => "Loans for purchasing new and used cars",
        }
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanType::Education => write!(f, "education"),
            LoanType::Home => write!(f, "home"),
            LoanType::Personal => write!(f, "personal"),
            LoanType::Gold => write!(f, "gold"),
            LoanType::Business => write!(f, "business"),
            LoanType::Car => write!(f, "car"),
        }
    }
}

impl FromStr for LoanType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "education" => Ok(LoanType::Education),
            "home" => Ok(LoanType::Home),
            "personal" => Ok(LoanType::Personal),
            "gold" => Ok(LoanType::Gold),
            "business" => Ok(LoanType::Business),
            "car" => Ok(LoanType::Car),
            other => Err(format!("unknown loan type: '{other}'")),
        }
    }
}

/// Semantic type of one collected field, with its validation bounds.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// A plain number (age, score, tenure). Commas are tolerated, Indian
    /// amount units are not.
    Number { min: f64, max: f64, integer: bool },
    /// A monetary amount in INR. Accepts "5,00,000", "5 lakh", "1.2 cr".
    Amount { min: f64, max: f64 },
    /// Free text with a minimum trimmed length.
    Text { min_len: usize },
    /// An email address.
    Email,
    /// A 10-digit Indian mobile number starting with 6-9.
    Phone,
    /// An ISO date (YYYY-MM-DD).
    Date,
    /// One of a fixed set of options, matched case-insensitively.
    Choice { options: &'static [&'static str] },
}

/// Describes one datum a loan product requires: name, semantic kind, and the
/// question the applicant is asked. Owned by its product, never mutated
/// after registration.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub prompt: String,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn new(name: &'static str, prompt: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name,
            prompt: prompt.into(),
            kind,
        }
    }
}

/// A validated field value stored in an application record.
///
/// Tagged serde representation so values round-trip exactly through the
/// JSON column of the backing stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Choice(String),
    Date(NaiveDate),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::Choice(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Text(s) | FieldValue::Choice(s) => write!(f, "{s}"),
            FieldValue::Date(d) => write!(f, "{d}"),
        }
    }
}
