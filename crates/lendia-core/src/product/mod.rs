//! Loan products: one polymorphic implementation per loan category.
//!
//! Each product owns its ordered field sequence, its validation bounds, and
//! a pure scoring function over a completed application record. Products
//! are registered once at startup in the [`ProductRegistry`] and selected
//! by [`LoanType`].

pub mod business;
pub mod car;
pub mod education;
pub mod fields;
pub mod gold;
pub mod home;
pub mod personal;
pub mod registry;

pub use registry::ProductRegistry;

use lendia_types::application::{ApplicationRecord, EligibilityResult};
use lendia_types::error::ValidationError;
use lendia_types::loan::{FieldSpec, FieldValue, LoanType};

/// One loan category's contract: its field sequence, validation, and scoring.
///
/// `score` must be a pure function of the record's field values -- no hidden
/// state, no I/O -- so it is deterministic and testable in isolation.
pub trait LoanProduct: Send + Sync + std::fmt::Debug {
    fn loan_type(&self) -> LoanType;

    /// Ordered fields the applicant must answer. Identical on every call.
    fn field_sequence(&self) -> &[FieldSpec];

    /// Score a completed record into a decision with computed terms.
    fn score(&self, record: &ApplicationRecord) -> EligibilityResult;

    /// Validate one raw input against the named field's spec.
    fn validate(&self, field_name: &str, raw: &str) -> Result<FieldValue, ValidationError> {
        match self
            .field_sequence()
            .iter()
            .find(|spec| spec.name == field_name)
        {
            Some(spec) => fields::validate(spec, raw),
            None => Err(ValidationError::new(
                field_name,
                format!("No field named '{field_name}' for this product."),
            )),
        }
    }
}

/// Rate adjustment by CIBIL band, shared across products.
///
/// Products apply their own modifiers (collateral, risk class, car type) on
/// top and clamp to their own band where one exists.
pub(crate) fn cibil_rate_adjustment(cibil: f64) -> f64 {
    if cibil >= 800.0 {
        -1.0
    } else if cibil >= 750.0 {
        -0.5
    } else if cibil >= 700.0 {
        0.0
    } else if cibil >= 650.0 {
        0.75
    } else {
        1.5
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Helpers for product scoring tests: build a complete record by
    //! walking a product's field sequence and validating sample answers.

    use std::collections::HashMap;

    use lendia_types::application::{ApplicationRecord, ApplicationStatus};

    use super::LoanProduct;

    /// Build a complete, validated record from raw per-field answers.
    ///
    /// Panics when an answer is missing or fails validation, so a scoring
    /// test never runs against a record the state machine could not reach.
    pub fn complete_record(product: &dyn LoanProduct, answers: &[(&str, &str)]) -> ApplicationRecord {
        let answers: HashMap<&str, &str> = answers.iter().copied().collect();
        let mut record = ApplicationRecord::new(product.loan_type());

        for spec in product.field_sequence() {
            let raw = answers
                .get(spec.name)
                .unwrap_or_else(|| panic!("missing answer for field '{}'", spec.name));
            let value = product
                .validate(spec.name, raw)
                .unwrap_or_else(|err| panic!("answer for '{}' rejected: {err}", spec.name));
            record.fields.insert(spec.name.to_string(), value);
        }

        record.status = ApplicationStatus::Complete;
        record
    }

    /// Assert the product's field sequence is non-empty with unique names.
    pub fn assert_field_sequence_well_formed(product: &dyn LoanProduct) {
        let sequence = product.field_sequence();
        assert!(!sequence.is_empty(), "field sequence must not be empty");

        let mut seen = std::collections::HashSet::new();
        for spec in sequence {
            assert!(
                seen.insert(spec.name),
                "duplicate field name '{}'",
                spec.name
            );
            assert!(!spec.prompt.is_empty(), "empty prompt for '{}'", spec.name);
        }
        // Stable across calls.
        let names_a: Vec<&str> = sequence.iter().map(|s| s.name).collect();
        let names_b: Vec<&str> = product.field_sequence().iter().map(|s| s.name).collect();
        assert_eq!(names_a, names_b);
    }
}
