//! Applicant input parsing and validation against field specs.
//!
//! Inputs arrive as free text from a chat box, so parsing is lenient about
//! formatting (commas, currency symbols, Indian "lakh"/"crore" units) while
//! validation stays strict about bounds. A value that parses but breaks its
//! bounds is rejected with a message the applicant can act on.

use std::sync::LazyLock;

use regex::Regex;

use lendia_types::error::ValidationError;
use lendia_types::loan::{FieldKind, FieldSpec, FieldValue};

/// Contact fields shared by every product; collected first, in this order.
pub const F_CUSTOMER_NAME: &str = "Customer_Name";
pub const F_CUSTOMER_EMAIL: &str = "Customer_Email";
pub const F_CUSTOMER_PHONE: &str = "Customer_Phone";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("email regex")
});

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d[\d,]*\.?\d*").expect("number regex"));

static CRORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(cr|crore)s?\b").expect("crore regex"));

static LAKH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(l|lac|lakh)s?\b").expect("lakh regex"));

/// The three contact specs every product opens with.
pub fn contact_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new(
            F_CUSTOMER_NAME,
            "May I have your full name? (e.g., Riya Sharma)",
            FieldKind::Text { min_len: 2 },
        ),
        FieldSpec::new(
            F_CUSTOMER_EMAIL,
            "What is your email address? (e.g., riya.sharma@example.com)",
            FieldKind::Email,
        ),
        FieldSpec::new(
            F_CUSTOMER_PHONE,
            "What is your 10-digit phone number? (digits only, e.g., 9876543210)",
            FieldKind::Phone,
        ),
    ]
}

/// Parse and validate one raw applicant input against a field spec.
///
/// Returns the canonical [`FieldValue`] on success. On failure the cursor
/// must not advance; the error message is shown to the applicant verbatim.
pub fn validate(spec: &FieldSpec, raw: &str) -> Result<FieldValue, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(
            spec.name,
            format!("Please provide your {}.", display_name(spec.name)),
        ));
    }

    match &spec.kind {
        FieldKind::Number { min, max, integer } => {
            let value = extract_number(trimmed).ok_or_else(|| {
                ValidationError::new(
                    spec.name,
                    format!(
                        "Please provide a valid {} as a number.",
                        display_name(spec.name)
                    ),
                )
            })?;
            if *integer && value.fract() != 0.0 {
                return Err(ValidationError::new(
                    spec.name,
                    format!("{} must be a whole number.", display_name(spec.name)),
                ));
            }
            check_range(spec.name, value, *min, *max)?;
            Ok(FieldValue::Number(value))
        }
        FieldKind::Amount { min, max } => {
            let value = parse_amount(trimmed).ok_or_else(|| {
                ValidationError::new(
                    spec.name,
                    format!(
                        "Please provide the {} as an amount in INR (e.g., 500000 or 5 lakh).",
                        display_name(spec.name)
                    ),
                )
            })?;
            // A zero lower bound marks an optional amount (e.g. co-applicant
            // income); everything else must be strictly positive.
            if value <= 0.0 && *min > 0.0 {
                return Err(ValidationError::new(
                    spec.name,
                    format!(
                        "Invalid {}. All amounts must be positive.",
                        display_name(spec.name)
                    ),
                ));
            }
            check_range(spec.name, value, *min, *max)?;
            Ok(FieldValue::Number(value))
        }
        FieldKind::Text { min_len } => {
            if trimmed.chars().count() < *min_len {
                return Err(ValidationError::new(
                    spec.name,
                    format!("Please provide your complete {}.", display_name(spec.name)),
                ));
            }
            Ok(FieldValue::Text(trimmed.to_string()))
        }
        FieldKind::Email => {
            if !EMAIL_RE.is_match(trimmed) {
                return Err(ValidationError::new(
                    spec.name,
                    "Please provide a valid email address.",
                ));
            }
            Ok(FieldValue::Text(trimmed.to_string()))
        }
        FieldKind::Phone => {
            let digits = normalize_phone(trimmed);
            if digits.len() != 10 || !digits.starts_with(['6', '7', '8', '9']) {
                return Err(ValidationError::new(
                    spec.name,
                    "Phone number must be exactly 10 digits starting with 6, 7, 8, or 9.",
                ));
            }
            Ok(FieldValue::Text(digits))
        }
        FieldKind::Date => {
            let date = chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
                ValidationError::new(
                    spec.name,
                    format!(
                        "Please provide the {} as a date in YYYY-MM-DD format.",
                        display_name(spec.name)
                    ),
                )
            })?;
            Ok(FieldValue::Date(date))
        }
        FieldKind::Choice { options } => {
            let matched = options
                .iter()
                .find(|option| option.eq_ignore_ascii_case(trimmed));
            match matched {
                Some(option) => Ok(FieldValue::Choice((*option).to_string())),
                None => Err(ValidationError::new(
                    spec.name,
                    format!(
                        "Please choose one of: {}.",
                        options.join(", ")
                    ),
                )),
            }
        }
    }
}

/// Parse a monetary amount, accepting commas, currency markers, and the
/// Indian units "lakh" (1,00,000) and "crore" (1,00,00,000).
pub fn parse_amount(raw: &str) -> Option<f64> {
    let lowered = raw.trim().to_lowercase();

    let multiplier = if CRORE_RE.is_match(&lowered) {
        10_000_000.0
    } else if LAKH_RE.is_match(&lowered) {
        100_000.0
    } else {
        1.0
    };

    // The numeric token is located directly, so currency markers around it
    // (₹, "rs.") need no stripping.
    let number = extract_number(&lowered)?;
    Some(number * multiplier)
}

/// Extract the first numeric token from free text, tolerating commas.
fn extract_number(raw: &str) -> Option<f64> {
    let m = NUMBER_RE.find(raw)?;
    m.as_str().replace(',', "").parse::<f64>().ok()
}

/// Strip separators and a leading +91/91 country code from a phone input.
fn normalize_phone(raw: &str) -> String {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    if digits.len() == 12 && digits.starts_with("91") {
        digits[2..].to_string()
    } else {
        digits
    }
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::new(
            field,
            format!(
                "{} must be between {} and {}.",
                display_name(field),
                format_bound(min),
                format_bound(max)
            ),
        ));
    }
    Ok(())
}

/// "CIBIL_Score" -> "CIBIL score", "Customer_Name" -> "customer name".
/// All-caps words are acronyms and stay intact.
fn display_name(field: &str) -> String {
    field
        .split('_')
        .map(|word| {
            if word.chars().all(|c| c.is_ascii_uppercase()) {
                word.to_string()
            } else {
                word.to_lowercase()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_bound(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
