//! Gold loan product.
//!
//! Fully collateralized by pledged gold, so there is no income-ratio
//! decline path: the offer is the requested amount up to the LTV cap.
//! Repayment is interest-only with the principal due at maturity, so the
//! quoted EMI is the simple monthly interest.

use lendia_types::application::{ApplicationRecord, Decision, EligibilityResult};
use lendia_types::config::GoldTerms;
use lendia_types::loan::{FieldKind, FieldSpec, LoanType};

use crate::financial::calculate_simple_monthly_interest;
use crate::product::fields::contact_fields;
use crate::product::{cibil_rate_adjustment, LoanProduct};

pub const F_AGE: &str = "Age";
pub const F_ANNUAL_INCOME: &str = "Annual_Income";
pub const F_CIBIL_SCORE: &str = "CIBIL_Score";
pub const F_OCCUPATION: &str = "Occupation";
pub const F_GOLD_VALUE: &str = "Gold_Value";
pub const F_LOAN_AMOUNT: &str = "Loan_Amount";
pub const F_LOAN_TENURE: &str = "Loan_Tenure";

const OCCUPATIONS: &[&str] = &["Salaried", "Retired", "Business", "Self-employed"];

#[derive(Debug)]
pub struct GoldLoan {
    terms: GoldTerms,
    fields: Vec<FieldSpec>,
}

impl GoldLoan {
    pub fn new(terms: GoldTerms) -> Self {
        let mut fields = contact_fields();
        fields.extend([
            FieldSpec::new(
                F_AGE,
                format!(
                    "What is your age in years? ({}-{}, e.g., 45)",
                    terms.min_age, terms.max_age
                ),
                FieldKind::Number {
                    min: terms.min_age,
                    max: terms.max_age,
                    integer: true,
                },
            ),
            FieldSpec::new(
                F_ANNUAL_INCOME,
                format!(
                    "What is your annual income in INR? (minimum {}, e.g., 600000)",
                    terms.min_annual_income
                ),
                FieldKind::Amount {
                    min: terms.min_annual_income,
                    max: 60_000_000.0,
                },
            ),
            FieldSpec::new(
                F_CIBIL_SCORE,
                format!(
                    "What is your CIBIL score? ({}-{}, e.g., 700)",
                    terms.min_cibil, terms.max_cibil
                ),
                FieldKind::Number {
                    min: terms.min_cibil,
                    max: terms.max_cibil,
                    integer: true,
                },
            ),
            FieldSpec::new(
                F_OCCUPATION,
                "What is your occupation? Choose one: Salaried, Retired, Business, Self-employed.",
                FieldKind::Choice {
                    options: OCCUPATIONS,
                },
            ),
            FieldSpec::new(
                F_GOLD_VALUE,
                "What is the current market value of your gold in INR? (e.g., 800000)",
                FieldKind::Amount {
                    min: terms.min_gold_value,
                    max: 50_000_000.0,
                },
            ),
            FieldSpec::new(
                F_LOAN_AMOUNT,
                "What loan amount are you looking for in INR? (e.g., 500000)",
                FieldKind::Amount {
                    min: terms.min_amount,
                    max: terms.max_amount,
                },
            ),
            FieldSpec::new(
                F_LOAN_TENURE,
                format!(
                    "What tenure do you prefer in years? ({}-{}, e.g., 2)",
                    terms.min_tenure_years, terms.max_tenure_years
                ),
                FieldKind::Number {
                    min: terms.min_tenure_years,
                    max: terms.max_tenure_years,
                    integer: true,
                },
            ),
        ]);
        Self { terms, fields }
    }
}

impl LoanProduct for GoldLoan {
    fn loan_type(&self) -> LoanType {
        LoanType::Gold
    }

    fn field_sequence(&self) -> &[FieldSpec] {
        &self.fields
    }

    fn score(&self, record: &ApplicationRecord) -> EligibilityResult {
        let requested = record.number(F_LOAN_AMOUNT);
        let gold_value = record.number(F_GOLD_VALUE);
        let cibil = record.number(F_CIBIL_SCORE);

        let mut reasons = Vec::new();
        let rate = self.terms.base_rate_percent + cibil_rate_adjustment(cibil);

        let ltv_cap = (gold_value * self.terms.ltv).min(self.terms.max_amount);
        let offered = requested.min(ltv_cap);

        // Interest-only servicing; principal is settled when the pledge is
        // released.
        let emi = calculate_simple_monthly_interest(offered, rate);
        reasons.push("Interest-only monthly payment; principal due at maturity".to_string());

        let decision = if offered < requested {
            reasons.push(format!(
                "Loan capped at {:.0}% of the pledged gold value (\u{20B9}{ltv_cap:.0})",
                self.terms.ltv * 100.0
            ));
            Decision::Conditional
        } else {
            reasons.push(format!(
                "Requested amount within {:.0}% of the pledged gold value",
                self.terms.ltv * 100.0
            ));
            Decision::Approved
        };

        EligibilityResult {
            decision,
            approved_amount: offered,
            annual_rate_percent: rate,
            emi,
            reasons,
        }
    }
}
