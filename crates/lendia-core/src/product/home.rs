//! Home loan product.
//!
//! Exposure is capped by loan-to-value against the property; affordability
//! by the household's fixed-obligation-to-income ratio, counting existing
//! EMIs alongside the new one.

use lendia_types::application::{ApplicationRecord, Decision, EligibilityResult};
use lendia_types::config::HomeTerms;
use lendia_types::loan::{FieldKind, FieldSpec, LoanType};

use crate::financial::{calculate_emi, calculate_total_repayment};
use crate::product::fields::contact_fields;
use crate::product::{cibil_rate_adjustment, LoanProduct};

pub const F_AGE: &str = "Age";
pub const F_INCOME: &str = "Income";
pub const F_GUARANTOR_INCOME: &str = "Guarantor_income";
pub const F_TENURE: &str = "Tenure";
pub const F_CIBIL_SCORE: &str = "CIBIL_score";
pub const F_EMPLOYMENT_TYPE: &str = "Employment_type";
pub const F_DOWN_PAYMENT: &str = "Down_payment";
pub const F_EXISTING_TOTAL_EMI: &str = "Existing_total_EMI";
pub const F_LOAN_AMOUNT_REQUESTED: &str = "Loan_amount_requested";
pub const F_PROPERTY_VALUE: &str = "Property_value";

const EMPLOYMENT: &[&str] = &["Salaried", "Self-employed", "Business"];

#[derive(Debug)]
pub struct HomeLoan {
    terms: HomeTerms,
    fields: Vec<FieldSpec>,
}

impl HomeLoan {
    pub fn new(terms: HomeTerms) -> Self {
        let mut fields = contact_fields();
        fields.extend([
            FieldSpec::new(
                F_AGE,
                format!(
                    "What is your age in years? ({}-{}, e.g., 32)",
                    terms.min_age, terms.max_age
                ),
                FieldKind::Number {
                    min: terms.min_age,
                    max: terms.max_age,
                    integer: true,
                },
            ),
            FieldSpec::new(
                F_INCOME,
                "What is your annual income in INR? (e.g., 1200000)",
                FieldKind::Amount {
                    min: 1.0,
                    max: 1_000_000_000.0,
                },
            ),
            FieldSpec::new(
                F_GUARANTOR_INCOME,
                "What is the guarantor's annual income in INR? (0 if none)",
                FieldKind::Amount {
                    min: 0.0,
                    max: 1_000_000_000.0,
                },
            ),
            FieldSpec::new(
                F_TENURE,
                format!(
                    "What tenure do you prefer in years? ({}-{}, e.g., 20)",
                    terms.min_tenure_years, terms.max_tenure_years
                ),
                FieldKind::Number {
                    min: terms.min_tenure_years,
                    max: terms.max_tenure_years,
                    integer: true,
                },
            ),
            FieldSpec::new(
                F_CIBIL_SCORE,
                format!(
                    "What is your CIBIL score? ({}-{}, e.g., 740)",
                    terms.min_cibil, terms.max_cibil
                ),
                FieldKind::Number {
                    min: terms.min_cibil,
                    max: terms.max_cibil,
                    integer: true,
                },
            ),
            FieldSpec::new(
                F_EMPLOYMENT_TYPE,
                "What is your employment type? Choose one: Salaried, Self-employed, Business.",
                FieldKind::Choice {
                    options: EMPLOYMENT,
                },
            ),
            FieldSpec::new(
                F_DOWN_PAYMENT,
                "How much down payment can you make in INR? (e.g., 1000000)",
                FieldKind::Amount {
                    min: 0.0,
                    max: 1_000_000_000.0,
                },
            ),
            FieldSpec::new(
                F_EXISTING_TOTAL_EMI,
                "What is your existing total monthly EMI in INR? (0 if none)",
                FieldKind::Amount {
                    min: 0.0,
                    max: 10_000_000.0,
                },
            ),
            FieldSpec::new(
                F_LOAN_AMOUNT_REQUESTED,
                "What loan amount are you looking for in INR? (e.g., 4000000)",
                FieldKind::Amount {
                    min: 1.0,
                    max: terms.max_amount,
                },
            ),
            FieldSpec::new(
                F_PROPERTY_VALUE,
                "What is the value of the property in INR? (e.g., 6000000)",
                FieldKind::Amount {
                    min: 100_000.0,
                    max: 1_000_000_000.0,
                },
            ),
        ]);
        Self { terms, fields }
    }
}

impl LoanProduct for HomeLoan {
    fn loan_type(&self) -> LoanType {
        LoanType::Home
    }

    fn field_sequence(&self) -> &[FieldSpec] {
        &self.fields
    }

    fn score(&self, record: &ApplicationRecord) -> EligibilityResult {
        let requested = record.number(F_LOAN_AMOUNT_REQUESTED);
        let household_income = record.number(F_INCOME) + record.number(F_GUARANTOR_INCOME);
        let existing_emi = record.number(F_EXISTING_TOTAL_EMI);
        let property_value = record.number(F_PROPERTY_VALUE);
        let cibil = record.number(F_CIBIL_SCORE);
        let months = (record.number(F_TENURE) * 12.0) as i64;

        let mut reasons = Vec::new();
        let rate = self.terms.base_rate_percent + cibil_rate_adjustment(cibil);

        let ltv_cap = property_value * self.terms.ltv;
        let offered = requested.min(ltv_cap).min(self.terms.max_amount);

        let emi = calculate_emi(offered, rate, months);
        let monthly_income = household_income / 12.0;
        if existing_emi + emi > self.terms.foir * monthly_income {
            reasons.push(format!(
                "Combined obligations of \u{20B9}{:.0}/month exceed {:.0}% of household monthly income",
                existing_emi + emi,
                self.terms.foir * 100.0
            ));
            return EligibilityResult {
                decision: Decision::Declined,
                approved_amount: 0.0,
                annual_rate_percent: rate,
                emi: 0.0,
                reasons,
            };
        }

        let decision = if offered < requested {
            reasons.push(format!(
                "Loan capped at {:.0}% of the property value (\u{20B9}{ltv_cap:.0})",
                self.terms.ltv * 100.0
            ));
            Decision::Conditional
        } else {
            reasons.push(format!(
                "Requested amount within {:.0}% loan-to-value",
                self.terms.ltv * 100.0
            ));
            Decision::Approved
        };
        reasons.push(format!(
            "Total repayment over the tenure \u{2248} \u{20B9}{:.0}",
            calculate_total_repayment(offered, rate, months)
        ));

        EligibilityResult {
            decision,
            approved_amount: offered,
            annual_rate_percent: rate,
            emi,
            reasons,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::test_support::{assert_field_sequence_well_formed, complete_record};

    fn product() -> HomeLoan {
        HomeLoan::new(HomeTerms::default())
    }

    fn base_answers() -> Vec<(&'static str, &'static str)> {
        vec![
            ("Customer_Name", "Arjun Mehta"),
            ("Customer_Email", "arjun.mehta@example.com"),
            ("Customer_Phone", "9812345670"),
            (F_AGE, "32"),
            (F_INCOME, "1800000"),
            (F_GUARANTOR_INCOME, "0"),
            (F_TENURE, "20"),
            (F_CIBIL_SCORE, "760"),
            (F_EMPLOYMENT_TYPE, "Salaried"),
            (F_DOWN_PAYMENT, "10 lakh"),
            (F_EXISTING_TOTAL_EMI, "0"),
            (F_LOAN_AMOUNT_REQUESTED, "3000000"),
            (F_PROPERTY_VALUE, "5000000"),
        ]
    }

    fn with(
        mut answers: Vec<(&'static str, &'static str)>,
        overrides: &[(&'static str, &'static str)],
    ) -> Vec<(&'static str, &'static str)> {
        for (name, value) in overrides {
            answers
                .iter_mut()
                .find(|(n, _)| n == name)
                .unwrap()
                .1 = value;
        }
        answers
    }

    #[test]
    fn test_field_sequence_well_formed() {
        assert_field_sequence_well_formed(&product());
    }

    #[test]
    fn test_full_approval() {
        let product = product();
        let record = complete_record(&product, &base_answers());
        let result = product.score(&record);

        assert_eq!(result.decision, Decision::Approved);
        assert_eq!(result.approved_amount, 3_000_000.0);
        // base 8.5, cibil 760 -> -0.5
        assert!((result.annual_rate_percent - 8.0).abs() < 1e-9);
        let expected = calculate_emi(3_000_000.0, 8.0, 240);
        assert!((result.emi - expected).abs() < 1e-9);
    }

    #[test]
    fn test_ltv_cap_makes_offer_conditional() {
        let product = product();
        let answers = with(base_answers(), &[(F_PROPERTY_VALUE, "3000000")]);
        let record = complete_record(&product, &answers);
        let result = product.score(&record);

        assert_eq!(result.decision, Decision::Conditional);
        assert_eq!(result.approved_amount, 2_400_000.0);
    }

    #[test]
    fn test_existing_obligations_decline() {
        let product = product();
        let answers = with(
            base_answers(),
            &[(F_INCOME, "1200000"), (F_EXISTING_TOTAL_EMI, "60000")],
        );
        let record = complete_record(&product, &answers);
        let result = product.score(&record);

        assert_eq!(result.decision, Decision::Declined);
        assert!(result.reasons.iter().any(|r| r.contains("obligations")));
    }
}
