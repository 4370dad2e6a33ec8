//! Personal loan product.
//!
//! Unsecured, so the CIBIL floor is the strictest in the catalog and the
//! cap is a multiple of net monthly income. A short employment history
//! turns a full offer conditional rather than declining it.

use lendia_types::application::{ApplicationRecord, Decision, EligibilityResult};
use lendia_types::config::PersonalTerms;
use lendia_types::loan::{FieldKind, FieldSpec, LoanType};

use crate::financial::calculate_emi;
use crate::product::fields::contact_fields;
use crate::product::{cibil_rate_adjustment, LoanProduct};

pub const F_AGE: &str = "Age";
pub const F_EMPLOYMENT_TYPE: &str = "Employment_Type";
pub const F_EMPLOYMENT_DURATION_YEARS: &str = "Employment_Duration_Years";
pub const F_ANNUAL_INCOME: &str = "Annual_Income";
pub const F_CIBIL_SCORE: &str = "CIBIL_Score";
pub const F_EXISTING_EMIS: &str = "Existing_EMIs";
pub const F_LOAN_TERM_YEARS: &str = "Loan_Term_Years";
pub const F_EXPECTED_LOAN_AMOUNT: &str = "Expected_Loan_Amount";

const EMPLOYMENT: &[&str] = &["Salaried", "Self-employed", "Business"];

#[derive(Debug)]
pub struct PersonalLoan {
    terms: PersonalTerms,
    fields: Vec<FieldSpec>,
}

impl PersonalLoan {
    pub fn new(terms: PersonalTerms) -> Self {
        let mut fields = contact_fields();
        fields.extend([
            FieldSpec::new(
                F_AGE,
                format!(
                    "What is your age in years? ({}-{}, e.g., 29)",
                    terms.min_age, terms.max_age
                ),
                FieldKind::Number {
                    min: terms.min_age,
                    max: terms.max_age,
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
                F_EMPLOYMENT_DURATION_YEARS,
                "How many years have you been in your current employment? (e.g., 3)",
                FieldKind::Number {
                    min: 0.0,
                    max: 50.0,
                    integer: false,
                },
            ),
            FieldSpec::new(
                F_ANNUAL_INCOME,
                "What is your annual income in INR? (e.g., 900000)",
                FieldKind::Amount {
                    min: 1.0,
                    max: 1_000_000_000.0,
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
                F_EXISTING_EMIS,
                "What is your existing total monthly EMI in INR? (0 if none)",
                FieldKind::Amount {
                    min: 0.0,
                    max: 10_000_000.0,
                },
            ),
            FieldSpec::new(
                F_LOAN_TERM_YEARS,
                format!(
                    "What loan term do you prefer in years? ({}-{}, e.g., 3)",
                    terms.min_term_years, terms.max_term_years
                ),
                FieldKind::Number {
                    min: terms.min_term_years,
                    max: terms.max_term_years,
                    integer: true,
                },
            ),
            FieldSpec::new(
                F_EXPECTED_LOAN_AMOUNT,
                "What loan amount are you looking for in INR? (e.g., 500000)",
                FieldKind::Amount {
                    min: 1.0,
                    max: terms.max_amount,
                },
            ),
        ]);
        Self { terms, fields }
    }
}

impl LoanProduct for PersonalLoan {
    fn loan_type(&self) -> LoanType {
        LoanType::Personal
    }

    fn field_sequence(&self) -> &[FieldSpec] {
        &self.fields
    }

    fn score(&self, record: &ApplicationRecord) -> EligibilityResult {
        let requested = record.number(F_EXPECTED_LOAN_AMOUNT);
        let monthly_income = record.number(F_ANNUAL_INCOME) / 12.0;
        let existing_emis = record.number(F_EXISTING_EMIS);
        let cibil = record.number(F_CIBIL_SCORE);
        let employment_years = record.number(F_EMPLOYMENT_DURATION_YEARS);
        let months = (record.number(F_LOAN_TERM_YEARS) * 12.0) as i64;

        let mut reasons = Vec::new();
        let rate = self.terms.base_rate_percent + cibil_rate_adjustment(cibil);

        let cap = (monthly_income * self.terms.monthly_income_multiple).min(self.terms.max_amount);
        let offered = requested.min(cap);

        let emi = calculate_emi(offered, rate, months);
        if existing_emis + emi > self.terms.foir * monthly_income {
            reasons.push(format!(
                "Combined obligations of \u{20B9}{:.0}/month exceed {:.0}% of monthly income",
                existing_emis + emi,
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

        let mut decision = if offered < requested {
            reasons.push(format!(
                "Unsecured exposure capped at {}x monthly income (\u{20B9}{cap:.0})",
                self.terms.monthly_income_multiple
            ));
            Decision::Conditional
        } else {
            reasons.push("Requested amount within unsecured exposure cap".to_string());
            Decision::Approved
        };

        if employment_years < self.terms.min_employment_years {
            reasons.push(format!(
                "Employment history under {} year(s); income proof required at disbursal",
                self.terms.min_employment_years
            ));
            decision = Decision::Conditional;
        }

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

    fn product() -> PersonalLoan {
        PersonalLoan::new(PersonalTerms::default())
    }

    fn base_answers() -> Vec<(&'static str, &'static str)> {
        vec![
            ("Customer_Name", "Neha Gupta"),
            ("Customer_Email", "neha.gupta@example.com"),
            ("Customer_Phone", "9123456780"),
            (F_AGE, "29"),
            (F_EMPLOYMENT_TYPE, "Salaried"),
            (F_EMPLOYMENT_DURATION_YEARS, "3"),
            (F_ANNUAL_INCOME, "900000"),
            (F_CIBIL_SCORE, "750"),
            (F_EXISTING_EMIS, "0"),
            (F_LOAN_TERM_YEARS, "3"),
            (F_EXPECTED_LOAN_AMOUNT, "500000"),
        ]
    }

    fn with(
        mut answers: Vec<(&'static str, &'static str)>,
        overrides: &[(&'static str, &'static str)],
    ) -> Vec<(&'static str, &'static str)> {
        for (name, value) in overrides {
            answers.iter_mut().find(|(n, _)| n == name).unwrap().1 = value;
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
        assert_eq!(result.approved_amount, 500_000.0);
        // base 11.5, cibil 750 -> -0.5
        assert!((result.annual_rate_percent - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_income_cap_makes_offer_conditional() {
        let product = product();
        let answers = with(
            base_answers(),
            &[
                (F_ANNUAL_INCOME, "1200000"),
                (F_LOAN_TERM_YEARS, "5"),
                (F_EXPECTED_LOAN_AMOUNT, "30 lakh"),
            ],
        );
        let record = complete_record(&product, &answers);
        let result = product.score(&record);

        // Cap: 20 x 100000 monthly = 2000000
        assert_eq!(result.decision, Decision::Conditional);
        assert_eq!(result.approved_amount, 2_000_000.0);
    }

    #[test]
    fn test_short_employment_is_conditional() {
        let product = product();
        let answers = with(base_answers(), &[(F_EMPLOYMENT_DURATION_YEARS, "0.5")]);
        let record = complete_record(&product, &answers);
        let result = product.score(&record);

        assert_eq!(result.decision, Decision::Conditional);
        assert_eq!(result.approved_amount, 500_000.0);
        assert!(result.reasons.iter().any(|r| r.contains("Employment history")));
    }

    #[test]
    fn test_existing_emis_decline() {
        let product = product();
        let answers = with(base_answers(), &[(F_EXISTING_EMIS, "40000")]);
        let record = complete_record(&product, &answers);
        let result = product.score(&record);

        assert_eq!(result.decision, Decision::Declined);
    }
}
