//! Education loan product.
//!
//! Repayment rests on the co-applicant (typically a parent) and a
//! guarantor, so capacity is a multiple of co-applicant income plus a small
//! slice of guarantor net worth. Secured loans earn a rate discount.

use lendia_types::application::{ApplicationRecord, Decision, EligibilityResult};
use lendia_types::config::EducationTerms;
use lendia_types::loan::{FieldKind, FieldSpec, LoanType};

use crate::financial::calculate_emi;
use crate::product::fields::contact_fields;
use crate::product::{cibil_rate_adjustment, LoanProduct};

pub const F_AGE: &str = "Age";
pub const F_ACADEMIC_SCORE: &str = "Academic_Score";
pub const F_INTENDED_COURSE: &str = "Intended_Course";
pub const F_UNIVERSITY_TIER: &str = "University_Tier";
pub const F_COAPPLICANT_INCOME: &str = "Coapplicant_Income";
pub const F_GUARANTOR_NETWORTH: &str = "Guarantor_Networth";
pub const F_CIBIL_SCORE: &str = "CIBIL_Score";
pub const F_LOAN_TYPE: &str = "Loan_Type";
pub const F_LOAN_TERM: &str = "Loan_Term";
pub const F_EXPECTED_LOAN_AMOUNT: &str = "Expected_Loan_Amount";

const COURSES: &[&str] = &["STEM", "MBA", "Medicine", "Finance", "Law", "Arts", "Other"];
const TIERS: &[&str] = &["Tier1", "Tier2", "Tier3"];
const SECURITY: &[&str] = &["Secured", "Unsecured"];

#[derive(Debug)]
pub struct EducationLoan {
    terms: EducationTerms,
    fields: Vec<FieldSpec>,
}

impl EducationLoan {
    pub fn new(terms: EducationTerms) -> Self {
        let mut fields = contact_fields();
        fields.extend([
            FieldSpec::new(
                F_AGE,
                format!(
                    "What is your age in years? ({}-{} for education loans, e.g., 24)",
                    terms.min_age, terms.max_age
                ),
                FieldKind::Number {
                    min: terms.min_age,
                    max: terms.max_age,
                    integer: true,
                },
            ),
            FieldSpec::new(
                F_ACADEMIC_SCORE,
                "What's your academic score out of 100? (e.g., 82)",
                FieldKind::Number {
                    min: 0.0,
                    max: 100.0,
                    integer: false,
                },
            ),
            FieldSpec::new(
                F_INTENDED_COURSE,
                "Which course are you planning to pursue? Choose one: STEM, MBA, Medicine, Finance, Law, Arts, Other.",
                FieldKind::Choice { options: COURSES },
            ),
            FieldSpec::new(
                F_UNIVERSITY_TIER,
                "What is your university tier? Choose one: Tier1, Tier2, Tier3.",
                FieldKind::Choice { options: TIERS },
            ),
            FieldSpec::new(
                F_COAPPLICANT_INCOME,
                "What is the annual co-applicant income in INR? (e.g., 600000)",
                FieldKind::Amount {
                    min: 1.0,
                    max: 60_000_000.0,
                },
            ),
            FieldSpec::new(
                F_GUARANTOR_NETWORTH,
                "What is the guarantor's total net worth in INR? (e.g., 1500000)",
                FieldKind::Amount {
                    min: 1.0,
                    max: 1_000_000_000.0,
                },
            ),
            FieldSpec::new(
                F_CIBIL_SCORE,
                format!(
                    "What is your CIBIL score? ({}-{}, e.g., 720)",
                    terms.min_cibil, terms.max_cibil
                ),
                FieldKind::Number {
                    min: terms.min_cibil,
                    max: terms.max_cibil,
                    integer: true,
                },
            ),
            FieldSpec::new(
                F_LOAN_TYPE,
                "Do you want a Secured loan (with collateral) or Unsecured loan (no collateral)?",
                FieldKind::Choice { options: SECURITY },
            ),
            FieldSpec::new(
                F_LOAN_TERM,
                format!(
                    "What loan term do you prefer in years? ({}-{}, e.g., 5)",
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
                "What loan amount are you looking for in INR? (e.g., 800000)",
                FieldKind::Amount {
                    min: 1.0,
                    max: terms.max_amount,
                },
            ),
        ]);
        Self { terms, fields }
    }
}

/// Numeric academic score to performance grade.
fn performance_grade(score: f64) -> &'static str {
    if score >= 90.0 {
        "Excellent"
    } else if score >= 75.0 {
        "Good"
    } else if score >= 60.0 {
        "Average"
    } else {
        "Poor"
    }
}

impl LoanProduct for EducationLoan {
    fn loan_type(&self) -> LoanType {
        LoanType::Education
    }

    fn field_sequence(&self) -> &[FieldSpec] {
        &self.fields
    }

    fn score(&self, record: &ApplicationRecord) -> EligibilityResult {
        let requested = record.number(F_EXPECTED_LOAN_AMOUNT);
        let income = record.number(F_COAPPLICANT_INCOME);
        let networth = record.number(F_GUARANTOR_NETWORTH);
        let cibil = record.number(F_CIBIL_SCORE);
        let months = (record.number(F_LOAN_TERM) * 12.0) as i64;
        let secured = record.text(F_LOAN_TYPE) == "Secured";
        let academic = record.number(F_ACADEMIC_SCORE);

        let mut reasons = vec![format!(
            "Academic performance: {} ({academic:.0}/100)",
            performance_grade(academic)
        )];

        let mut rate = self.terms.base_rate_percent + cibil_rate_adjustment(cibil);
        if secured {
            rate -= self.terms.secured_rate_discount;
            reasons.push("Collateral provided, secured rate applied".to_string());
        }

        let capacity =
            income * self.terms.income_multiple + networth * self.terms.networth_factor;
        let cap = capacity.min(self.terms.max_amount);
        let offered = requested.min(cap);

        let emi = calculate_emi(offered, rate, months);
        let monthly_income = income / 12.0;
        if emi > self.terms.foir * monthly_income {
            reasons.push(format!(
                "Monthly instalment of \u{20B9}{emi:.0} exceeds {:.0}% of the co-applicant's monthly income",
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
                "Repayment capacity supports \u{20B9}{offered:.0} of the requested \u{20B9}{requested:.0}"
            ));
            Decision::Conditional
        } else {
            reasons.push(format!(
                "Requested amount within repayment capacity of \u{20B9}{cap:.0}"
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
