//! Car loan product.
//!
//! Validation accepts the full bureau score range; approval requires the
//! product's CIBIL floor. The rate is adjusted by CIBIL band, car type, and
//! down payment, then clamped to the product's band.

use lendia_types::application::{ApplicationRecord, Decision, EligibilityResult};
use lendia_types::config::CarTerms;
use lendia_types::loan::{FieldKind, FieldSpec, LoanType};

use crate::financial::calculate_emi;
use crate::product::fields::contact_fields;
use crate::product::{cibil_rate_adjustment, LoanProduct};

pub const F_AGE: &str = "Age";
pub const F_APPLICANT_ANNUAL_SALARY: &str = "applicant_annual_salary";
pub const F_COAPPLICANT_ANNUAL_INCOME: &str = "Coapplicant_Annual_Income";
pub const F_CIBIL: &str = "CIBIL";
pub const F_CAR_TYPE: &str = "Car_Type";
pub const F_DOWN_PAYMENT_PERCENT: &str = "down_payment_percent";
pub const F_TENURE: &str = "Tenure";
pub const F_LOAN_AMOUNT: &str = "loan_amount";

const CAR_TYPES: &[&str] = &["Sedan", "SUV", "Hatchback", "Coupe"];

#[derive(Debug)]
pub struct CarLoan {
    terms: CarTerms,
    fields: Vec<FieldSpec>,
}

impl CarLoan {
    pub fn new(terms: CarTerms) -> Self {
        let mut fields = contact_fields();
        fields.extend([
            FieldSpec::new(
                F_AGE,
                format!(
                    "What is your age in years? ({}-{}, e.g., 35)",
                    terms.min_age, terms.max_age
                ),
                FieldKind::Number {
                    min: terms.min_age,
                    max: terms.max_age,
                    integer: true,
                },
            ),
            FieldSpec::new(
                F_APPLICANT_ANNUAL_SALARY,
                "What is your annual salary in INR? (e.g., 1500000)",
                FieldKind::Amount {
                    min: 1.0,
                    max: 1_000_000_000.0,
                },
            ),
            FieldSpec::new(
                F_COAPPLICANT_ANNUAL_INCOME,
                "What is the co-applicant's annual income in INR? (0 if none)",
                FieldKind::Amount {
                    min: 0.0,
                    max: 1_000_000_000.0,
                },
            ),
            FieldSpec::new(
                F_CIBIL,
                "What is your CIBIL score? (300-900, e.g., 720)",
                FieldKind::Number {
                    min: 300.0,
                    max: 900.0,
                    integer: true,
                },
            ),
            FieldSpec::new(
                F_CAR_TYPE,
                "What type of car are you interested in? Choose one: Sedan, SUV, Hatchback, Coupe.",
                FieldKind::Choice { options: CAR_TYPES },
            ),
            FieldSpec::new(
                F_DOWN_PAYMENT_PERCENT,
                format!(
                    "What percentage down payment can you make? ({}-{}%, e.g., 20)",
                    terms.min_down_payment_percent, terms.max_down_payment_percent
                ),
                FieldKind::Number {
                    min: terms.min_down_payment_percent,
                    max: terms.max_down_payment_percent,
                    integer: false,
                },
            ),
            FieldSpec::new(
                F_TENURE,
                format!(
                    "What tenure do you prefer in years? ({}-{}, e.g., 5)",
                    terms.min_tenure_years, terms.max_tenure_years
                ),
                FieldKind::Number {
                    min: terms.min_tenure_years,
                    max: terms.max_tenure_years,
                    integer: true,
                },
            ),
            FieldSpec::new(
                F_LOAN_AMOUNT,
                "What loan amount are you looking for in INR? (e.g., 800000)",
                FieldKind::Amount {
                    min: terms.min_amount,
                    max: terms.max_amount,
                },
            ),
        ]);
        Self { terms, fields }
    }

    fn car_type_premium(car_type: &str) -> f64 {
        match car_type {
            "SUV" => 0.25,
            "Coupe" => 0.5,
            "Hatchback" => -0.25,
            _ => 0.0,
        }
    }
}

impl LoanProduct for CarLoan {
    fn loan_type(&self) -> LoanType {
        LoanType::Car
    }

    fn field_sequence(&self) -> &[FieldSpec] {
        &self.fields
    }

    fn score(&self, record: &ApplicationRecord) -> EligibilityResult {
        let requested = record.number(F_LOAN_AMOUNT);
        let combined_income = record.number(F_APPLICANT_ANNUAL_SALARY)
            + record.number(F_COAPPLICANT_ANNUAL_INCOME);
        let cibil = record.number(F_CIBIL);
        let down_payment = record.number(F_DOWN_PAYMENT_PERCENT);
        let months = (record.number(F_TENURE) * 12.0) as i64;

        let mut reasons = Vec::new();

        if cibil < self.terms.min_approve_cibil {
            reasons.push(format!(
                "A minimum CIBIL score of {:.0} is required for car loan approval",
                self.terms.min_approve_cibil
            ));
            return EligibilityResult {
                decision: Decision::Declined,
                approved_amount: 0.0,
                annual_rate_percent: self.terms.base_rate_percent,
                emi: 0.0,
                reasons,
            };
        }

        let mut rate = self.terms.base_rate_percent
            + cibil_rate_adjustment(cibil)
            + Self::car_type_premium(record.text(F_CAR_TYPE));
        if down_payment >= self.terms.high_down_payment_percent {
            rate -= self.terms.high_down_payment_discount;
            reasons.push(format!(
                "{down_payment:.0}% down payment earns a rate discount"
            ));
        }
        rate = rate.clamp(self.terms.min_rate_percent, self.terms.max_rate_percent);

        let cap = (combined_income * self.terms.salary_multiple).min(self.terms.max_amount);
        let offered = requested.min(cap);

        let emi = calculate_emi(offered, rate, months);
        let monthly_income = combined_income / 12.0;
        if emi > self.terms.foir * monthly_income {
            reasons.push(format!(
                "Monthly instalment of \u{20B9}{emi:.0} exceeds {:.0}% of monthly income",
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
                "Loan capped at {}x combined annual income (\u{20B9}{cap:.0})",
                self.terms.salary_multiple
            ));
            Decision::Conditional
        } else {
            reasons.push("Requested amount within income-backed exposure".to_string());
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
