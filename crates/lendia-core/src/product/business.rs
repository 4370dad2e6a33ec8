//! Business loan product.
//!
//! Exposure is a multiple of annual net profit less existing debt.
//! Collateral discounts the rate, industry risk loads it, and a young
//! business turns a full offer conditional.

use lendia_types::application::{ApplicationRecord, Decision, EligibilityResult};
use lendia_types::config::BusinessTerms;
use lendia_types::loan::{FieldKind, FieldSpec, LoanType};

use crate::financial::calculate_emi;
use crate::product::fields::contact_fields;
use crate::product::{cibil_rate_adjustment, LoanProduct};

pub const F_BUSINESS_AGE_YEARS: &str = "Business_Age_Years";
pub const F_ANNUAL_REVENUE: &str = "Annual_Revenue";
pub const F_NET_PROFIT: &str = "Net_Profit";
pub const F_CIBIL_SCORE: &str = "CIBIL_Score";
pub const F_BUSINESS_TYPE: &str = "Business_Type";
pub const F_EXISTING_LOAN_AMOUNT: &str = "Existing_Loan_Amount";
pub const F_LOAN_TENURE_YEARS: &str = "Loan_Tenure_Years";
pub const F_HAS_COLLATERAL: &str = "Has_Collateral";
pub const F_HAS_GUARANTOR: &str = "Has_Guarantor";
pub const F_INDUSTRY_RISK_RATING: &str = "Industry_Risk_Rating";
pub const F_LOCATION_TIER: &str = "Location_Tier";
pub const F_EXPECTED_LOAN_AMOUNT: &str = "Expected_Loan_Amount";

const BUSINESS_TYPES: &[&str] = &["Proprietorship", "Partnership", "Private Limited", "LLP"];
const YES_NO: &[&str] = &["Yes", "No"];
const RISK_RATINGS: &[&str] = &["Low", "Medium", "High"];
const LOCATION_TIERS: &[&str] = &["Tier1", "Tier2", "Tier3"];

#[derive(Debug)]
pub struct BusinessLoan {
    terms: BusinessTerms,
    fields: Vec<FieldSpec>,
}

impl BusinessLoan {
    pub fn new(terms: BusinessTerms) -> Self {
        let mut fields = contact_fields();
        fields.extend([
            FieldSpec::new(
                F_BUSINESS_AGE_YEARS,
                format!(
                    "How many years has the business been operating? (minimum {}, e.g., 5)",
                    terms.min_business_age_years
                ),
                FieldKind::Number {
                    min: terms.min_business_age_years,
                    max: 200.0,
                    integer: false,
                },
            ),
            FieldSpec::new(
                F_ANNUAL_REVENUE,
                "What is the annual revenue in INR? (e.g., 8000000)",
                FieldKind::Amount {
                    min: 1.0,
                    max: 10_000_000_000.0,
                },
            ),
            FieldSpec::new(
                F_NET_PROFIT,
                "What is the annual net profit in INR? (e.g., 2000000)",
                FieldKind::Amount {
                    min: 1.0,
                    max: 10_000_000_000.0,
                },
            ),
            FieldSpec::new(
                F_CIBIL_SCORE,
                format!(
                    "What is your CIBIL score? ({}-{}, e.g., 730)",
                    terms.min_cibil, terms.max_cibil
                ),
                FieldKind::Number {
                    min: terms.min_cibil,
                    max: terms.max_cibil,
                    integer: true,
                },
            ),
            FieldSpec::new(
                F_BUSINESS_TYPE,
                "What is the business type? Choose one: Proprietorship, Partnership, Private Limited, LLP.",
                FieldKind::Choice {
                    options: BUSINESS_TYPES,
                },
            ),
            FieldSpec::new(
                F_EXISTING_LOAN_AMOUNT,
                "What is the outstanding amount on existing business loans in INR? (0 if none)",
                FieldKind::Amount {
                    min: 0.0,
                    max: 10_000_000_000.0,
                },
            ),
            FieldSpec::new(
                F_LOAN_TENURE_YEARS,
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
                F_HAS_COLLATERAL,
                "Can you offer collateral? (Yes or No)",
                FieldKind::Choice { options: YES_NO },
            ),
            FieldSpec::new(
                F_HAS_GUARANTOR,
                "Do you have a guarantor? (Yes or No)",
                FieldKind::Choice { options: YES_NO },
            ),
            FieldSpec::new(
                F_INDUSTRY_RISK_RATING,
                "How would you rate the industry risk? Choose one: Low, Medium, High.",
                FieldKind::Choice {
                    options: RISK_RATINGS,
                },
            ),
            FieldSpec::new(
                F_LOCATION_TIER,
                "What is the business location tier? Choose one: Tier1, Tier2, Tier3.",
                FieldKind::Choice {
                    options: LOCATION_TIERS,
                },
            ),
            FieldSpec::new(
                F_EXPECTED_LOAN_AMOUNT,
                "What loan amount are you looking for in INR? (e.g., 3000000)",
                FieldKind::Amount {
                    min: 1.0,
                    max: terms.max_amount,
                },
            ),
        ]);
        Self { terms, fields }
    }
}

impl LoanProduct for BusinessLoan {
    fn loan_type(&self) -> LoanType {
        LoanType::Business
    }

    fn field_sequence(&self) -> &[FieldSpec] {
        &self.fields
    }

    fn score(&self, record: &ApplicationRecord) -> EligibilityResult {
        let requested = record.number(F_EXPECTED_LOAN_AMOUNT);
        let net_profit = record.number(F_NET_PROFIT);
        let existing_debt = record.number(F_EXISTING_LOAN_AMOUNT);
        let cibil = record.number(F_CIBIL_SCORE);
        let vintage = record.number(F_BUSINESS_AGE_YEARS);
        let months = (record.number(F_LOAN_TENURE_YEARS) * 12.0) as i64;
        let has_collateral = record.text(F_HAS_COLLATERAL) == "Yes";

        let mut reasons = Vec::new();
        let mut rate = self.terms.base_rate_percent + cibil_rate_adjustment(cibil);
        match record.text(F_INDUSTRY_RISK_RATING) {
            "Medium" => rate += self.terms.medium_risk_premium,
            "High" => rate += self.terms.high_risk_premium,
            _ => {}
        }
        if has_collateral {
            rate -= self.terms.collateral_rate_discount;
            reasons.push("Collateral offered, secured rate applied".to_string());
        }

        let capacity =
            (net_profit * self.terms.profit_multiple - existing_debt).max(0.0);
        if capacity <= 0.0 {
            reasons.push(
                "Existing debt exhausts the exposure supported by net profit".to_string(),
            );
            return EligibilityResult {
                decision: Decision::Declined,
                approved_amount: 0.0,
                annual_rate_percent: rate,
                emi: 0.0,
                reasons,
            };
        }

        let cap = capacity.min(self.terms.max_amount);
        let offered = requested.min(cap);

        let emi = calculate_emi(offered, rate, months);
        let monthly_profit = net_profit / 12.0;
        if emi > self.terms.foir * monthly_profit {
            reasons.push(format!(
                "Monthly instalment of \u{20B9}{emi:.0} exceeds {:.0}% of monthly net profit",
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
                "Exposure capped at {}x annual net profit less existing debt (\u{20B9}{cap:.0})",
                self.terms.profit_multiple
            ));
            Decision::Conditional
        } else {
            reasons.push("Requested amount within profit-backed exposure".to_string());
            Decision::Approved
        };

        if vintage < self.terms.established_years {
            reasons.push(format!(
                "Business under {} years old; audited financials required at disbursal",
                self.terms.established_years
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
