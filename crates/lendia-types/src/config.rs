//! Global configuration for Lendia.
//!
//! Deserialized from `config.toml` in the data directory. Every section and
//! every field is optional; missing values fall back to the defaults below,
//! so a partial file only overrides what it names.
//!
//! Product terms are configuration rather than code: the hard bounds that
//! also gate field validation (age windows, CIBIL floors, amount caps) and
//! the scoring knobs (rate bases, exposure multiples, FOIR shares) live
//! here, one struct per product.

use serde::{Deserialize, Serialize};

/// Top-level configuration tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub session: SessionConfig,
    pub gateway: GatewayConfig,
    pub products: ProductCatalog,
}

/// Session lifetime policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Minutes of inactivity before a collecting session is failed and evicted.
    pub idle_timeout_minutes: i64,
    /// Hours a finalized (persisted/failed) session is retained for audit
    /// before eviction.
    pub audit_retention_hours: i64,
    /// Seconds between background sweeps.
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_minutes: 30,
            audit_retention_hours: 24,
            sweep_interval_secs: 60,
        }
    }
}

impl SessionConfig {
    pub fn idle_timeout(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.idle_timeout_minutes)
    }

    pub fn audit_retention(&self) -> chrono::Duration {
        chrono::Duration::hours(self.audit_retention_hours)
    }

    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Persistence gateway policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Upper bound on one store attempt before falling back, in milliseconds.
    pub attempt_timeout_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            attempt_timeout_ms: 5_000,
        }
    }
}

impl GatewayConfig {
    pub fn attempt_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.attempt_timeout_ms)
    }
}

/// Terms for every product, keyed by loan type in `config.toml`
/// (`[products.education]`, `[products.gold]`, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductCatalog {
    pub education: EducationTerms,
    pub home: HomeTerms,
    pub personal: PersonalTerms,
    pub gold: GoldTerms,
    pub business: BusinessTerms,
    pub car: CarTerms,
}

/// Education loan terms.
///
/// Age, CIBIL, amount and term bounds follow the product's published
/// eligibility rules; the capacity formula (income multiple plus a slice of
/// guarantor net worth) caps the exposure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationTerms {
    pub min_age: f64,
    pub max_age: f64,
    pub min_cibil: f64,
    pub max_cibil: f64,
    pub max_amount: f64,
    pub min_term_years: f64,
    pub max_term_years: f64,
    pub base_rate_percent: f64,
    /// Rate discount for a secured (collateralized) loan.
    pub secured_rate_discount: f64,
    /// Co-applicant income multiple in the capacity cap.
    pub income_multiple: f64,
    /// Fraction of guarantor net worth counted toward capacity.
    pub networth_factor: f64,
    /// Maximum share of monthly co-applicant income the EMI may take.
    pub foir: f64,
}

impl Default for EducationTerms {
    fn default() -> Self {
        Self {
            min_age: 18.0,
            max_age: 35.0,
            min_cibil: 650.0,
            max_cibil: 900.0,
            max_amount: 30_000_000.0,
            min_term_years: 1.0,
            max_term_years: 15.0,
            base_rate_percent: 10.5,
            secured_rate_discount: 0.5,
            income_multiple: 4.0,
            networth_factor: 0.05,
            foir: 0.5,
        }
    }
}

/// Home loan terms. Exposure is capped by loan-to-value against the
/// property; affordability by FOIR over household income.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeTerms {
    pub min_age: f64,
    pub max_age: f64,
    pub min_cibil: f64,
    pub max_cibil: f64,
    pub max_amount: f64,
    pub min_tenure_years: f64,
    pub max_tenure_years: f64,
    pub base_rate_percent: f64,
    /// Maximum loan as a fraction of property value.
    pub ltv: f64,
    /// Maximum share of monthly household income for all EMIs combined.
    pub foir: f64,
}

impl Default for HomeTerms {
    fn default() -> Self {
        Self {
            min_age: 21.0,
            max_age: 65.0,
            min_cibil: 650.0,
            max_cibil: 900.0,
            max_amount: 100_000_000.0,
            min_tenure_years: 1.0,
            max_tenure_years: 30.0,
            base_rate_percent: 8.5,
            ltv: 0.8,
            foir: 0.5,
        }
    }
}

/// Personal loan terms. Unsecured, so the CIBIL floor is the strictest of
/// the catalog and the cap is a multiple of monthly income.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalTerms {
    pub min_age: f64,
    pub max_age: f64,
    pub min_cibil: f64,
    pub max_cibil: f64,
    pub max_amount: f64,
    pub min_term_years: f64,
    pub max_term_years: f64,
    pub base_rate_percent: f64,
    /// Cap as a multiple of net monthly income.
    pub monthly_income_multiple: f64,
    pub foir: f64,
    /// Below this employment duration the offer is conditional.
    pub min_employment_years: f64,
}

impl Default for PersonalTerms {
    fn default() -> Self {
        Self {
            min_age: 21.0,
            max_age: 60.0,
            min_cibil: 700.0,
            max_cibil: 900.0,
            max_amount: 5_000_000.0,
            min_term_years: 1.0,
            max_term_years: 5.0,
            base_rate_percent: 11.5,
            monthly_income_multiple: 20.0,
            foir: 0.5,
            min_employment_years: 1.0,
        }
    }
}

/// Gold loan terms. Collateralized by pledged gold; exposure capped by LTV,
/// repayment is interest-only with principal at maturity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoldTerms {
    pub min_age: f64,
    pub max_age: f64,
    pub min_cibil: f64,
    pub max_cibil: f64,
    pub min_annual_income: f64,
    pub min_gold_value: f64,
    pub min_amount: f64,
    pub max_amount: f64,
    pub min_tenure_years: f64,
    pub max_tenure_years: f64,
    pub base_rate_percent: f64,
    /// Maximum loan as a fraction of pledged gold value.
    pub ltv: f64,
}

impl Default for GoldTerms {
    fn default() -> Self {
        Self {
            min_age: 21.0,
            max_age: 75.0,
            min_cibil: 600.0,
            max_cibil: 900.0,
            min_annual_income: 180_000.0,
            min_gold_value: 10_000.0,
            min_amount: 5_000.0,
            max_amount: 10_000_000.0,
            min_tenure_years: 1.0,
            max_tenure_years: 3.0,
            base_rate_percent: 9.5,
            ltv: 0.75,
        }
    }
}

/// Business loan terms. Exposure is a multiple of annual net profit;
/// collateral discounts the rate, industry risk loads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessTerms {
    pub min_business_age_years: f64,
    /// Below this vintage the offer is conditional.
    pub established_years: f64,
    pub min_cibil: f64,
    pub max_cibil: f64,
    pub max_amount: f64,
    pub min_tenure_years: f64,
    pub max_tenure_years: f64,
    pub base_rate_percent: f64,
    /// Cap as a multiple of annual net profit.
    pub profit_multiple: f64,
    pub collateral_rate_discount: f64,
    pub medium_risk_premium: f64,
    pub high_risk_premium: f64,
    /// Maximum share of monthly net profit the EMI may take.
    pub foir: f64,
}

impl Default for BusinessTerms {
    fn default() -> Self {
        Self {
            min_business_age_years: 1.0,
            established_years: 3.0,
            min_cibil: 650.0,
            max_cibil: 900.0,
            max_amount: 50_000_000.0,
            min_tenure_years: 1.0,
            max_tenure_years: 10.0,
            base_rate_percent: 13.0,
            profit_multiple: 3.0,
            collateral_rate_discount: 1.0,
            medium_risk_premium: 0.75,
            high_risk_premium: 1.5,
            foir: 0.6,
        }
    }
}

/// Car loan terms. Rate is clamped to the product's band after CIBIL and
/// car-type adjustments; a large down payment earns a discount.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CarTerms {
    pub min_age: f64,
    pub max_age: f64,
    /// Validation accepts the full bureau range; approval requires this floor.
    pub min_approve_cibil: f64,
    pub min_amount: f64,
    pub max_amount: f64,
    pub min_tenure_years: f64,
    pub max_tenure_years: f64,
    pub base_rate_percent: f64,
    pub min_rate_percent: f64,
    pub max_rate_percent: f64,
    /// Cap as a multiple of combined annual income.
    pub salary_multiple: f64,
    pub min_down_payment_percent: f64,
    pub max_down_payment_percent: f64,
    /// Down payment at or above this percentage earns the rate discount.
    pub high_down_payment_percent: f64,
    pub high_down_payment_discount: f64,
    pub foir: f64,
}

impl Default for CarTerms {
    fn default() -> Self {
        Self {
            min_age: 18.0,
            max_age: 80.0,
            min_approve_cibil: 650.0,
            min_amount: 100_000.0,
            max_amount: 50_000_000.0,
            min_tenure_years: 1.0,
            max_tenure_years: 7.0,
            base_rate_percent: 9.0,
            min_rate_percent: 7.0,
            max_rate_percent: 20.0,
            salary_multiple: 2.5,
            min_down_payment_percent: 10.0,
            max_down_payment_percent: 50.0,
            high_down_payment_percent: 30.0,
            high_down_payment_discount: 0.5,
            foir: 0.5,
        }
    }
}
