//! Financial calculation utilities.
//!
//! Domain-agnostic loan math. This is the single source of truth for EMI
//! and related calculations; every product's scoring goes through here.

/// Calculate EMI using the standard amortization formula.
///
/// EMI = P × r × (1 + r)^n / [(1 + r)^n - 1]
///
/// Where:
/// - P = Principal loan amount
/// - r = Monthly interest rate (annual_rate / 12 / 100)
/// - n = Number of months (tenure)
///
/// Returns the monthly EMI amount, or 0.0 if inputs are invalid. A zero or
/// negative rate degenerates to straight principal division, `P / n`.
///
/// Uses `powi(i32)` for integer month counts to maximize floating-point
/// precision.
pub fn calculate_emi(principal: f64, annual_rate_percent: f64, tenure_months: i64) -> f64 {
    if tenure_months <= 0 || principal <= 0.0 {
        return 0.0;
    }

    let monthly_rate = annual_rate_percent / 100.0 / 12.0;

    if monthly_rate <= 0.0 {
        return principal / tenure_months as f64;
    }

    let n = tenure_months as i32;
    let factor = (1.0 + monthly_rate).powi(n);

    principal * monthly_rate * factor / (factor - 1.0)
}

/// Total interest paid over the loan tenure: `EMI × n - P`.
pub fn calculate_total_interest(
    principal: f64,
    annual_rate_percent: f64,
    tenure_months: i64,
) -> f64 {
    let emi = calculate_emi(principal, annual_rate_percent, tenure_months);
    (emi * tenure_months as f64) - principal
}

/// Total amount repaid over the tenure (principal + interest).
pub fn calculate_total_repayment(
    principal: f64,
    annual_rate_percent: f64,
    tenure_months: i64,
) -> f64 {
    let emi = calculate_emi(principal, annual_rate_percent, tenure_months);
    emi * tenure_months as f64
}

/// Monthly interest payment under a simple-interest model.
///
/// Gold loans repay only interest monthly, with the principal due at
/// maturity: `P × (annual_rate / 100 / 12)`.
pub fn calculate_simple_monthly_interest(principal: f64, annual_rate_percent: f64) -> f64 {
    if principal <= 0.0 {
        return 0.0;
    }
    principal * annual_rate_percent / 100.0 / 12.0
}
