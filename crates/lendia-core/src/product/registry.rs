//! Product registry for loan-type lookup.
//!
//! Built once at startup from the product catalog configuration and
//! read-only thereafter, so lookups need no locking.

use std::collections::HashMap;

use lendia_types::config::ProductCatalog;
use lendia_types::error::ProductError;
use lendia_types::loan::LoanType;

use super::business::BusinessLoan;
use super::car::CarLoan;
use super::education::EducationLoan;
use super::gold::GoldLoan;
use super::home::HomeLoan;
use super::personal::PersonalLoan;
use super::LoanProduct;

/// Registry of loan products, indexed by loan type.
pub struct ProductRegistry {
    products: HashMap<LoanType, Box<dyn LoanProduct>>,
}

impl ProductRegistry {
    /// Build the full catalog with the given per-product terms.
    pub fn with_catalog(catalog: &ProductCatalog) -> Self {
        let mut products: HashMap<LoanType, Box<dyn LoanProduct>> = HashMap::new();
        products.insert(
            LoanType::Education,
            Box::new(EducationLoan::new(catalog.education.clone())),
        );
        products.insert(LoanType::Home, Box::new(HomeLoan::new(catalog.home.clone())));
        products.insert(
            LoanType::Personal,
            Box::new(PersonalLoan::new(catalog.personal.clone())),
        );
        products.insert(LoanType::Gold, Box::new(GoldLoan::new(catalog.gold.clone())));
        products.insert(
            LoanType::Business,
            Box::new(BusinessLoan::new(catalog.business.clone())),
        );
        products.insert(LoanType::Car, Box::new(CarLoan::new(catalog.car.clone())));
        Self { products }
    }

    /// Look up the product for a loan type.
    pub fn resolve(&self, loan_type: LoanType) -> Result<&dyn LoanProduct, ProductError> {
        self.products
            .get(&loan_type)
            .map(|product| product.as_ref())
            .ok_or_else(|| ProductError::UnknownLoanType(loan_type.to_string()))
    }

    /// Parse a loan-type identifier and resolve its product.
    pub fn resolve_str(&self, loan_type: &str) -> Result<&dyn LoanProduct, ProductError> {
        let parsed: LoanType = loan_type
            .parse()
            .map_err(|_| ProductError::UnknownLoanType(loan_type.trim().to_string()))?;
        self.resolve(parsed)
    }

    /// Registered loan types, in catalog order.
    pub fn loan_types(&self) -> Vec<LoanType> {
        LoanType::ALL
            .into_iter()
            .filter(|loan_type| self.products.contains_key(loan_type))
            .collect()
    }
}

impl Default for ProductRegistry {
    fn default() -> Self {
        Self::with_catalog(&ProductCatalog::default())
    }
}
