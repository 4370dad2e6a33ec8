//! Prompt generation: the injected text capability and its template fallback.
//!
//! The core never calls a language-model service itself; it prepares a
//! [`PromptContext`] and consumes whatever text the injected generator
//! returns. Generated text only phrases the conversation -- eligibility
//! decisions never depend on it. When the generator is unavailable the
//! desk falls back to [`TemplatePromptGenerator`], which renders the same
//! contexts deterministically.

use lendia_types::application::EligibilityResult;
use lendia_types::error::{GenerationError, ValidationError};
use lendia_types::loan::{FieldSpec, LoanType};

/// What the next assistant message must say.
#[derive(Debug)]
pub enum PromptContext<'a> {
    /// Session opener: greet and ask the first field.
    Greeting {
        loan_type: LoanType,
        field: &'a FieldSpec,
    },
    /// Ask the next field, acknowledging progress.
    NextField {
        loan_type: LoanType,
        field: &'a FieldSpec,
        /// Zero-based index of the field being asked.
        position: usize,
        total: usize,
    },
    /// Re-ask the same field after a rejected answer.
    Retry {
        field: &'a FieldSpec,
        error: &'a ValidationError,
    },
    /// Present the final eligibility decision.
    Decision {
        loan_type: LoanType,
        applicant_name: Option<&'a str>,
        result: &'a EligibilityResult,
    },
}

/// Injected text-generation capability.
///
/// Implementations may call a remote completion service; failures are
/// recoverable by construction since every context has a template rendering.
pub trait PromptGenerator: Send + Sync {
    fn generate(
        &self,
        context: &PromptContext<'_>,
    ) -> impl std::future::Future<Output = Result<String, GenerationError>> + Send;
}

/// Deterministic, rule-based prompt renderer.
///
/// Serves both as the fallback when a real generator fails and as the
/// default generator for deployments without one.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplatePromptGenerator;

impl TemplatePromptGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Render a context to text. Infallible, so degraded mode always has
    /// something to say.
    pub fn render(context: &PromptContext<'_>) -> String {
        match context {
            PromptContext::Greeting { loan_type, field } => format!(
                "Hello! I'm here to help you with your {loan_type} loan application. \
                 To get started: {}",
                field.prompt
            ),
            PromptContext::NextField {
                field,
                position,
                total,
                ..
            } => format!("Thanks, noted ({position}/{total}). {}", field.prompt),
            PromptContext::Retry { field, error } => {
                format!("{} {}", error.reason, field.prompt)
            }
            PromptContext::Decision {
                loan_type,
                applicant_name,
                result,
            } => {
                let name = applicant_name.unwrap_or("there");
                let mut text = match result.decision {
                    lendia_types::application::Decision::Approved => format!(
                        "Great news {name}! You are approved for your {loan_type} loan: \
                         \u{20B9}{:.0} at {:.2}% per annum, about \u{20B9}{:.0}/month.",
                        result.approved_amount, result.annual_rate_percent, result.emi
                    ),
                    lendia_types::application::Decision::Conditional => format!(
                        "Good news {name}: you are eligible for a {loan_type} loan of \
                         \u{20B9}{:.0} at {:.2}% per annum, about \u{20B9}{:.0}/month. \
                         Our specialist will confirm the final terms with you.",
                        result.approved_amount, result.annual_rate_percent, result.emi
                    ),
                    lendia_types::application::Decision::Declined => format!(
                        "Thank you {name}. We are unable to approve this {loan_type} loan \
                         application right now."
                    ),
                };
                if !result.reasons.is_empty() {
                    text.push_str(&format!(" ({})", result.reasons.join("; ")));
                }
                text
            }
        }
    }
}

impl PromptGenerator for TemplatePromptGenerator {
    fn generate(
        &self,
        context: &PromptContext<'_>,
    ) -> impl std::future::Future<Output = Result<String, GenerationError>> + Send {
        let text = Self::render(context);
        async move { Ok(text) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lendia_types::application::Decision;
    use lendia_types::loan::FieldKind;

    fn field() -> FieldSpec {
        FieldSpec::new(
            "Customer_Name",
            "May I have your full name? (e.g., Riya Sharma)",
            FieldKind::Text { min_len: 2 },
        )
    }

    #[tokio::test]
    async fn test_greeting_mentions_loan_type_and_first_prompt() {
        let field = field();
        let text = TemplatePromptGenerator::new()
            .generate(&PromptContext::Greeting {
                loan_type: LoanType::Education,
                field: &field,
            })
            .await
            .unwrap();
        assert!(text.contains("education"));
        assert!(text.contains("full name"));
    }

    #[test]
    fn test_retry_leads_with_the_validation_reason() {
        let field = field();
        let error = ValidationError::new("Customer_Name", "Please provide your complete name.");
        let text = TemplatePromptGenerator::render(&PromptContext::Retry {
            field: &field,
            error: &error,
        });
        assert!(text.starts_with("Please provide your complete name."));
        assert!(text.contains("full name"));
    }

    #[test]
    fn test_decision_rendering_per_outcome() {
        let approved = EligibilityResult {
            decision: Decision::Approved,
            approved_amount: 800_000.0,
            annual_rate_percent: 9.5,
            emi: 16_801.0,
            reasons: vec![],
        };
        let text = TemplatePromptGenerator::render(&PromptContext::Decision {
            loan_type: LoanType::Education,
            applicant_name: Some("Riya"),
            result: &approved,
        });
        assert!(text.contains("approved"));
        assert!(text.contains("Riya"));

        let declined = EligibilityResult {
            decision: Decision::Declined,
            approved_amount: 0.0,
            annual_rate_percent: 10.5,
            emi: 0.0,
            reasons: vec!["instalment exceeds income share".to_string()],
        };
        let text = TemplatePromptGenerator::render(&PromptContext::Decision {
            loan_type: LoanType::Education,
            applicant_name: None,
            result: &declined,
        });
        assert!(text.contains("unable to approve"));
        assert!(text.contains("instalment exceeds income share"));
    }
}
