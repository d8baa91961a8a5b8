use crate::domain::payment::Payment;
use crate::domain::ports::Confirmation;
use dialoguer::Confirm;

/// Asks the operator on the terminal before paying each scholar.
///
/// Anything other than an explicit yes, including a closed terminal,
/// counts as a refusal.
#[derive(Debug, Default)]
pub struct InteractivePrompt;

impl Confirmation for InteractivePrompt {
    fn confirm(&self, scholar: &str, payments: &[Payment]) -> bool {
        let prompt = format!(
            "Do you want to proceed with the {} payments for '{}'?",
            payments.len(),
            scholar
        );
        match Confirm::new().with_prompt(prompt).default(false).interact() {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!("Could not read confirmation: {}", e);
                false
            }
        }
    }
}

/// Approves every plan; selected with `--yes`.
#[derive(Debug, Default)]
pub struct AutoApprove;

impl Confirmation for AutoApprove {
    fn confirm(&self, scholar: &str, payments: &[Payment]) -> bool {
        tracing::debug!(payments = payments.len(), "Auto-approving payments for '{}'", scholar);
        true
    }
}
