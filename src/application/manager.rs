use super::executor::{ExecutionSettings, PaymentExecutor};
use crate::domain::address::Address;
use crate::domain::calculator::PayoutCalculator;
use crate::domain::config::{ScholarAccount, ValidatedPayouts};
use crate::domain::payment::{Payment, PaymentOutcome};
use crate::domain::ports::{ChainClientBox, ConfirmationBox, ResultsLogBox};
use crate::domain::summary::PaymentsSummary;
use crate::error::{InsufficientBalance, Result};

/// How the payout pass went for one scholar.
#[derive(Debug, Clone, PartialEq)]
pub enum ScholarOutcome {
    /// The scholarship account holds no tokens.
    NoBalance,
    /// Nothing was paid: the balance cannot cover the plan.
    Skipped(InsufficientBalance),
    /// The operator declined the plan.
    Canceled,
    /// Every planned payment reached a terminal state.
    Completed { confirmed: usize, replaced: usize },
    /// An RPC error or an abandoned payment stopped the remaining payments.
    Aborted(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScholarReport {
    pub name: String,
    pub account: Address,
    pub outcome: ScholarOutcome,
}

/// Runs one payout pass over every validated scholar.
///
/// Scholars are handled one at a time, in configuration order. A failure
/// with one scholar never stops the pass.
pub struct PaymentsManager {
    payouts: ValidatedPayouts,
    calculator: PayoutCalculator,
    chain: ChainClientBox,
    results: ResultsLogBox,
    confirmation: ConfirmationBox,
    settings: ExecutionSettings,
    summary: PaymentsSummary,
}

impl PaymentsManager {
    /// Creates a new `PaymentsManager` with an empty summary.
    ///
    /// # Arguments
    ///
    /// * `payouts` - Validated scholars, with their keys, and donations.
    /// * `chain` - Chain client used for balances and transfers.
    /// * `results` - Audit trail of settled payments.
    /// * `confirmation` - Decides whether each scholar's plan goes ahead.
    /// * `settings` - Receipt polling settings handed to every execution.
    pub fn new(
        payouts: ValidatedPayouts,
        chain: ChainClientBox,
        results: ResultsLogBox,
        confirmation: ConfirmationBox,
        settings: ExecutionSettings,
    ) -> Self {
        let calculator = PayoutCalculator::new(payouts.donations.clone());
        Self {
            payouts,
            calculator,
            chain,
            results,
            confirmation,
            settings,
            summary: PaymentsSummary::new(),
        }
    }

    pub fn summary(&self) -> &PaymentsSummary {
        &self.summary
    }

    pub fn clear_summary(&mut self) {
        self.summary.clear();
    }

    /// Pays every scholar once, in configuration order, and logs the summary.
    ///
    /// Returns one report per scholar. The summary keeps accumulating across
    /// calls until [`PaymentsManager::clear_summary`].
    pub async fn run(&mut self) -> Vec<ScholarReport> {
        tracing::info!(
            dialect = %self.payouts.dialect,
            scholars = self.payouts.scholars.len(),
            "Starting payouts"
        );
        let scholars = self.payouts.scholars.clone();
        let mut reports = Vec::with_capacity(scholars.len());
        for scholar in &scholars {
            let outcome = match self.pay_scholar(scholar).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(
                        account = %scholar.account(),
                        "Payouts for '{}' interrupted: {}",
                        scholar.name(),
                        e
                    );
                    ScholarOutcome::Aborted(e.to_string())
                }
            };
            reports.push(ScholarReport {
                name: scholar.name().to_string(),
                account: *scholar.account(),
                outcome,
            });
        }
        tracing::info!("Transactions Summary:\n{}", self.summary);
        reports
    }

    async fn pay_scholar(&mut self, scholar: &ScholarAccount) -> Result<ScholarOutcome> {
        let name = scholar.name();
        let balance = self.chain.token_balance(scholar.account()).await?;
        if balance == 0 {
            tracing::info!(account = %scholar.account(), "No balance to pay out for '{}'", name);
            return Ok(ScholarOutcome::NoBalance);
        }

        let mut payments = match self.calculator.plan(balance, scholar) {
            Ok(payments) => payments,
            Err(reason) => {
                tracing::info!(account = %scholar.account(), balance, "Skipping '{}': {}", name, reason);
                return Ok(ScholarOutcome::Skipped(reason));
            }
        };

        tracing::info!(balance, dialect = %scholar.config.dialect(), "Payments planned for '{}':", name);
        for payment in &payments {
            tracing::info!("{}", payment);
        }

        if !self.confirmation.confirm(name, &payments) {
            tracing::info!("Transactions canceled for account: '{}'", name);
            return Ok(ScholarOutcome::Canceled);
        }

        let outcome = self.execute_all(&mut payments).await?;
        if matches!(outcome, ScholarOutcome::Completed { .. }) {
            tracing::info!("Transactions completed for account: '{}'", name);
        }
        Ok(outcome)
    }

    async fn execute_all(&mut self, payments: &mut [Payment]) -> Result<ScholarOutcome> {
        let executor =
            PaymentExecutor::new(self.chain.as_ref(), self.results.as_ref(), &self.settings);
        let count = payments.len();
        let (mut confirmed, mut replaced) = (0, 0);
        for (index, payment) in payments.iter_mut().enumerate() {
            let outcome = executor.execute(payment, &mut self.summary).await?;
            debug_assert!(payment.state().is_terminal());
            match outcome {
                PaymentOutcome::Confirmed { .. } => confirmed += 1,
                PaymentOutcome::Replaced { .. } => replaced += 1,
                PaymentOutcome::Abandoned { failed } => {
                    let dropped = count - index - 1;
                    tracing::error!(
                        %failed,
                        dropped,
                        "Nonce of '{}' is blocked, dropping its remaining payments",
                        payment.label
                    );
                    return Ok(ScholarOutcome::Aborted(format!(
                        "transaction {} could not be replaced",
                        failed
                    )));
                }
            }
        }
        Ok(ScholarOutcome::Completed {
            confirmed,
            replaced,
        })
    }
}
