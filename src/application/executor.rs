use crate::domain::payment::{Payment, PaymentOutcome, PaymentState};
use crate::domain::ports::{ChainClient, ResultsLog};
use crate::domain::summary::PaymentsSummary;
use crate::domain::transaction::{ReceiptStatus, TransactionRequest, TxCall, TxHash};
use crate::error::Result;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct ExecutionSettings {
    /// Delay between two receipt lookups.
    pub poll_interval: Duration,
    /// A transfer without a receipt after this long is treated as stuck.
    pub receipt_timeout: Duration,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            receipt_timeout: Duration::from_secs(120),
        }
    }
}

/// Drives one [`Payment`] from `Created` to a terminal state.
///
/// Payments from the same account must be executed one after the other:
/// the nonce is read from the chain right before signing, so a payment
/// started before the previous one settled would reuse its nonce.
pub struct PaymentExecutor<'a> {
    chain: &'a dyn ChainClient,
    results: &'a dyn ResultsLog,
    settings: &'a ExecutionSettings,
}

impl<'a> PaymentExecutor<'a> {
    /// Creates a new `PaymentExecutor`.
    ///
    /// # Arguments
    ///
    /// * `chain` - Client used to read nonces, sign, broadcast and poll receipts.
    /// * `results` - Audit trail receiving one line per settled payment.
    /// * `settings` - Receipt polling interval and timeout.
    pub fn new(
        chain: &'a dyn ChainClient,
        results: &'a dyn ResultsLog,
        settings: &'a ExecutionSettings,
    ) -> Self {
        Self {
            chain,
            results,
            settings,
        }
    }

    /// Signs, broadcasts and settles `payment`.
    ///
    /// A confirmed transfer is added to `summary`. A failed or stuck one is
    /// replaced by a zero-value transaction with the same nonce and is not
    /// retried here. Errors are RPC failures before or during broadcast of
    /// the transfer itself, or while waiting for its receipt. Results log
    /// failures are only reported through `tracing`.
    pub async fn execute(
        &self,
        payment: &mut Payment,
        summary: &mut PaymentsSummary,
    ) -> Result<PaymentOutcome> {
        let nonce = self.chain.transaction_count(&payment.from).await?;
        let request = TransactionRequest {
            from: payment.from,
            nonce,
            call: TxCall::TokenTransfer {
                to: payment.to,
                amount: payment.amount,
            },
        };
        let signed = self.chain.sign_transaction(&request, &payment.from_key)?;
        payment.mark_signed(nonce);

        let hash = self.chain.send_raw_transaction(&signed).await?;
        if hash != signed.hash {
            tracing::warn!(local = %signed.hash, remote = %hash, "Node reported a different transaction hash");
        }
        payment.mark_submitted(hash);
        tracing::debug!(%hash, nonce, "Submitted {}", payment);

        match self.wait_for_receipt(&hash).await? {
            Some(ReceiptStatus::Success) => {
                payment.advance(PaymentState::Confirmed);
                summary.record(payment.kind, payment.amount);
                let line = format!(
                    "Important: Transaction {} completed! Hash: {} - Explorer: {}",
                    payment,
                    hash,
                    payment.explorer_url().unwrap_or_default()
                );
                tracing::info!(important = true, "{}", line);
                self.record_result(&line);
                Ok(PaymentOutcome::Confirmed { hash })
            }
            status => {
                payment.advance(PaymentState::Failed);
                if status.is_none() {
                    tracing::warn!(%hash, "No receipt after {:?}", self.settings.receipt_timeout);
                }
                let line = format!(
                    "Important: Transaction {} failed. Trying to replace it with a 0 value tx and re-try.",
                    payment
                );
                tracing::warn!(important = true, "{}", line);
                let outcome = self.replace(payment, nonce, hash).await;
                self.record_result(&line);
                Ok(outcome)
            }
        }
    }

    /// The transfer has already settled on chain at this point, so a
    /// results log that cannot be written must not change the outcome.
    fn record_result(&self, line: &str) {
        if let Err(e) = self.results.record(line) {
            tracing::error!("Could not write to the results log: {}. Lost line: {}", e, line);
        }
    }

    async fn replace(&self, payment: &mut Payment, nonce: u64, failed: TxHash) -> PaymentOutcome {
        payment.advance(PaymentState::Replacing);
        let request = TransactionRequest {
            from: payment.from,
            nonce,
            call: TxCall::Replacement,
        };
        let sent = match self.chain.sign_transaction(&request, &payment.from_key) {
            Ok(signed) => self.chain.send_raw_transaction(&signed).await,
            Err(e) => Err(e),
        };
        match sent {
            Ok(replacement) => {
                payment.advance(PaymentState::Replaced);
                tracing::info!(%failed, %replacement, nonce, "Replacement transaction sent");
                PaymentOutcome::Replaced {
                    failed,
                    replacement,
                }
            }
            Err(e) => {
                payment.advance(PaymentState::Abandoned);
                tracing::error!(%failed, nonce, "Could not send replacement transaction: {}", e);
                PaymentOutcome::Abandoned { failed }
            }
        }
    }

    /// `None` when no receipt showed up before the timeout.
    async fn wait_for_receipt(&self, hash: &TxHash) -> Result<Option<ReceiptStatus>> {
        let deadline = Instant::now() + self.settings.receipt_timeout;
        loop {
            if let Some(receipt) = self.chain.transaction_receipt(hash).await? {
                return Ok(Some(receipt.status));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(self.settings.poll_interval).await;
        }
    }
}
