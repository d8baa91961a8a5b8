use super::address::Address;
use super::payment::Payment;
use super::secret::PrivateKey;
use super::transaction::{Receipt, SignedTransaction, TransactionRequest, TxHash};
use crate::error::Result;
use async_trait::async_trait;

/// The subset of a chain client the payout engine needs.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Token balance of `account`, in the token's smallest unit.
    async fn token_balance(&self, account: &Address) -> Result<u64>;
    /// Number of transactions sent by `account`; the next nonce to use.
    async fn transaction_count(&self, account: &Address) -> Result<u64>;
    fn sign_transaction(
        &self,
        request: &TransactionRequest,
        key: &PrivateKey,
    ) -> Result<SignedTransaction>;
    async fn send_raw_transaction(&self, tx: &SignedTransaction) -> Result<TxHash>;
    /// `None` while the transaction is still pending.
    async fn transaction_receipt(&self, hash: &TxHash) -> Result<Option<Receipt>>;
}

/// Append-only audit trail of terminal payment outcomes.
pub trait ResultsLog: Send + Sync {
    fn record(&self, line: &str) -> Result<()>;
}

/// Decides whether the planned payments of a scholar go ahead.
pub trait Confirmation: Send + Sync {
    fn confirm(&self, scholar: &str, payments: &[Payment]) -> bool;
}

pub type ChainClientBox = Box<dyn ChainClient>;
pub type ResultsLogBox = Box<dyn ResultsLog>;
pub type ConfirmationBox = Box<dyn Confirmation>;
