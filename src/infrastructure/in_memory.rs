use crate::domain::address::{Address, keccak256};
use crate::domain::ports::{ChainClient, ResultsLog};
use crate::domain::secret::PrivateKey;
use crate::domain::transaction::{
    Receipt, ReceiptStatus, SignedTransaction, TransactionRequest, TxCall, TxHash,
};
use crate::error::{PayoutError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct ChainState {
    balances: HashMap<Address, u64>,
    nonces: HashMap<Address, u64>,
    signed: HashMap<TxHash, TransactionRequest>,
    receipts: HashMap<TxHash, Receipt>,
    sent: Vec<TransactionRequest>,
    failing_transfers: usize,
    leave_pending: bool,
    reject_replacements: bool,
    offline: bool,
}

/// A deterministic chain simulator.
///
/// Transfers settle instantly and move token balances, unless the chain is
/// told to fail, leave transactions pending, or refuse to talk at all.
/// Clones share the same state, so a test can keep a handle on a chain it
/// has boxed into a `PaymentsManager`.
#[derive(Default, Clone)]
pub struct InMemoryChain {
    state: Arc<Mutex<ChainState>>,
}

impl InMemoryChain {
    /// Creates an empty chain: every balance and nonce starts at zero.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ChainState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_balance(&self, account: &Address, balance: u64) {
        self.state().balances.insert(*account, balance);
    }

    pub fn balance(&self, account: &Address) -> u64 {
        self.state().balances.get(account).copied().unwrap_or(0)
    }

    pub fn set_nonce(&self, account: &Address, nonce: u64) {
        self.state().nonces.insert(*account, nonce);
    }

    /// The next `count` token transfers are mined with a failure status.
    pub fn fail_next_transfers(&self, count: usize) {
        self.state().failing_transfers = count;
    }

    /// Broadcast transactions never get a receipt.
    pub fn leave_pending(&self, pending: bool) {
        self.state().leave_pending = pending;
    }

    pub fn reject_replacements(&self, reject: bool) {
        self.state().reject_replacements = reject;
    }

    /// Every RPC call fails.
    pub fn go_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    /// Every broadcast transaction, in order.
    pub fn sent(&self) -> Vec<TransactionRequest> {
        self.state().sent.clone()
    }

    fn check_online(state: &ChainState) -> Result<()> {
        if state.offline {
            return Err(PayoutError::Rpc("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainClient for InMemoryChain {
    async fn token_balance(&self, account: &Address) -> Result<u64> {
        let state = self.state();
        Self::check_online(&state)?;
        Ok(state.balances.get(account).copied().unwrap_or(0))
    }

    async fn transaction_count(&self, account: &Address) -> Result<u64> {
        let state = self.state();
        Self::check_online(&state)?;
        Ok(state.nonces.get(account).copied().unwrap_or(0))
    }

    fn sign_transaction(
        &self,
        request: &TransactionRequest,
        key: &PrivateKey,
    ) -> Result<SignedTransaction> {
        let mut raw = format!("{:?}", request).into_bytes();
        raw.extend_from_slice(key.as_bytes());
        let hash = TxHash(keccak256(&raw));
        self.state().signed.insert(hash, request.clone());
        Ok(SignedTransaction { raw, hash })
    }

    async fn send_raw_transaction(&self, tx: &SignedTransaction) -> Result<TxHash> {
        let mut state = self.state();
        Self::check_online(&state)?;
        let request = state
            .signed
            .get(&tx.hash)
            .cloned()
            .ok_or_else(|| PayoutError::Rpc("unknown transaction".to_string()))?;

        let status = match &request.call {
            TxCall::Replacement if state.reject_replacements => {
                return Err(PayoutError::Rpc("replacement transaction underpriced".to_string()));
            }
            TxCall::Replacement => ReceiptStatus::Success,
            TxCall::TokenTransfer { .. } if state.failing_transfers > 0 => {
                state.failing_transfers -= 1;
                ReceiptStatus::Failure
            }
            TxCall::TokenTransfer { to, amount } => {
                let from_balance = state.balances.get(&request.from).copied().unwrap_or(0);
                if from_balance < *amount {
                    ReceiptStatus::Failure
                } else {
                    state.balances.insert(request.from, from_balance - amount);
                    *state.balances.entry(*to).or_insert(0) += amount;
                    ReceiptStatus::Success
                }
            }
        };

        let next_nonce = state.nonces.entry(request.from).or_insert(0);
        *next_nonce = (*next_nonce).max(request.nonce + 1);
        if !state.leave_pending {
            state.receipts.insert(
                tx.hash,
                Receipt {
                    hash: tx.hash,
                    status,
                },
            );
        }
        state.sent.push(request);
        Ok(tx.hash)
    }

    async fn transaction_receipt(&self, hash: &TxHash) -> Result<Option<Receipt>> {
        let state = self.state();
        Self::check_online(&state)?;
        Ok(state.receipts.get(hash).cloned())
    }
}

/// Keeps results lines in memory, for tests and dry inspection.
#[derive(Default, Clone)]
pub struct InMemoryResultsLog {
    lines: Arc<Mutex<Vec<String>>>,
}

impl InMemoryResultsLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ResultsLog for InMemoryResultsLog {
    fn record(&self, line: &str) -> Result<()> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
        Ok(())
    }
}
