use super::address::{Address, HEX_PREFIX};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxHash(pub [u8; 32]);

impl TxHash {
    pub fn parse(raw: &str) -> Option<Self> {
        let digits = raw.strip_prefix(HEX_PREFIX)?;
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes).ok()?;
        Some(Self(bytes))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", HEX_PREFIX, hex::encode(self.0))
    }
}

/// What a transaction does once mined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxCall {
    /// Token contract `transfer(to, amount)`.
    TokenTransfer { to: Address, amount: u64 },
    /// Zero-value transfer to the sender itself, used to take over a stuck nonce.
    Replacement,
}

/// An unsigned transaction, ready to be signed by the sender's key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub from: Address,
    pub nonce: u64,
    pub call: TxCall,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub raw: Vec<u8>,
    pub hash: TxHash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub hash: TxHash,
    pub status: ReceiptStatus,
}
