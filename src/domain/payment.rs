use super::address::Address;
use super::secret::PrivateKey;
use super::transaction::TxHash;
use std::fmt;

/// Unit the token balance is expressed in. SLP has no decimals, so amounts
/// are whole tokens.
pub const TOKEN_UNIT: &str = "SLP";

pub const EXPLORER_TX_URL: &str = "https://explorer.roninchain.com/tx/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentKind {
    Scholar,
    Trainer,
    Manager,
    Donation,
    Fee,
    Other,
}

impl PaymentKind {
    /// Category for a persona of the splits dialect. Unknown personas are
    /// paid all the same, under `Other`.
    pub fn from_persona(persona: &str) -> Self {
        match persona.trim().to_ascii_lowercase().as_str() {
            "scholar" => PaymentKind::Scholar,
            "trainer" => PaymentKind::Trainer,
            "manager" => PaymentKind::Manager,
            _ => PaymentKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentKind::Scholar => "scholar",
            PaymentKind::Trainer => "trainer",
            PaymentKind::Manager => "manager",
            PaymentKind::Donation => "donation",
            PaymentKind::Fee => "fee",
            PaymentKind::Other => "other",
        }
    }
}

impl fmt::Display for PaymentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a single transfer.
///
/// ```text
/// Created -> Signed -> Submitted -> Confirmed
///                          |
///                          v
///                        Failed -> Replacing -> Replaced
///                          |           |
///                          +-----------+-> Abandoned
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentState {
    Created,
    Signed,
    Submitted,
    Confirmed,
    Failed,
    Replacing,
    Replaced,
    Abandoned,
}

impl PaymentState {
    pub fn can_advance_to(self, next: PaymentState) -> bool {
        use PaymentState::*;
        matches!(
            (self, next),
            (Created, Signed)
                | (Signed, Submitted)
                | (Submitted, Confirmed)
                | (Submitted, Failed)
                | (Failed, Replacing)
                | (Failed, Abandoned)
                | (Replacing, Replaced)
                | (Replacing, Abandoned)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PaymentState::Confirmed | PaymentState::Replaced | PaymentState::Abandoned
        )
    }
}

/// Terminal result of executing a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Confirmed { hash: TxHash },
    /// The transfer failed and a zero-value transaction took over its nonce.
    Replaced { failed: TxHash, replacement: TxHash },
    /// The transfer failed and the replacement could not be broadcast either.
    Abandoned { failed: TxHash },
}

/// One token transfer out of a scholarship account.
#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    pub label: String,
    pub kind: PaymentKind,
    pub from: Address,
    pub from_key: PrivateKey,
    pub to: Address,
    pub amount: u64,
    state: PaymentState,
    nonce: Option<u64>,
    hash: Option<TxHash>,
}

impl Payment {
    pub fn new(
        label: impl Into<String>,
        kind: PaymentKind,
        from: Address,
        from_key: PrivateKey,
        to: Address,
        amount: u64,
    ) -> Self {
        Self {
            label: label.into(),
            kind,
            from,
            from_key,
            to,
            amount,
            state: PaymentState::Created,
            nonce: None,
            hash: None,
        }
    }

    pub fn state(&self) -> PaymentState {
        self.state
    }

    pub fn nonce(&self) -> Option<u64> {
        self.nonce
    }

    pub fn hash(&self) -> Option<TxHash> {
        self.hash
    }

    pub fn explorer_url(&self) -> Option<String> {
        self.hash.map(|hash| format!("{}{}", EXPLORER_TX_URL, hash))
    }

    pub(crate) fn mark_signed(&mut self, nonce: u64) {
        self.advance(PaymentState::Signed);
        self.nonce = Some(nonce);
    }

    pub(crate) fn mark_submitted(&mut self, hash: TxHash) {
        self.advance(PaymentState::Submitted);
        self.hash = Some(hash);
    }

    pub(crate) fn advance(&mut self, next: PaymentState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "invalid payment transition {:?} -> {:?}",
            self.state,
            next
        );
        self.state = next;
    }
}

impl fmt::Display for Payment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}) for the amount of {} {}",
            self.label, self.to, self.amount, TOKEN_UNIT
        )
    }
}
