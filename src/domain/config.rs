//! Normalized payout configuration.
//!
//! Both configuration dialects are validated into these types; nothing past
//! the validator needs to know which JSON shape the operator wrote.

use super::address::Address;
use super::secret::PrivateKey;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fmt;

/// Ceiling for any single percentage and for every per-scholar sum.
/// The remaining 2 points are reserved for the software fee.
pub const MAX_PERCENT: Decimal = dec!(98);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `Manager` / `Scholars` / `Donations`, manager absorbs the remainder.
    Legacy,
    /// `scholars[].splits` / `donations`, every share explicit.
    New,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Legacy => write!(f, "legacy"),
            Dialect::New => write!(f, "new"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Donation {
    pub name: String,
    pub address: Address,
    pub percent: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub persona: String,
    pub address: Address,
    pub percent: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trainer {
    pub address: Address,
    pub percent: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegacyScholar {
    pub name: String,
    pub account: Address,
    pub payout_address: Address,
    pub percent: Decimal,
    /// Absolute amount that replaces the percentage-based scholar share.
    pub fixed_payout: Option<u64>,
    pub trainer: Option<Trainer>,
    /// Copied from the top-level `Manager` field.
    pub manager: Address,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplitScholar {
    pub name: String,
    pub account: Address,
    pub splits: Vec<Split>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScholarConfig {
    Legacy(LegacyScholar),
    New(SplitScholar),
}

impl ScholarConfig {
    pub fn name(&self) -> &str {
        match self {
            ScholarConfig::Legacy(s) => &s.name,
            ScholarConfig::New(s) => &s.name,
        }
    }

    pub fn account(&self) -> &Address {
        match self {
            ScholarConfig::Legacy(s) => &s.account,
            ScholarConfig::New(s) => &s.account,
        }
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            ScholarConfig::Legacy(_) => Dialect::Legacy,
            ScholarConfig::New(_) => Dialect::New,
        }
    }
}

/// A scholar together with the key of its scholarship account.
#[derive(Debug, Clone, PartialEq)]
pub struct ScholarAccount {
    pub config: ScholarConfig,
    pub private_key: PrivateKey,
}

impl ScholarAccount {
    pub fn name(&self) -> &str {
        self.config.name()
    }

    pub fn account(&self) -> &Address {
        self.config.account()
    }
}

/// Output of validation: everything a payout pass needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPayouts {
    pub dialect: Dialect,
    pub manager: Option<Address>,
    pub scholars: Vec<ScholarAccount>,
    pub donations: Vec<Donation>,
}
