use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const RONIN_PREFIX: &str = "ronin:";
pub const HEX_PREFIX: &str = "0x";

/// Keccak-256 digest, used for address checksums, ABI selectors and
/// transaction hashes.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{0}' is not a valid ronin address")]
pub struct InvalidAddress(pub String);

/// A 20-byte account address.
///
/// Accepts both the `ronin:` notation used in configuration files and the
/// `0x` notation the chain expects. Displays in `ronin:` notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn parse(raw: &str) -> Result<Self, InvalidAddress> {
        let invalid = || InvalidAddress(raw.to_string());
        let digits = raw
            .strip_prefix(RONIN_PREFIX)
            .or_else(|| raw.strip_prefix(HEX_PREFIX))
            .ok_or_else(invalid)?;
        if digits.len() != 40 {
            return Err(invalid());
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| invalid())?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Lowercase `0x` form, as sent over JSON-RPC.
    pub fn to_hex(&self) -> String {
        format!("{}{}", HEX_PREFIX, hex::encode(self.0))
    }

    /// EIP-55 mixed-case checksum form.
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = keccak256(lower.as_bytes());
        let mut out = String::with_capacity(42);
        out.push_str(HEX_PREFIX);
        for (i, c) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                hash[i / 2] >> 4
            } else {
                hash[i / 2] & 0x0f
            };
            if nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", RONIN_PREFIX, hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = InvalidAddress;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
