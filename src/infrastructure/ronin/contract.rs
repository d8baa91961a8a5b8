use crate::domain::address::{Address, keccak256};
use crate::error::{PayoutError, Result};
use serde::Deserialize;

/// ABI shipped with the binary; `--abi` can point to another file.
pub const BUNDLED_SLP_ABI: &str = include_str!("../../../abi/slp.json");

#[derive(Debug, Deserialize)]
struct AbiEntry {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Vec<AbiParam>,
}

#[derive(Debug, Deserialize)]
struct AbiParam {
    #[serde(rename = "type")]
    kind: String,
}

/// Handle on the token contract: its address and the selectors of the two
/// functions payouts use, derived from the ABI document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenContract {
    pub address: Address,
    transfer: [u8; 4],
    balance_of: [u8; 4],
}

impl TokenContract {
    pub fn from_abi(address: Address, abi_json: &str) -> Result<Self> {
        let entries: Vec<AbiEntry> = serde_json::from_str(abi_json)?;
        Ok(Self {
            address,
            transfer: selector(&entries, "transfer", &["address", "uint256"])?,
            balance_of: selector(&entries, "balanceOf", &["address"])?,
        })
    }

    pub fn encode_transfer(&self, to: &Address, amount: u64) -> Vec<u8> {
        let mut data = Vec::with_capacity(68);
        data.extend_from_slice(&self.transfer);
        data.extend_from_slice(&address_word(to));
        data.extend_from_slice(&uint_word(amount));
        data
    }

    pub fn encode_balance_of(&self, account: &Address) -> Vec<u8> {
        let mut data = Vec::with_capacity(36);
        data.extend_from_slice(&self.balance_of);
        data.extend_from_slice(&address_word(account));
        data
    }
}

fn selector(entries: &[AbiEntry], name: &str, inputs: &[&str]) -> Result<[u8; 4]> {
    let declared = entries.iter().any(|entry| {
        entry.kind == "function"
            && entry.name == name
            && entry.inputs.iter().map(|p| p.kind.as_str()).eq(inputs.iter().copied())
    });
    let signature = format!("{}({})", name, inputs.join(","));
    if !declared {
        return Err(PayoutError::Abi(format!("ABI does not declare {}", signature)));
    }
    let hash = keccak256(signature.as_bytes());
    Ok([hash[0], hash[1], hash[2], hash[3]])
}

fn address_word(address: &Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

fn uint_word(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}
