use super::address::{Address, HEX_PREFIX};
use serde::Deserialize;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Length of a `0x`-prefixed, hex-encoded 32-byte secp256k1 key.
pub const PRIVATE_KEY_LEN: usize = 66;

/// A validated private key. `Debug` never prints the key material.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey([u8; 32]);

impl PrivateKey {
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.len() != PRIVATE_KEY_LEN {
            return None;
        }
        let digits = raw.strip_prefix(HEX_PREFIX)?;
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes).ok()?;
        Some(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// Account address to private key mapping, as read from the secrets file.
///
/// Keys may use either the `ronin:` or `0x` notation. Values are kept raw so
/// the validator can tell a missing key apart from a malformed one. An
/// account listed twice with different keys is kept as conflicting and never
/// resolves to a key.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "HashMap<String, String>")]
pub struct SecretMap {
    entries: HashMap<Address, String>,
    conflicts: HashSet<Address>,
}

impl SecretMap {
    /// `None` for unknown and for conflicting accounts.
    pub fn get(&self, account: &Address) -> Option<&str> {
        if self.conflicts.contains(account) {
            return None;
        }
        self.entries.get(account).map(String::as_str)
    }

    pub fn is_conflicting(&self, account: &Address) -> bool {
        self.conflicts.contains(account)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<HashMap<String, String>> for SecretMap {
    fn from(raw: HashMap<String, String>) -> Self {
        let mut map = SecretMap::default();
        for (account, key) in raw {
            let address = match Address::parse(&account) {
                Ok(address) => address,
                Err(e) => {
                    tracing::warn!("Ignoring secrets entry: {}", e);
                    continue;
                }
            };
            match map.entries.entry(address) {
                Entry::Vacant(slot) => {
                    slot.insert(key);
                }
                Entry::Occupied(slot) if *slot.get() != key => {
                    tracing::warn!("Account {} is listed twice with different keys", address);
                    map.conflicts.insert(address);
                }
                Entry::Occupied(_) => {}
            }
        }
        map
    }
}

impl<const N: usize> From<[(&str, &str); N]> for SecretMap {
    fn from(pairs: [(&str, &str); N]) -> Self {
        pairs
            .into_iter()
            .map(|(account, key)| (account.to_string(), key.to_string()))
            .collect::<HashMap<_, _>>()
            .into()
    }
}
