use crate::domain::address::Address;

pub const DEFAULT_RPC_URL: &str = "https://api.roninchain.com/rpc";
pub const RONIN_CHAIN_ID: u64 = 2020;
pub const DEFAULT_GAS_LIMIT: u64 = 492_874;
/// Plain value transfer, used by replacement transactions.
pub const REPLACEMENT_GAS_LIMIT: u64 = 21_000;

/// `0xa8754b9fa15fc18bb59458815510e40a12cd2014`
pub const SLP_CONTRACT: Address = Address::from_bytes([
    0xa8, 0x75, 0x4b, 0x9f, 0xa1, 0x5f, 0xc1, 0x8b, 0xb5, 0x94, 0x58, 0x81, 0x55, 0x10, 0xe4, 0x0a,
    0x12, 0xcd, 0x20, 0x14,
]);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSettings {
    pub rpc_url: String,
    pub chain_id: u64,
    pub token_contract: Address,
    pub gas_limit: u64,
    /// In wei.
    pub gas_price: u64,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            chain_id: RONIN_CHAIN_ID,
            token_contract: SLP_CONTRACT,
            gas_limit: DEFAULT_GAS_LIMIT,
            gas_price: 0,
        }
    }
}
