//! Ronin chain adapter: Ethereum JSON-RPC, local signing, token ABI.

pub mod client;
pub mod contract;
pub mod rlp;
pub mod settings;
