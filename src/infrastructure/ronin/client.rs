use super::contract::TokenContract;
use super::rlp;
use super::settings::{ChainSettings, REPLACEMENT_GAS_LIMIT};
use crate::domain::address::{Address, HEX_PREFIX, keccak256};
use crate::domain::ports::ChainClient;
use crate::domain::secret::PrivateKey;
use crate::domain::transaction::{
    Receipt, ReceiptStatus, SignedTransaction, TransactionRequest, TxCall, TxHash,
};
use crate::error::{PayoutError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Value,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: String,
    status: Option<String>,
}

/// Ethereum JSON-RPC client for the Ronin chain.
///
/// Transactions are signed locally (EIP-155 legacy envelopes) and only the
/// raw bytes are sent to the node.
pub struct RoninRpcClient {
    http: reqwest::Client,
    settings: ChainSettings,
    contract: TokenContract,
    next_id: AtomicU64,
}

impl RoninRpcClient {
    pub fn new(settings: ChainSettings, contract: TokenContract) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
            contract,
            next_id: AtomicU64::new(1),
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params});
        tracing::trace!(method, id, "RPC request");

        let response = self
            .http
            .post(&self.settings.rpc_url)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PayoutError::Rpc(format!(
                "{} failed (status {})",
                method, status
            )));
        }
        let envelope: RpcEnvelope = response.json().await?;
        if let Some(error) = envelope.error {
            return Err(PayoutError::Rpc(format!(
                "{} failed: {} (code {})",
                method, error.message, error.code
            )));
        }
        Ok(serde_json::from_value(envelope.result)?)
    }

    fn encode_signed(
        &self,
        request: &TransactionRequest,
        key: &PrivateKey,
    ) -> Result<SignedTransaction> {
        let secret = libsecp256k1::SecretKey::parse(key.as_bytes())
            .map_err(|e| PayoutError::Signing(format!("{:?}", e)))?;
        let signer = signer_address(&secret);
        if signer != request.from {
            return Err(PayoutError::Signing(format!(
                "private key belongs to {}, not {}",
                signer, request.from
            )));
        }

        let (to, data, gas_limit) = match &request.call {
            TxCall::TokenTransfer { to, amount } => (
                self.contract.address,
                self.contract.encode_transfer(to, *amount),
                self.settings.gas_limit,
            ),
            TxCall::Replacement => (request.from, Vec::new(), REPLACEMENT_GAS_LIMIT),
        };
        let tx = LegacyTransaction {
            nonce: request.nonce,
            gas_price: self.settings.gas_price,
            gas_limit,
            to,
            value: 0,
            data,
        };
        Ok(sign_legacy(&tx, self.settings.chain_id, &secret))
    }
}

/// Pre-EIP-2718 transaction fields, in RLP order.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LegacyTransaction {
    nonce: u64,
    gas_price: u64,
    gas_limit: u64,
    to: Address,
    value: u64,
    data: Vec<u8>,
}

impl LegacyTransaction {
    fn fields(&self) -> Vec<Vec<u8>> {
        vec![
            rlp::encode_u64(self.nonce),
            rlp::encode_u64(self.gas_price),
            rlp::encode_u64(self.gas_limit),
            rlp::encode_bytes(self.to.as_bytes()),
            rlp::encode_u64(self.value),
            rlp::encode_bytes(&self.data),
        ]
    }

    /// EIP-155 signing hash: the fields followed by `chain_id, 0, 0`.
    fn signing_hash(&self, chain_id: u64) -> [u8; 32] {
        let mut unsigned = self.fields();
        unsigned.extend([
            rlp::encode_u64(chain_id),
            rlp::encode_u64(0),
            rlp::encode_u64(0),
        ]);
        keccak256(&rlp::encode_list(&unsigned))
    }
}

fn sign_legacy(
    tx: &LegacyTransaction,
    chain_id: u64,
    secret: &libsecp256k1::SecretKey,
) -> SignedTransaction {
    let digest = tx.signing_hash(chain_id);
    let (signature, recovery) =
        libsecp256k1::sign(&libsecp256k1::Message::parse(&digest), secret);
    let signature = signature.serialize();
    let v = u64::from(recovery.serialize()) + chain_id * 2 + 35;

    let mut fields = tx.fields();
    fields.extend([
        rlp::encode_u64(v),
        rlp::encode_bytes(rlp::trim_leading_zeros(&signature[..32])),
        rlp::encode_bytes(rlp::trim_leading_zeros(&signature[32..])),
    ]);
    let raw = rlp::encode_list(&fields);
    let hash = TxHash(keccak256(&raw));
    SignedTransaction { raw, hash }
}

#[async_trait]
impl ChainClient for RoninRpcClient {
    async fn token_balance(&self, account: &Address) -> Result<u64> {
        let data = format!(
            "{}{}",
            HEX_PREFIX,
            hex::encode(self.contract.encode_balance_of(account))
        );
        let call = json!({"to": self.contract.address.to_checksum(), "data": data});
        let result: String = self.call("eth_call", json!([call, "latest"])).await?;
        parse_quantity(&result)
    }

    async fn transaction_count(&self, account: &Address) -> Result<u64> {
        let result: String = self
            .call(
                "eth_getTransactionCount",
                json!([account.to_checksum(), "latest"]),
            )
            .await?;
        parse_quantity(&result)
    }

    fn sign_transaction(
        &self,
        request: &TransactionRequest,
        key: &PrivateKey,
    ) -> Result<SignedTransaction> {
        self.encode_signed(request, key)
    }

    async fn send_raw_transaction(&self, tx: &SignedTransaction) -> Result<TxHash> {
        let raw = format!("{}{}", HEX_PREFIX, hex::encode(&tx.raw));
        let result: String = self.call("eth_sendRawTransaction", json!([raw])).await?;
        TxHash::parse(&result)
            .ok_or_else(|| PayoutError::Rpc(format!("invalid transaction hash '{}'", result)))
    }

    async fn transaction_receipt(&self, hash: &TxHash) -> Result<Option<Receipt>> {
        let receipt: Option<RpcReceipt> = self
            .call("eth_getTransactionReceipt", json!([hash.to_string()]))
            .await?;
        let Some(receipt) = receipt else {
            return Ok(None);
        };
        let hash = TxHash::parse(&receipt.transaction_hash).unwrap_or(*hash);
        let status = match receipt.status.as_deref().map(parse_quantity) {
            Some(Ok(1)) => ReceiptStatus::Success,
            _ => ReceiptStatus::Failure,
        };
        Ok(Some(Receipt { hash, status }))
    }
}

fn signer_address(secret: &libsecp256k1::SecretKey) -> Address {
    let public = libsecp256k1::PublicKey::from_secret_key(secret).serialize();
    let hash = keccak256(&public[1..]);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash[12..]);
    Address::from_bytes(bytes)
}

/// Parses a hex quantity (`0x1c2`), or a 32-byte word as returned by `eth_call`.
fn parse_quantity(raw: &str) -> Result<u64> {
    let digits = raw
        .strip_prefix(HEX_PREFIX)
        .ok_or_else(|| PayoutError::Rpc(format!("invalid quantity '{}'", raw)))?;
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(0);
    }
    if digits.len() > 16 {
        return Err(PayoutError::Rpc(format!("quantity '{}' overflows u64", raw)));
    }
    u64::from_str_radix(digits, 16)
        .map_err(|e| PayoutError::Rpc(format!("invalid quantity '{}': {}", raw, e)))
}
