//! Ledger client: a read/write binding to the deployed certificate contract.
//!
//! The contract exposes three methods: `storeCertificate` (write),
//! `verifyCertificate` and `getReputationScore` (reads). Calls are
//! single-shot JSON-RPC 2.0 requests to the configured endpoint; the client
//! holds no cache and performs no batching or retries.
//!
//! The contract has no explicit existence flag: a lookup that matches
//! nothing comes back with an empty `ipfsHash` field, and callers must
//! check [`CertificateRecord::exists`] rather than expect an error.
//!
//! Signing is delegated to the node (`eth_sendTransaction` from an
//! unlocked account). Whether a signer is available is an explicit check
//! ([`CertError::SignerUnavailable`] when `eth_accounts` is empty), not an
//! ambient assumption.

use crate::error::{CertError, Result};
use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{SolCall as _, sol};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::fmt;
use std::time::Duration;

sol! {
    function storeCertificate(string studentName, bytes32 certiHash, string ipfsHash, uint256 expiryDate);
    function verifyCertificate(bytes32 certiHash) external view returns (string studentName, string ipfsHash, uint256 uploadTimestamp, uint256 expiryDate, bool isForged, address issuer);
    function getReputationScore(address issuer) external view returns (uint256 score);
}

/// A certificate's ledger identity: the SHA-256 digest of its bytes,
/// carried on the wire as a `bytes32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CertHash(B256);

impl CertHash {
    /// Parse a 64-character hex digest, with or without a `0x` prefix.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);

        if stripped.len() != 64 || !stripped.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CertError::Validation(format!(
                "Invalid certificate hash: expected 64 hex characters, got {trimmed:?}"
            )));
        }

        let bytes = hex::decode(stripped)
            .map_err(|e| CertError::Validation(format!("Invalid certificate hash: {e}")))?;
        Ok(Self(B256::from_slice(&bytes)))
    }

    pub fn as_b256(&self) -> B256 {
        self.0
    }
}

impl fmt::Display for CertHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// A certificate record as stored by the contract.
#[derive(Debug, Clone)]
pub struct CertificateRecord {
    pub student_name: String,
    /// CID of the pinned file; empty when no record matches the hash
    pub ipfs_hash: String,
    /// Unix seconds when the record was written
    pub upload_timestamp: u64,
    /// Unix seconds validity cutoff
    pub expiry_date: u64,
    /// Externally-set fraud flag, owned by a moderation process
    pub is_forged: bool,
    pub issuer: Address,
}

impl CertificateRecord {
    /// Whether a record actually exists for the queried hash.
    pub fn exists(&self) -> bool {
        !self.ipfs_hash.is_empty()
    }
}

/// Receipt of a confirmed `storeCertificate` transaction.
#[derive(Debug, Clone)]
pub struct TxReceipt {
    pub transaction_hash: String,
    pub block_number: Option<u64>,
}

/// Read/write access to the certificate contract.
///
/// Workflows take this as an injected dependency so tests can substitute
/// an in-memory ledger.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Look up a certificate record by hash. Absence is encoded as an
    /// empty `ipfs_hash`, never as an error.
    async fn verify_certificate(&self, hash: CertHash) -> Result<CertificateRecord>;

    /// Fetch the reputation score for an issuer address. Defined for any
    /// address; the contract defaults unknown issuers to zero.
    async fn reputation_score(&self, issuer: Address) -> Result<u64>;

    /// Check that a signing identity is available before a write is
    /// attempted. Returns [`CertError::SignerUnavailable`] when the
    /// endpoint manages no accounts.
    async fn signer_available(&self) -> Result<()>;

    /// Record a certificate on the ledger and wait for confirmation.
    async fn store_certificate(
        &self,
        student_name: &str,
        hash: CertHash,
        cid: &str,
        expiry_secs: u64,
    ) -> Result<TxReceipt>;
}

const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(500);
const RECEIPT_POLL_ATTEMPTS: u32 = 120;

/// JSON-RPC implementation of [`Ledger`] against a single contract
/// instance at a configured endpoint.
pub struct RpcLedgerClient {
    http: reqwest::Client,
    rpc_url: String,
    contract: Address,
}

impl RpcLedgerClient {
    pub fn new(rpc_url: impl Into<String>, contract_address: &str) -> Result<Self> {
        let contract: Address = contract_address
            .parse()
            .map_err(|e| CertError::Config(format!("Invalid contract address: {e}")))?;

        Ok(Self {
            http: reqwest::Client::new(),
            rpc_url: rpc_url.into(),
            contract,
        })
    }

    /// Issue a single JSON-RPC 2.0 request and unwrap the envelope.
    async fn rpc(&self, method: &str, params: Value) -> Result<Value> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| CertError::Ledger(format!("RPC request failed: {e}")))?;

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| CertError::Ledger(format!("Malformed RPC response: {e}")))?;

        if let Some(err) = envelope.get("error") {
            let message = err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown RPC error");
            return Err(CertError::Ledger(format!("{method}: {message}")));
        }

        envelope
            .get("result")
            .cloned()
            .ok_or_else(|| CertError::Ledger(format!("{method}: response missing result")))
    }

    /// `eth_call` against the contract with pre-encoded calldata.
    async fn eth_call(&self, calldata: Vec<u8>) -> Result<Vec<u8>> {
        let params = json!([
            {
                "to": self.contract.to_string(),
                "data": format!("0x{}", hex::encode(calldata)),
            },
            "latest",
        ]);

        let result = self.rpc("eth_call", params).await?;
        let encoded = result
            .as_str()
            .ok_or_else(|| CertError::Ledger("eth_call returned a non-string result".to_owned()))?;

        hex::decode(encoded.trim_start_matches("0x"))
            .map_err(|e| CertError::Ledger(format!("eth_call returned invalid hex: {e}")))
    }

    /// Discover the node-managed signing account, or report typed absence.
    async fn signer_account(&self) -> Result<String> {
        let result = self.rpc("eth_accounts", json!([])).await?;
        result
            .as_array()
            .and_then(|accounts| accounts.first())
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or(CertError::SignerUnavailable)
    }

    /// Poll until the transaction is mined or the attempt budget runs out.
    async fn wait_for_receipt(&self, tx_hash: &str) -> Result<TxReceipt> {
        for _ in 0..RECEIPT_POLL_ATTEMPTS {
            let result = self.rpc("eth_getTransactionReceipt", json!([tx_hash])).await?;

            if !result.is_null() {
                let status_ok = result
                    .get("status")
                    .and_then(Value::as_str)
                    .map(|s| s == "0x1")
                    .unwrap_or(true);

                if !status_ok {
                    return Err(CertError::Ledger(format!(
                        "Transaction {tx_hash} was mined but reverted"
                    )));
                }

                let block_number = result
                    .get("blockNumber")
                    .and_then(Value::as_str)
                    .and_then(|s| u64::from_str_radix(s.trim_start_matches("0x"), 16).ok());

                return Ok(TxReceipt {
                    transaction_hash: tx_hash.to_owned(),
                    block_number,
                });
            }

            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }

        Err(CertError::Ledger(format!(
            "Timed out waiting for transaction {tx_hash} to be mined"
        )))
    }
}

fn to_u64(value: U256, field: &str) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| CertError::Ledger(format!("Contract returned out-of-range {field}")))
}

#[async_trait]
impl Ledger for RpcLedgerClient {
    async fn verify_certificate(&self, hash: CertHash) -> Result<CertificateRecord> {
        let call = verifyCertificateCall {
            certiHash: hash.as_b256(),
        };
        let raw = self.eth_call(call.abi_encode()).await?;

        let decoded = verifyCertificateCall::abi_decode_returns(&raw, true)
            .map_err(|e| CertError::Ledger(format!("Failed to decode verifyCertificate: {e}")))?;

        Ok(CertificateRecord {
            student_name: decoded.studentName,
            ipfs_hash: decoded.ipfsHash,
            upload_timestamp: to_u64(decoded.uploadTimestamp, "uploadTimestamp")?,
            expiry_date: to_u64(decoded.expiryDate, "expiryDate")?,
            is_forged: decoded.isForged,
            issuer: decoded.issuer,
        })
    }

    async fn reputation_score(&self, issuer: Address) -> Result<u64> {
        let call = getReputationScoreCall { issuer };
        let raw = self.eth_call(call.abi_encode()).await?;

        let decoded = getReputationScoreCall::abi_decode_returns(&raw, true)
            .map_err(|e| CertError::Ledger(format!("Failed to decode getReputationScore: {e}")))?;

        to_u64(decoded.score, "reputation score")
    }

    async fn signer_available(&self) -> Result<()> {
        self.signer_account().await.map(|_| ())
    }

    async fn store_certificate(
        &self,
        student_name: &str,
        hash: CertHash,
        cid: &str,
        expiry_secs: u64,
    ) -> Result<TxReceipt> {
        let from = self.signer_account().await?;

        let call = storeCertificateCall {
            studentName: student_name.to_owned(),
            certiHash: hash.as_b256(),
            ipfsHash: cid.to_owned(),
            expiryDate: U256::from(expiry_secs),
        };

        let params = json!([{
            "from": from,
            "to": self.contract.to_string(),
            "data": format!("0x{}", hex::encode(call.abi_encode())),
        }]);

        let result = self.rpc("eth_sendTransaction", params).await?;
        let tx_hash = result.as_str().ok_or_else(|| {
            CertError::Ledger("eth_sendTransaction returned a non-string result".to_owned())
        })?;

        tracing::info!(tx_hash, student_name, "Submitted storeCertificate transaction");
        self.wait_for_receipt(tx_hash).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HASH: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn test_cert_hash_parse_plain() {
        let hash = CertHash::parse(SAMPLE_HASH).unwrap();
        assert_eq!(hash.to_string(), SAMPLE_HASH);
    }

    #[test]
    fn test_cert_hash_parse_0x_prefixed() {
        let hash = CertHash::parse(&format!("0x{SAMPLE_HASH}")).unwrap();
        assert_eq!(hash.to_string(), SAMPLE_HASH);
    }

    #[test]
    fn test_cert_hash_parse_rejects_short_input() {
        assert!(CertHash::parse("7184cf8e").is_err());
    }

    #[test]
    fn test_cert_hash_parse_rejects_non_hex() {
        let bad = "z".repeat(64);
        assert!(CertHash::parse(&bad).is_err());
    }

    #[test]
    fn test_record_existence_is_ipfs_hash_presence() {
        let mut record = CertificateRecord {
            student_name: "Alice".to_owned(),
            ipfs_hash: String::new(),
            upload_timestamp: 1_700_000_000,
            expiry_date: 1_900_000_000,
            is_forged: false,
            issuer: Address::ZERO,
        };
        assert!(!record.exists());

        record.ipfs_hash = "QmTestCid".to_owned();
        assert!(record.exists());
    }

    #[test]
    fn test_store_certificate_calldata_roundtrip() {
        let call = storeCertificateCall {
            studentName: "Alice".to_owned(),
            certiHash: CertHash::parse(SAMPLE_HASH).unwrap().as_b256(),
            ipfsHash: "QmTestCid".to_owned(),
            expiryDate: U256::from(1_893_456_000u64),
        };

        let encoded = call.abi_encode();
        let decoded = storeCertificateCall::abi_decode(&encoded, true).unwrap();
        assert_eq!(decoded.studentName, "Alice");
        assert_eq!(decoded.ipfsHash, "QmTestCid");
    }
}
