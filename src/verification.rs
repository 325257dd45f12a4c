//! Verification workflow: look up a certificate hash on the ledger and
//! produce a structured validity result.
//!
//! `Idle -> Verifying -> Valid | NotFound`, with transport and ledger
//! failures propagating as errors. The outcome is a tagged union so
//! callers handle every case explicitly instead of probing optional
//! fields.

use crate::error::{CertError, Result};
use crate::ledger::{CertHash, Ledger};
use crate::pinning;
use chrono::DateTime;
use serde::Serialize;

/// Exact reason string surfaced for a hash with no matching record.
pub const NOT_FOUND_REASON: &str = "Certificate not found";

/// Display fields derived from a matching certificate record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidCertificate {
    pub student_name: String,
    /// Gateway URL resolving the pinned file
    pub ipfs_link: String,
    /// Calendar date (`YYYY-MM-DD`), time-of-day dropped
    pub upload_date: String,
    /// Calendar date (`YYYY-MM-DD`), time-of-day dropped
    pub expiry_date: String,
    pub issuer_address: String,
    /// 0-100 score read from the ledger for the record's issuer
    pub issuer_reputation: u64,
    /// Passed through verbatim; an external moderation process owns it
    pub is_forged: bool,
}

/// Result of verifying one hash.
#[derive(Debug, Clone)]
pub enum VerificationOutcome {
    Valid(ValidCertificate),
    NotFound { reason: String },
}

impl VerificationOutcome {
    fn not_found() -> Self {
        Self::NotFound {
            reason: NOT_FOUND_REASON.to_owned(),
        }
    }
}

/// Orchestrates a single verification against an injected ledger.
pub struct VerificationWorkflow<'a> {
    ledger: &'a dyn Ledger,
    gateway_base: &'a str,
}

impl<'a> VerificationWorkflow<'a> {
    pub fn new(ledger: &'a dyn Ledger, gateway_base: &'a str) -> Self {
        Self {
            ledger,
            gateway_base,
        }
    }

    /// Verify a caller-supplied hash (typed in or taken from a `hash`
    /// query parameter).
    ///
    /// A malformed hash cannot match any record, so it yields `NotFound`
    /// rather than an error; only transport/ledger failures return `Err`.
    pub async fn verify(&self, hash_input: &str) -> Result<VerificationOutcome> {
        let hash = match CertHash::parse(hash_input) {
            Ok(hash) => hash,
            Err(_) => {
                tracing::debug!(hash_input, "Rejected malformed certificate hash");
                return Ok(VerificationOutcome::not_found());
            }
        };

        let record = self.ledger.verify_certificate(hash).await?;

        // Absence is encoded as an empty ipfsHash, not as an error
        if !record.exists() {
            return Ok(VerificationOutcome::not_found());
        }

        let issuer_reputation = self.ledger.reputation_score(record.issuer).await?;

        Ok(VerificationOutcome::Valid(ValidCertificate {
            student_name: record.student_name,
            ipfs_link: pinning::gateway_url(self.gateway_base, &record.ipfs_hash),
            upload_date: format_date(record.upload_timestamp)?,
            expiry_date: format_date(record.expiry_date)?,
            issuer_address: record.issuer.to_string(),
            issuer_reputation,
            is_forged: record.is_forged,
        }))
    }
}

/// Acknowledge a forgery report. Flagging itself is owned by an external
/// moderation process; this system only records that a report was made.
pub fn report_forged(hash: &str) {
    tracing::info!(hash, "Certificate reported as forged; queued for review");
}

/// Truncate a unix-seconds timestamp to a `YYYY-MM-DD` calendar date.
fn format_date(unix_secs: u64) -> Result<String> {
    let secs = i64::try_from(unix_secs)
        .map_err(|_| CertError::Ledger("Timestamp out of range".to_owned()))?;
    let datetime = DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| CertError::Ledger("Timestamp out of range".to_owned()))?;
    Ok(datetime.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date_truncates_time_of_day() {
        // 2030-01-01 00:00:00 UTC plus 15 hours of time-of-day
        assert_eq!(format_date(1_893_456_000 + 15 * 3600).unwrap(), "2030-01-01");
    }

    #[test]
    fn test_format_date_epoch() {
        assert_eq!(format_date(0).unwrap(), "1970-01-01");
    }

    #[test]
    fn test_valid_certificate_serializes_camel_case() {
        let cert = ValidCertificate {
            student_name: "Alice".to_owned(),
            ipfs_link: "https://ipfs.io/ipfs/QmTestCid".to_owned(),
            upload_date: "2026-08-30".to_owned(),
            expiry_date: "2030-01-01".to_owned(),
            issuer_address: "0x0000000000000000000000000000000000000000".to_owned(),
            issuer_reputation: 97,
            is_forged: false,
        };

        let json = serde_json::to_value(&cert).unwrap();
        assert_eq!(json["studentName"], "Alice");
        assert_eq!(json["issuerReputation"], 97);
        assert_eq!(json["isForged"], false);
    }
}
