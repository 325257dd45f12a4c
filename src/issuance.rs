//! Issuance workflow: hash a certificate file, pin it, record it on the
//! ledger, and produce a shareable verification link.
//!
//! The workflow is a straight-line state machine:
//! `Idle -> Hashing -> Pinning -> AwaitingSignature -> Submitting -> Success`,
//! with failure from any middle state terminating the run. Nothing rolls
//! back: a file can remain pinned when the ledger write fails, since the
//! pinning network has no transactional link to the ledger. A new attempt
//! restarts from the beginning; no step is retried automatically.

use crate::error::{CertError, Result};
use crate::hasher;
use crate::ledger::{CertHash, Ledger};
use crate::pinning::Pinner;
use chrono::{NaiveDate, NaiveTime, Utc};
use std::fmt;

/// Progress stages reported while an issuance run is in flight. The
/// terminal states (success, failure) are carried by the run's `Result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Hashing,
    Pinning,
    AwaitingSignature,
    Submitting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Hashing => "Hashing file...",
            Self::Pinning => "Uploading to IPFS...",
            Self::AwaitingSignature => "Obtaining signer...",
            Self::Submitting => "Sending transaction...",
        };
        f.write_str(label)
    }
}

/// User-supplied inputs for one issuance attempt.
#[derive(Debug, Clone)]
pub struct IssuanceRequest {
    pub student_name: String,
    pub file_bytes: Vec<u8>,
    pub filename: String,
    pub expiry_date: NaiveDate,
}

/// Everything the caller needs after a successful issuance.
#[derive(Debug, Clone)]
pub struct IssuanceReceipt {
    /// SHA-256 content hash (certificate identity on the ledger)
    pub hash: String,
    /// Shareable link of the form `<origin>/verify?hash=<hash>`
    pub verification_link: String,
    pub student_name: String,
    pub expiry_date: NaiveDate,
    /// CID of the pinned file
    pub cid: String,
    pub tx_hash: String,
}

/// Validate an issuance request before any hashing or network traffic.
///
/// Each failure carries a field-specific message. `today` is injected so
/// the expiry check is deterministic under test.
pub fn validate(req: &IssuanceRequest, max_upload_bytes: u64, today: NaiveDate) -> Result<()> {
    if req.student_name.trim().is_empty() {
        return Err(CertError::Validation("Student name is required".to_owned()));
    }
    if req.file_bytes.is_empty() {
        return Err(CertError::Validation(
            "Certificate file is required".to_owned(),
        ));
    }
    if req.file_bytes.len() as u64 > max_upload_bytes {
        return Err(CertError::Validation(format!(
            "File too large: certificates must be {} MB or smaller",
            max_upload_bytes / (1024 * 1024)
        )));
    }
    if req.expiry_date < today {
        return Err(CertError::Validation(
            "Expiry date must be today or later".to_owned(),
        ));
    }
    Ok(())
}

/// Orchestrates one issuance attempt against injected collaborators.
pub struct IssuanceWorkflow<'a> {
    ledger: &'a dyn Ledger,
    pinner: &'a dyn Pinner,
    site_origin: &'a str,
    max_upload_bytes: u64,
}

impl<'a> IssuanceWorkflow<'a> {
    pub fn new(
        ledger: &'a dyn Ledger,
        pinner: &'a dyn Pinner,
        site_origin: &'a str,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            ledger,
            pinner,
            site_origin,
            max_upload_bytes,
        }
    }

    /// Run the full issuance pipeline. `on_stage` is invoked as each
    /// middle state is entered, for progress display.
    ///
    /// # Errors
    ///
    /// Validation failures surface before any network call. After that,
    /// the first failing step halts the run; prior side effects (a pinned
    /// file) are left in place.
    pub async fn run(
        &self,
        req: IssuanceRequest,
        mut on_stage: impl FnMut(Stage) + Send,
    ) -> Result<IssuanceReceipt> {
        validate(&req, self.max_upload_bytes, Utc::now().date_naive())?;

        on_stage(Stage::Hashing);
        let hash_hex = hasher::hash_bytes(&req.file_bytes);
        let hash = CertHash::parse(&hash_hex)?;

        on_stage(Stage::Pinning);
        let cid = self.pinner.pin(req.file_bytes, &req.filename).await?;

        on_stage(Stage::AwaitingSignature);
        self.ledger.signer_available().await?;
        let expiry_secs = expiry_unix_seconds(req.expiry_date)?;

        on_stage(Stage::Submitting);
        let receipt = self
            .ledger
            .store_certificate(req.student_name.trim(), hash, &cid, expiry_secs)
            .await?;

        let verification_link = format!("{}/verify?hash={hash_hex}", self.site_origin);
        tracing::info!(
            hash = %hash_hex,
            algorithm = hasher::HASH_ALGORITHM,
            cid = %cid,
            tx_hash = %receipt.transaction_hash,
            "Certificate issued"
        );

        Ok(IssuanceReceipt {
            hash: hash_hex,
            verification_link,
            student_name: req.student_name.trim().to_owned(),
            expiry_date: req.expiry_date,
            cid,
            tx_hash: receipt.transaction_hash,
        })
    }
}

/// Midnight UTC of the expiry date as unix seconds, matching what the
/// contract stores.
fn expiry_unix_seconds(date: NaiveDate) -> Result<u64> {
    let timestamp = date.and_time(NaiveTime::MIN).and_utc().timestamp();
    u64::try_from(timestamp)
        .map_err(|_| CertError::Validation("Expiry date is out of range".to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> IssuanceRequest {
        IssuanceRequest {
            student_name: "Alice".to_owned(),
            file_bytes: b"abc".to_vec(),
            filename: "diploma.pdf".to_owned(),
            expiry_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 30).unwrap()
    }

    const MAX: u64 = 10 * 1024 * 1024;

    #[test]
    fn test_validate_accepts_complete_request() {
        assert!(validate(&request(), MAX, today()).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let mut req = request();
        req.student_name = "   ".to_owned();
        let err = validate(&req, MAX, today()).unwrap_err();
        assert_eq!(err.to_string(), "Student name is required");
    }

    #[test]
    fn test_validate_rejects_missing_file() {
        let mut req = request();
        req.file_bytes.clear();
        let err = validate(&req, MAX, today()).unwrap_err();
        assert_eq!(err.to_string(), "Certificate file is required");
    }

    #[test]
    fn test_validate_rejects_oversize_file() {
        let mut req = request();
        req.file_bytes = vec![0u8; (MAX + 1) as usize];
        let err = validate(&req, MAX, today()).unwrap_err();
        assert!(err.to_string().contains("10 MB"));
    }

    #[test]
    fn test_validate_rejects_past_expiry() {
        let mut req = request();
        req.expiry_date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let err = validate(&req, MAX, today()).unwrap_err();
        assert_eq!(err.to_string(), "Expiry date must be today or later");
    }

    #[test]
    fn test_validate_accepts_today_as_expiry() {
        let mut req = request();
        req.expiry_date = today();
        assert!(validate(&req, MAX, today()).is_ok());
    }

    #[test]
    fn test_expiry_unix_seconds_is_midnight_utc() {
        let date = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        assert_eq!(expiry_unix_seconds(date).unwrap(), 1_893_456_000);
    }
}
