//! Centralized error handling for certledger.
//!
//! A hand-rolled error enum keeps the failure taxonomy explicit: validation
//! problems are caught before any network traffic, upstream failures carry
//! which collaborator misbehaved, and everything else collapses into a
//! generic message at the workflow boundary.
//!
//! Note that a certificate lookup that finds nothing is *not* an error; it
//! is a normal negative result modeled by
//! [`crate::verification::VerificationOutcome::NotFound`].

use std::fmt;

/// Main error type for certledger operations.
#[derive(Debug)]
pub enum CertError {
    /// I/O errors (reading certificate files, config files, etc.)
    Io(std::io::Error),

    /// User input rejected before any network call was made
    Validation(String),

    /// Pinning provider unreachable, unauthorized, or rejected the upload
    Pinning(String),

    /// Ledger RPC unreachable or the contract call failed
    Ledger(String),

    /// No signing account is available at the RPC endpoint
    SignerUnavailable,

    /// Configuration errors (malformed config file, bad address, etc.)
    Config(String),

    /// Generic error with context
    Other(String),
}

impl fmt::Display for CertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Validation(msg) => write!(f, "{msg}"),
            Self::Pinning(msg) => write!(f, "Pinning service error: {msg}"),
            Self::Ledger(msg) => write!(f, "Ledger error: {msg}"),
            Self::SignerUnavailable => {
                write!(f, "No signing account available at the RPC endpoint")
            }
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CertError {}

impl From<std::io::Error> for CertError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<anyhow::Error> for CertError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<serde_json::Error> for CertError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

/// Result type alias for certledger operations.
pub type Result<T> = std::result::Result<T, CertError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<CertError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: CertError = e.into();
            CertError::Other(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: CertError = e.into();
            CertError::Other(format!("{}: {}", f(), err))
        })
    }
}
