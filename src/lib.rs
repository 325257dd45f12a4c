//! # Certledger - Certificate Anchoring and Verification
//!
//! Certledger lets an issuer upload a certificate file, compute its content
//! hash, pin the file to a content-addressed storage network, and record a
//! pointer to it on a pre-deployed smart contract. A verifier looks that
//! record up by hash and gets validity, issuer, and an issuer reputation
//! score.
//!
//! The hard parts of a system of this shape - the chain's consensus, the
//! contract's storage and access control, the pinning network's
//! replication - are owned by external systems. This crate is the
//! sequencing layer in front of them: two workflows, two thin clients, and
//! one HTTP endpoint.
//!
//! ## Quick Start
//!
//! ```no_run
//! use certledger::issuance::{IssuanceRequest, IssuanceWorkflow};
//! use certledger::ledger::RpcLedgerClient;
//! use certledger::pinning::PinningClient;
//! use secrecy::SecretString;
//!
//! # async fn example() -> certledger::error::Result<()> {
//! let ledger = RpcLedgerClient::new(
//!     "http://127.0.0.1:7545",
//!     "0x91aa8EB4D4C3ff7646692dd92A232F997df66595",
//! )?;
//! let pinner = PinningClient::new(
//!     "https://api.pinata.cloud",
//!     SecretString::new("jwt-from-env".to_owned().into()),
//! );
//!
//! let workflow =
//!     IssuanceWorkflow::new(&ledger, &pinner, "http://localhost:3000", 10 * 1024 * 1024);
//! let receipt = workflow
//!     .run(
//!         IssuanceRequest {
//!             student_name: "Alice".to_owned(),
//!             file_bytes: std::fs::read("diploma.pdf")?,
//!             filename: "diploma.pdf".to_owned(),
//!             expiry_date: chrono::NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
//!         },
//!         |stage| println!("{stage}"),
//!     )
//!     .await?;
//!
//! println!("Share this link: {}", receipt.verification_link);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`hasher`]: SHA-256 content hashing (the certificate's identity)
//! - [`pinning`]: upload to a hosted pinning provider, resolve gateway URLs
//! - [`ledger`]: read/write binding to the certificate contract over JSON-RPC
//! - [`issuance`]: hash -> pin -> sign -> submit workflow
//! - [`verification`]: hash lookup -> structured validity result
//! - [`server`]: the `/api/verify` HTTP endpoint
//! - [`config`]: persisted settings with environment overrides
//! - [`error`]: error types and handling utilities
//!
//! ## Error Handling
//!
//! All fallible operations return [`error::Result`]. A certificate lookup
//! that matches nothing is not an error: it is the
//! [`verification::VerificationOutcome::NotFound`] variant, so callers
//! exhaustively handle every case.

#![warn(clippy::all, rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod hasher;
pub mod issuance;
pub mod ledger;
pub mod logging;
pub mod pinning;
pub mod server;
pub mod verification;
