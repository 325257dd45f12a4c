use anyhow::{Context as _, Result};
use certledger::config::{self, AppConfig};
use certledger::hasher;
use certledger::issuance::{IssuanceRequest, IssuanceWorkflow};
use certledger::ledger::RpcLedgerClient;
use certledger::pinning::{self, PinningClient};
use certledger::server::{self, AppState};
use certledger::verification::{self, VerificationOutcome, VerificationWorkflow};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use qrcode::QrCode;
use qrcode::render::unicode;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "certledger",
    about = "Certificate anchoring and verification tool"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP verification API server
    Serve {
        /// Bind address, e.g. 0.0.0.0:3000
        #[arg(long)]
        bind: Option<String>,
    },
    /// Issue a certificate: hash the file, pin it, and record it on the ledger
    Issue {
        /// Path to the certificate file (PDF, PNG, JPG)
        #[arg(short, long)]
        file: PathBuf,

        /// Student's full name
        #[arg(short, long)]
        student: String,

        /// Expiry date (YYYY-MM-DD)
        #[arg(short, long)]
        expiry: String,
    },
    /// Verify a certificate against the ledger, by hash or by file
    Verify {
        /// 64-character SHA-256 hash, with or without a 0x prefix
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        hash: Option<String>,

        /// Recompute the hash from a certificate file instead
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Report a certificate as forged (acknowledged for external review)
    Report {
        /// Hash of the certificate being reported
        hash: String,
    },
    /// Write a default config file to the platform config directory
    Init,
}

pub async fn run_command(command: Commands) -> Result<()> {
    let config = config::load_app_config();

    match command {
        Commands::Serve { bind } => handle_serve(config, bind).await,
        Commands::Issue {
            file,
            student,
            expiry,
        } => handle_issue(config, file, student, expiry).await,
        Commands::Verify { hash, file } => handle_verify(config, hash, file).await,
        Commands::Report { hash } => {
            verification::report_forged(&hash);
            println!("Report submitted. Thank you for reporting; this will be reviewed.");
            Ok(())
        }
        Commands::Init => {
            config::save_app_config(&config).context("Failed to write config file")?;
            println!("Config written to {}", config::get_config_path().display());
            println!("Secrets (the pinning JWT) are read from CERTLEDGER_PINATA_JWT, never the file.");
            Ok(())
        }
    }
}

fn build_ledger(config: &AppConfig) -> Result<RpcLedgerClient> {
    if config.contract_address.is_empty() {
        anyhow::bail!(
            "No contract address configured. Set CERTLEDGER_CONTRACT_ADDRESS or edit {}.",
            config::get_config_path().display()
        );
    }
    RpcLedgerClient::new(config.rpc_url.clone(), &config.contract_address)
        .context("Failed to construct ledger client")
}

async fn handle_serve(config: AppConfig, bind: Option<String>) -> Result<()> {
    let ledger = build_ledger(&config)?;
    let bind_addr = bind.unwrap_or_else(|| config.bind_addr.clone());

    let state = Arc::new(AppState {
        ledger: Arc::new(ledger),
        gateway_base: config.gateway_base,
    });

    server::serve(state, &bind_addr)
        .await
        .context("API server failed")
}

async fn handle_issue(
    config: AppConfig,
    file: PathBuf,
    student: String,
    expiry: String,
) -> Result<()> {
    let expiry_date = NaiveDate::parse_from_str(&expiry, "%Y-%m-%d")
        .context("Invalid expiry date, expected YYYY-MM-DD")?;

    let file_bytes = std::fs::read(&file)
        .with_context(|| format!("Failed to read certificate file: {}", file.display()))?;

    let filename = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "certificate".to_owned());

    let ledger = build_ledger(&config)?;
    let pinner = PinningClient::new(config.pinning_api_base.clone(), config.pinning_jwt.clone());
    let workflow = IssuanceWorkflow::new(
        &ledger,
        &pinner,
        &config.site_origin,
        config.max_upload_bytes,
    );

    let request = IssuanceRequest {
        student_name: student,
        file_bytes,
        filename,
        expiry_date,
    };

    let receipt = workflow
        .run(request, |stage| println!("{stage}"))
        .await
        .context("Issuance failed")?;

    println!("Certificate stored successfully!");
    println!("  Student:           {}", receipt.student_name);
    println!(
        "  Hash ({}):    {}",
        hasher::HASH_ALGORITHM,
        receipt.hash
    );
    println!("  IPFS CID:          {}", receipt.cid);
    println!(
        "  IPFS link:         {}",
        pinning::gateway_url(&config.gateway_base, &receipt.cid)
    );
    println!("  Expiry date:       {}", receipt.expiry_date);
    println!("  Transaction:       {}", receipt.tx_hash);
    println!("  Verification link: {}", receipt.verification_link);

    let code =
        QrCode::new(receipt.verification_link.as_bytes()).context("Failed to build QR code")?;
    let qr = code.render::<unicode::Dense1x2>().quiet_zone(true).build();
    println!("\n{qr}");

    Ok(())
}

/// A hash given on the command line wins; otherwise it is recomputed
/// from the certificate file on disk.
fn resolve_hash(hash: Option<String>, file: Option<PathBuf>) -> Result<String> {
    match (hash, file) {
        (Some(hash), None) => Ok(hash),
        (None, Some(path)) => hasher::hash_file(&path)
            .with_context(|| format!("Failed to hash certificate file: {}", path.display())),
        (Some(_), Some(_)) => anyhow::bail!("Provide a hash or --file, not both"),
        (None, None) => anyhow::bail!("Provide a certificate hash or --file"),
    }
}

async fn handle_verify(config: AppConfig, hash: Option<String>, file: Option<PathBuf>) -> Result<()> {
    let hash = resolve_hash(hash, file)?;
    let ledger = build_ledger(&config)?;
    let workflow = VerificationWorkflow::new(&ledger, &config.gateway_base);

    match workflow.verify(&hash).await? {
        VerificationOutcome::Valid(cert) => {
            println!("Certificate Valid");
            println!("  Student:     {}", cert.student_name);
            println!("  Issued:      {}", cert.upload_date);
            println!("  Expires:     {}", cert.expiry_date);
            println!("  IPFS link:   {}", cert.ipfs_link);
            println!("  Issuer:      {}", cert.issuer_address);
            println!("  Reputation:  {}/100", cert.issuer_reputation);
            println!(
                "  Status:      {}",
                if cert.is_forged {
                    "Flagged as Forged"
                } else {
                    "Authentic"
                }
            );
        }
        VerificationOutcome::NotFound { reason } => {
            println!("Certificate Invalid: {reason}");
        }
    }

    Ok(())
}
