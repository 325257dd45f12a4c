//! # Certledger Entry Point
//!
//! Parses command-line arguments and dispatches to the CLI handlers:
//! `serve` runs the HTTP verification API, `issue` and `verify` run the
//! two workflows directly from the terminal.

#![warn(clippy::all, rust_2018_idioms)]

// Private module - only accessible within this binary
mod cli;

use clap::Parser as _;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    certledger::logging::init()?;

    let cli = cli::Cli::parse();

    // All commands touch the network at some point, so run the whole
    // dispatch on a Tokio runtime.
    tokio::runtime::Runtime::new()?.block_on(cli::run_command(cli.command))?;

    Ok(())
}
