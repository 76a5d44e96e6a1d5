//! Binary crate for the `apicast` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive city prompt
//! - Printing reports to stdout, logs to stderr

use clap::Parser;

mod cli;
mod logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; keys may already be exported.
    dotenvy::dotenv().ok();

    let cmd = cli::Cli::parse();
    logging::init(cmd.verbose);
    cmd.run().await
}
