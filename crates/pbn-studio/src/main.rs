mod cli;
mod commands;
mod export;
mod processor;
mod script;
mod store;

use std::process::ExitCode;

use clap::Parser;
use pbn_engine::logging::{init_logging, LoggingConfig};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(LoggingConfig::default().verbosity(cli.verbose));

    println!();
    println!("  PBN STUDIO v{}", env!("CARGO_PKG_VERSION"));
    println!();

    match commands::run(cli.command).await {
        Ok(()) => {
            println!();
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("  error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
