//! strata CLI
//!
//! Loads an annotated defaults file plus overlays, applies environment and
//! option overrides, and validates, exports or inspects the result.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::Cli;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose);
    tracing::debug!("Verbose mode enabled");

    commands::execute(cli)
}
