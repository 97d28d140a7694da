//! The `validate` command

use colored::Colorize;
use strata_core::{ConfigManager, Error};

use crate::error::{CliError, Result};

/// Validate the resolved configuration, listing every failure on stderr
pub fn run_validate(manager: &ConfigManager) -> Result<()> {
    match manager.validate() {
        Ok(()) => {
            println!("{} Configuration is valid", "OK".green().bold());
            Ok(())
        }
        Err(Error::Validation { report }) => {
            for (path, messages) in report.errors() {
                let path = if path.is_empty() { "<root>" } else { path.as_str() };
                for message in messages {
                    eprintln!("  {} {}: {}", "x".red(), path.yellow(), message);
                }
            }
            Err(CliError::user(format!(
                "configuration is invalid ({} error(s))",
                report.len()
            )))
        }
        Err(e) => Err(e.into()),
    }
}
