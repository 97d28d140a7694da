//! The `export` and `example` commands

use std::io::Write;
use std::path::Path;

use colored::Colorize;
use strata_core::ConfigManager;
use strata_doc::io::write_atomic;

use crate::error::Result;

/// Write the resolved configuration in the layout of the defaults file
pub fn run_export(manager: &ConfigManager, output: Option<&Path>) -> Result<()> {
    emit(output, |out| manager.export_current_config(out))
}

/// Write the defaults with every annotation removed
pub fn run_example(manager: &ConfigManager, output: Option<&Path>) -> Result<()> {
    emit(output, |out| manager.generate_config_example(out))
}

fn emit<F>(output: Option<&Path>, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> strata_core::Result<()>,
{
    match output {
        Some(path) => {
            let mut buffer = Vec::new();
            write(&mut buffer)?;
            write_atomic(path, &buffer)?;
            println!("{} {}", "Wrote".green().bold(), path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            write(&mut lock)?;
            lock.flush()?;
        }
    }
    Ok(())
}
