//! Command implementations for strata-cli

pub mod export;
pub mod inspect;
pub mod validate;

use strata_core::{ConfigManager, ManagerOptions};
use tracing::debug;

use crate::cli::{Cli, Commands, Overrides};
use crate::error::Result;

pub use export::{run_example, run_export};
pub use inspect::{run_get, run_keys};
pub use validate::run_validate;

/// Build the manager described by the global options and run one command
pub fn execute(cli: Cli) -> Result<()> {
    let mut manager = load_manager(&cli)?;

    match cli.command {
        Commands::Validate { overrides } => {
            apply_overrides(&mut manager, &overrides)?;
            run_validate(&manager)
        }
        Commands::Export { output, overrides } => {
            apply_overrides(&mut manager, &overrides)?;
            run_export(&manager, output.as_deref())
        }
        Commands::Example { output } => run_example(&manager, output.as_deref()),
        Commands::Get { key, overrides } => {
            apply_overrides(&mut manager, &overrides)?;
            run_get(&manager, &key)
        }
        Commands::Keys { env } => run_keys(&manager, env),
    }
}

fn load_manager(cli: &Cli) -> Result<ConfigManager> {
    let mut options = ManagerOptions::new().with_optional_files(cli.files.iter().cloned());
    if let Some(path) = &cli.defaults {
        options = options.with_default_file(path.clone());
    }
    if let Some(prefix) = &cli.env_prefix {
        options = options.with_env_prefix(prefix.clone());
    }

    let mut manager = ConfigManager::new(options)?;

    if cli.env_prefix.is_some() {
        debug!(prefix = manager.keys().prefix(), "reading environment overrides");
        manager.config_from_env_vars()?;
    }

    Ok(manager)
}

fn apply_overrides(manager: &mut ConfigManager, overrides: &Overrides) -> Result<()> {
    if overrides.args.is_empty() {
        return Ok(());
    }
    debug!(count = overrides.args.len(), "applying option overrides");
    manager.config_from_cli_args(&overrides.args)?;
    Ok(())
}
