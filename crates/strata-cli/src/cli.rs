//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// strata - Resolve layered configuration against an annotated schema
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Annotated default configuration file
    #[arg(short, long, global = true, env = "STRATA_DEFAULTS")]
    pub defaults: Option<PathBuf>,

    /// Optional overlay file; may be repeated, later files win
    #[arg(short, long = "file", global = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Read environment overrides carrying this prefix
    #[arg(short, long, global = true)]
    pub env_prefix: Option<String>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Option overrides given after `--`
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Overrides such as `--ui--port 8081`
    #[arg(last = true, value_name = "OVERRIDES")]
    pub args: Vec<String>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Validate the resolved configuration
    Validate {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Export the resolved configuration in the shape of the defaults file
    ///
    /// Examples:
    ///   strata -d defaults.yaml export
    ///   strata -d defaults.yaml -f site.yaml export -o resolved.yaml -- --ui--port 8081
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Print the defaults without annotations
    Example {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print one resolved value as JSON
    Get {
        /// Option-style key, e.g. `ui--port`
        key: String,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// List every overridable key
    Keys {
        /// List environment variable names instead of option names
        #[arg(long)]
        env: bool,
    },
}
