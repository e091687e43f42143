//! CLI interface for hype-ticker
//!
//! Provides subcommands for:
//! - `run`: Stream the mid price to the terminal
//! - `config`: Show the effective configuration

mod commands;
mod run;

pub use commands::{parse_command, spawn_command_source};
pub use run::RunArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "hype-ticker")]
#[command(about = "Live Hyperliquid mid-price ticker")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream the mid price until quit
    Run(RunArgs),
    /// Show configuration
    Config,
}
