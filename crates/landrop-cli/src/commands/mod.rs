//! CLI command definitions and handlers.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod config;
pub mod serve;

/// Load configuration with graceful fallback to defaults.
///
/// A missing config file is normal; a malformed one is reported and
/// replaced with defaults so the server still comes up.
pub fn load_config() -> landrop_core::config::Config {
    landrop_core::config::Config::load().unwrap_or_else(|e| {
        tracing::warn!("ignoring config file: {e}");
        landrop_core::config::Config::default()
    })
}

/// LANdrop - Local network file drop
#[derive(Parser)]
#[command(name = "landrop")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand)]
pub enum Command {
    /// Run the file drop server
    Serve(ServeArgs),

    /// Show configuration
    Config(ConfigArgs),
}

/// Arguments for the serve command
#[derive(Debug, clap::Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Bind to localhost only instead of all interfaces
    #[arg(long)]
    pub localhost_only: bool,

    /// Directory to persist uploads under
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,
}

/// Arguments for the config command
#[derive(Debug, clap::Args)]
pub struct ConfigArgs {
    /// Print only the config file path
    #[arg(long)]
    pub path: bool,
}
