//! LANdrop CLI - Local network file drop
//!
//! LANdrop runs a single-process server that lets devices on the same
//! network exchange files with real-time notifications to connected peers.
//!
//! ## Quick Start
//!
//! ```bash
//! # Start the server on the default port
//! landrop serve
//!
//! # Custom port, uploads kept somewhere specific
//! landrop serve --port 9000 --dir /srv/drop
//! ```

#![allow(clippy::doc_markdown)]

use anyhow::Result;
use clap::Parser;

mod commands;

use commands::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => commands::serve::run(args).await,
        Command::Config(args) => commands::config::run(&args),
    }
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,landrop=info,landrop_core=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
