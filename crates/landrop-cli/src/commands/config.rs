//! Config command implementation.

use anyhow::{Context, Result};

use landrop_core::config::Config;

use super::ConfigArgs;

/// Run the config command.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let path = Config::config_path();

    if args.path {
        println!("{}", path.display());
        return Ok(());
    }

    let config = super::load_config();
    let rendered = toml::to_string_pretty(&config).context("failed to render configuration")?;

    println!("# {}", path.display());
    if !path.exists() {
        println!("# (file not present, showing defaults)");
    }
    println!();
    print!("{rendered}");

    Ok(())
}
