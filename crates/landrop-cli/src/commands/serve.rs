//! Serve command implementation.

use std::net::UdpSocket;

use anyhow::Result;

use landrop_core::web::{self, AppState, WebServerConfig};

use super::ServeArgs;

/// Run the serve command.
pub async fn run(args: ServeArgs) -> Result<()> {
    let file_config = super::load_config();
    let mut config = WebServerConfig::from_config(&file_config);

    if let Some(port) = args.port {
        config.port = port;
    }
    if args.localhost_only {
        config.localhost_only = true;
    }
    if let Some(dir) = args.dir {
        config.upload_dir = dir;
    }

    println!();
    println!("LANdrop");
    println!("{}", "─".repeat(40));
    println!();
    println!("  http://localhost:{}", config.port);
    if !config.localhost_only {
        for addr in lan_addresses() {
            println!("  http://{}:{} (for other devices)", addr, config.port);
        }
    }
    println!();
    println!("  Uploads: {}", config.upload_dir.display());
    println!();
    println!("Press Ctrl+C to stop the server.");
    println!();

    let state = AppState::shared(config);
    web::serve(state).await?;

    Ok(())
}

/// Best-effort detection of this machine's LAN address.
///
/// Connecting a UDP socket does not send anything; it just makes the OS pick
/// the outbound interface, whose address is what other devices should use.
fn lan_addresses() -> Vec<String> {
    let mut addrs = Vec::new();

    if let Ok(socket) = UdpSocket::bind("0.0.0.0:0") {
        if socket.connect("8.8.8.8:80").is_ok() {
            if let Ok(local_addr) = socket.local_addr() {
                addrs.push(local_addr.ip().to_string());
            }
        }
    }

    addrs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lan_addresses_are_well_formed() {
        for addr in lan_addresses() {
            assert!(addr.parse::<std::net::IpAddr>().is_ok());
        }
    }
}
