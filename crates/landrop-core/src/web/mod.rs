//! The HTTP/WebSocket server surface.
//!
//! One axum server carries the whole protocol; browsers on the same network
//! need nothing but its address.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | /upload | Multipart upload, optionally targeting a peer |
//! | GET | /files | List all persisted uploads |
//! | GET | /uploads/{name} | Download a blob (forced attachment) |
//! | WS | /ws | Live connection: session id, roster, file notifications |

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;

use crate::config::Config;
use crate::error::Result;
use crate::MAX_UPLOAD_BYTES;

pub mod error;
pub mod handlers;
pub mod state;
pub mod ws;

pub use state::{AppState, SharedState};

/// Configuration for the web server.
#[derive(Debug, Clone)]
pub struct WebServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Bind to localhost only
    pub localhost_only: bool,
    /// Directory uploads are persisted under
    pub upload_dir: PathBuf,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self {
            port: crate::DEFAULT_PORT,
            localhost_only: false,
            upload_dir: PathBuf::from(crate::DEFAULT_UPLOAD_DIR),
        }
    }
}

impl WebServerConfig {
    /// Build the server configuration from loaded file configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            port: config.web.port,
            localhost_only: config.web.localhost_only,
            upload_dir: config.storage.upload_dir.clone(),
        }
    }

    /// Get the bind address for the server.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        if self.localhost_only {
            SocketAddr::from(([127, 0, 0, 1], self.port))
        } else {
            SocketAddr::from(([0, 0, 0, 0], self.port))
        }
    }
}

/// Build the application router over shared state.
#[must_use]
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route(
            "/upload",
            post(handlers::upload)
                // The axum default 2 MB cap is far too small for file drops;
                // tower-http enforces the real limit instead.
                .layer::<_, std::convert::Infallible>(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_BYTES)),
        )
        .route("/files", get(handlers::list_files))
        .route("/uploads/{name}", get(handlers::download))
        .route("/ws", get(ws::ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and run the server until the process is stopped.
pub async fn serve(state: SharedState) -> Result<()> {
    let addr = state.config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("listening on http://{addr}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
