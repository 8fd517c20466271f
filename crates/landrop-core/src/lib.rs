//! # LANdrop Core Library
//!
//! `landrop-core` provides the core functionality for LANdrop, a
//! single-process file drop server for devices on the same local network.
//!
//! Peers connect over WebSocket and immediately receive an ephemeral session
//! identity plus a live roster of everyone else currently online. Files are
//! uploaded over plain HTTP multipart; when an upload names a target peer,
//! that peer is notified in real time over its open connection. Anyone can
//! list and download previously uploaded files.
//!
//! ## Modules
//!
//! - [`config`] - Configuration management
//! - [`dispatch`] - Event fan-out between uploads and connected peers
//! - [`presence`] - Live registry of connected peers
//! - [`protocol`] - Messages pushed to peers over their connections
//! - [`store`] - Upload persistence and listing
//! - [`web`] - The HTTP/WebSocket server surface
//!
//! ## Example
//!
//! ```rust,ignore
//! use landrop_core::web::{self, WebServerConfig};
//!
//! let config = WebServerConfig::default();
//! let state = web::AppState::shared(config);
//! web::serve(state).await?;
//! ```
//!
//! Peers are anonymous and trusted by virtue of being on the same network;
//! there is no authentication and no durable identity across connections.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::unused_async)]
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::must_use_candidate)]

pub mod config;
pub mod dispatch;
pub mod error;
pub mod presence;
pub mod protocol;
pub mod store;
pub mod web;

pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default HTTP/WebSocket port
pub const DEFAULT_PORT: u16 = 3000;

/// Default directory name for persisted uploads (relative to the working
/// directory unless overridden in configuration)
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Public path prefix under which uploaded blobs are served
pub const UPLOADS_PATH_PREFIX: &str = "/uploads";

/// Maximum accepted upload body size (1 GiB)
pub const MAX_UPLOAD_BYTES: usize = 1024 * 1024 * 1024;
