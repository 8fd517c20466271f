//! Error types for LANdrop.
//!
//! This module provides a unified error type for all LANdrop operations,
//! with specific error variants for different failure modes.
//!
//! Notification delivery failures ([`Error::ChannelClosed`],
//! [`Error::PeerNotFound`]) are always absorbed at the dispatch layer; they
//! exist so callers inside the crate can tell "peer gone" apart from real
//! faults, not so they can bubble up to an HTTP response.

use std::io;

use thiserror::Error;

/// A specialized `Result` type for LANdrop operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for LANdrop.
#[derive(Error, Debug)]
pub enum Error {
    /// Send attempted on a connection that is no longer open
    #[error("notification channel closed")]
    ChannelClosed,

    /// Target peer id not present in the registry
    #[error("peer '{0}' is not connected")]
    PeerNotFound(String),

    /// Upload carried no usable filename
    #[error("invalid upload filename: {0}")]
    InvalidFilename(String),

    /// Upload request carried no file payload
    #[error("no file uploaded")]
    MissingFile,

    /// Stored blob name points outside the upload directory
    #[error("invalid blob name: {0}")]
    InvalidBlobName(String),

    /// Requested blob does not exist in storage
    #[error("blob not found: {0}")]
    BlobNotFound(String),

    /// Configuration file error
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Returns whether this error only concerns notification delivery.
    ///
    /// Delivery errors never fail the operation that triggered them; the
    /// affected peer simply misses one message.
    #[must_use]
    pub const fn is_delivery_error(&self) -> bool {
        matches!(self, Self::ChannelClosed | Self::PeerNotFound(_))
    }
}
