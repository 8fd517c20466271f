//! Live registry of connected peers.
//!
//! Presence is process-scoped and entirely in memory: an entry exists exactly
//! as long as its connection is open, and a restart invalidates every id.
//! The registry is the single source of truth for routing notifications, so
//! it never silently overwrites a live entry and tolerates duplicate close
//! events.
//!
//! Registry instances are owned and passed in explicitly (the dispatcher
//! takes an `Arc`), never a module-level singleton, so tests can run
//! independent registries side by side.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::protocol::{PeerEvent, RosterEntry};

/// Prefix for generated session ids.
pub const ID_PREFIX: &str = "user_";

/// Length of the random id suffix.
pub const ID_SUFFIX_LEN: usize = 9;

/// Alphabet for the random id suffix (base36, matching the wire format peers
/// already display).
const ID_CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a candidate session id.
///
/// Uniqueness is enforced by the registry at insertion time, not here.
fn generate_id() -> String {
    use rand::Rng;

    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..ID_CHARSET.len());
            ID_CHARSET[idx] as char
        })
        .collect();
    format!("{ID_PREFIX}{suffix}")
}

/// Sending half of one peer's live connection.
///
/// A thin clonable handle over an unbounded channel into the peer's writer
/// task. Sends never block, so one slow or dead peer cannot stall delivery
/// to the others; a dead peer just fails its own send.
#[derive(Debug, Clone)]
pub struct PeerChannel {
    tx: mpsc::UnboundedSender<PeerEvent>,
}

impl PeerChannel {
    /// Wrap the sending half of a connection's event queue.
    #[must_use]
    pub fn new(tx: mpsc::UnboundedSender<PeerEvent>) -> Self {
        Self { tx }
    }

    /// Create a channel pair for a connection.
    ///
    /// The returned receiver belongs to the connection's writer task; when it
    /// is dropped the channel reads as closed.
    #[must_use]
    pub fn open() -> (Self, mpsc::UnboundedReceiver<PeerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Queue one event for delivery to this peer.
    ///
    /// Fails with [`Error::ChannelClosed`] if the connection is gone. Callers
    /// must treat that as "this peer misses this message", never as fatal.
    pub fn send(&self, event: PeerEvent) -> Result<()> {
        self.tx.send(event).map_err(|_| Error::ChannelClosed)
    }

    /// Whether the underlying connection is still open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// Registry state guarded by one lock: the routing map plus insertion order.
#[derive(Debug, Default)]
struct Inner {
    peers: HashMap<String, PeerChannel>,
    order: Vec<String>,
}

/// Live map of session id to notification channel.
///
/// `register`/`unregister`/`roster` serialize on a write lock so racing
/// connects and disconnects cannot lose updates; `lookup` and the snapshot
/// reads take the read lock and always observe a consistent map.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    inner: RwLock<Inner>,
}

impl PresenceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection and return its freshly generated session id.
    ///
    /// Collisions with a live id are resolved by regenerating under the
    /// write lock, so an existing entry is never overwritten.
    pub async fn register(&self, channel: PeerChannel) -> String {
        let mut inner = self.inner.write().await;

        let mut id = generate_id();
        while inner.peers.contains_key(&id) {
            id = generate_id();
        }

        inner.peers.insert(id.clone(), channel);
        inner.order.push(id.clone());
        id
    }

    /// Remove a session if present.
    ///
    /// Idempotent: a late or duplicate close event is a no-op.
    pub async fn unregister(&self, id: &str) {
        let mut inner = self.inner.write().await;
        if inner.peers.remove(id).is_some() {
            inner.order.retain(|existing| existing != id);
        }
    }

    /// Look up the channel for a session id.
    pub async fn lookup(&self, id: &str) -> Option<PeerChannel> {
        self.inner.read().await.peers.get(id).cloned()
    }

    /// Snapshot the current roster in insertion order.
    ///
    /// Order is registry-internal and not contractual; it is kept
    /// deterministic so clients can diff successive broadcasts cheaply.
    pub async fn roster(&self) -> Vec<RosterEntry> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .map(|id| RosterEntry::for_id(id.clone()))
            .collect()
    }

    /// Snapshot every registered channel for a broadcast pass.
    pub async fn channels(&self) -> Vec<PeerChannel> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .filter_map(|id| inner.peers.get(id).cloned())
            .collect()
    }

    /// Number of currently registered sessions.
    pub async fn len(&self) -> usize {
        self.inner.read().await.peers.len()
    }

    /// Whether no peers are connected.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.peers.is_empty()
    }
}
