//! Event fan-out between uploads and connected peers.
//!
//! The dispatcher is the only component that speaks [`PeerEvent`]; the web
//! layer hands it raw lifecycle events (connect, disconnect, upload done) and
//! it mediates between the presence registry and peer channels. It holds no
//! state of its own beyond the injected registry.
//!
//! Delivery here is fire-and-forget. Every send failure is absorbed: the
//! operation that triggered a notification (an upload, a connect) must never
//! fail because some peer could not be reached. A peer that is offline at
//! broadcast time permanently misses that broadcast.

use std::sync::Arc;

use crate::presence::{PeerChannel, PresenceRegistry};
use crate::protocol::PeerEvent;
use crate::store::FileDescriptor;

/// Mediator between the presence registry and peer channels.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<PresenceRegistry>,
}

impl Dispatcher {
    /// Create a dispatcher over an injected registry.
    #[must_use]
    pub fn new(registry: Arc<PresenceRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this dispatcher routes through.
    #[must_use]
    pub fn registry(&self) -> &Arc<PresenceRegistry> {
        &self.registry
    }

    /// Handle a new connection: register it, tell the peer its id, then
    /// broadcast the updated roster.
    ///
    /// The id goes to the new channel before the roster broadcast so the peer
    /// can recognize itself in the very first roster it sees.
    pub async fn on_connect(&self, channel: PeerChannel) -> String {
        let id = self.registry.register(channel.clone()).await;

        if channel
            .send(PeerEvent::UserIdAssigned { id: id.clone() })
            .is_err()
        {
            // Connection died between accept and register; the close event
            // will clean the entry up.
            tracing::debug!("peer {id} closed before receiving its id");
        }

        self.broadcast_roster().await;
        id
    }

    /// Handle a closed connection: drop the entry and broadcast the roster.
    pub async fn on_disconnect(&self, id: &str) {
        self.registry.unregister(id).await;
        self.broadcast_roster().await;
    }

    /// Send the current roster to every open channel.
    ///
    /// Channels that are not open are skipped, not removed; removal is the
    /// registry's job and happens only on an explicit disconnect event. That
    /// keeps a broadcast pass from racing a slow close handshake.
    pub async fn broadcast_roster(&self) {
        let peers = self.registry.roster().await;
        let channels = self.registry.channels().await;

        for channel in channels {
            if !channel.is_open() {
                continue;
            }
            if let Err(e) = channel.send(PeerEvent::RosterUpdate {
                peers: peers.clone(),
            }) {
                tracing::debug!("roster broadcast skipped a peer: {e}");
            }
        }
    }

    /// Notify a target peer that a file was uploaded for it.
    ///
    /// A missing target, an unknown id, or a dead channel all drop the
    /// notification silently; the upload itself already succeeded.
    pub async fn notify_file_ready(
        &self,
        descriptor: FileDescriptor,
        target: Option<&str>,
        from: Option<&str>,
    ) {
        let Some(target) = target else {
            return;
        };

        let Some(channel) = self.registry.lookup(target).await else {
            tracing::debug!("dropping file notification: peer {target} is not connected");
            return;
        };

        let event = PeerEvent::NewFile {
            file: descriptor,
            from: from.map(ToString::to_string),
        };
        if let Err(e) = channel.send(event) {
            tracing::debug!("dropping file notification for {target}: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc::error::TryRecvError;

    use super::*;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Arc::new(PresenceRegistry::new()))
    }

    fn descriptor() -> FileDescriptor {
        FileDescriptor {
            original_name: "doc.pdf".into(),
            filename: "1700000000000-doc.pdf".into(),
            size: 10,
            path: "/uploads/1700000000000-doc.pdf".into(),
        }
    }

    #[tokio::test]
    async fn test_connect_sends_id_then_roster() {
        let dispatcher = dispatcher();
        let (channel, mut rx) = PeerChannel::open();

        let id = dispatcher.on_connect(channel).await;

        match rx.recv().await.unwrap() {
            PeerEvent::UserIdAssigned { id: sent } => assert_eq!(sent, id),
            other => panic!("expected id assignment first, got {other:?}"),
        }
        match rx.recv().await.unwrap() {
            PeerEvent::RosterUpdate { peers } => {
                assert_eq!(peers.len(), 1);
                assert_eq!(peers[0].id, id);
            }
            other => panic!("expected roster update, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_disconnect_broadcasts_shrunk_roster() {
        let dispatcher = dispatcher();
        let (channel_a, mut rx_a) = PeerChannel::open();
        let (channel_b, mut rx_b) = PeerChannel::open();

        let id_a = dispatcher.on_connect(channel_a).await;
        let id_b = dispatcher.on_connect(channel_b).await;

        // Drain connection-time traffic.
        while rx_a.try_recv().is_ok() {}
        while rx_b.try_recv().is_ok() {}

        dispatcher.on_disconnect(&id_b).await;

        match rx_a.try_recv().unwrap() {
            PeerEvent::RosterUpdate { peers } => {
                assert_eq!(peers.len(), 1);
                assert_eq!(peers[0].id, id_a);
            }
            other => panic!("expected roster update, got {other:?}"),
        }
        // The departed peer's channel got nothing further.
        drop(rx_b);
    }

    #[tokio::test]
    async fn test_notify_targets_exactly_one_peer() {
        let dispatcher = dispatcher();
        let (channel_a, mut rx_a) = PeerChannel::open();
        let (channel_b, mut rx_b) = PeerChannel::open();

        let _id_a = dispatcher.on_connect(channel_a).await;
        let id_b = dispatcher.on_connect(channel_b).await;

        while rx_a.try_recv().is_ok() {}
        while rx_b.try_recv().is_ok() {}

        dispatcher
            .notify_file_ready(descriptor(), Some(&id_b), Some("user_sender123"))
            .await;

        match rx_b.try_recv().unwrap() {
            PeerEvent::NewFile { file, from } => {
                assert_eq!(file, descriptor());
                assert_eq!(from.as_deref(), Some("user_sender123"));
            }
            other => panic!("expected file notification, got {other:?}"),
        }
        assert!(matches!(rx_a.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_notify_unknown_target_is_silent() {
        let dispatcher = dispatcher();
        let (channel, mut rx) = PeerChannel::open();
        let _id = dispatcher.on_connect(channel).await;
        while rx.try_recv().is_ok() {}

        dispatcher
            .notify_file_ready(descriptor(), Some("user_longgone1"), None)
            .await;
        dispatcher.notify_file_ready(descriptor(), None, None).await;

        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_broadcast_skips_closed_channels() {
        let dispatcher = dispatcher();
        let (channel_a, rx_a) = PeerChannel::open();
        let (channel_b, mut rx_b) = PeerChannel::open();

        let _id_a = dispatcher.on_connect(channel_a).await;
        let id_b = dispatcher.on_connect(channel_b).await;
        while rx_b.try_recv().is_ok() {}

        // Peer A's writer task dies without a disconnect event yet.
        drop(rx_a);

        dispatcher.broadcast_roster().await;

        // B still gets the roster, and A is still listed: only an explicit
        // disconnect removes registry entries.
        match rx_b.try_recv().unwrap() {
            PeerEvent::RosterUpdate { peers } => {
                assert_eq!(peers.len(), 2);
                assert!(peers.iter().any(|p| p.id == id_b));
            }
            other => panic!("expected roster update, got {other:?}"),
        }
    }
}
