//! Messages pushed to peers over their live connections.
//!
//! Every message is one JSON document per WebSocket text frame with a `type`
//! tag and a `data` payload:
//!
//! | `type` | `data` | extra |
//! |--------|--------|-------|
//! | `userId` | the assigned session id | |
//! | `userList` | array of `{id, name}` roster entries | |
//! | `newFile` | a file descriptor | `from`: uploader id, omitted if anonymous |
//!
//! The variants are a closed set on purpose: adding a notification kind is an
//! exhaustiveness-checked change here, not a string match scattered across
//! handlers. There is no framing beyond one document per frame, no
//! versioning, and no acknowledgment. Peers only receive; anything they send
//! is logged and ignored.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::store::FileDescriptor;

/// One entry in the broadcast roster.
///
/// A read-only view of a connected peer; `name` is derived from the id and
/// carries no state of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// The peer's session id
    pub id: String,
    /// Display name derived from the id
    pub name: String,
}

impl RosterEntry {
    /// Build the entry for a session id.
    #[must_use]
    pub fn for_id(id: impl Into<String>) -> Self {
        let id = id.into();
        let name = display_name(&id);
        Self { id, name }
    }
}

/// Derive a peer's display name from its session id.
///
/// Uses the random suffix after the `user_` prefix; ids without a prefix are
/// shown as-is.
#[must_use]
pub fn display_name(id: &str) -> String {
    let suffix = id.split_once('_').map_or(id, |(_, suffix)| suffix);
    format!("User {suffix}")
}

/// A message sent to a peer over its live connection.
///
/// No delivery guarantee beyond "the connection was open when we sent it".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerEvent {
    /// The peer's freshly assigned session id, sent once on connect
    UserIdAssigned {
        /// The assigned id
        id: String,
    },
    /// The full roster, broadcast on every membership change
    RosterUpdate {
        /// All currently connected peers
        peers: Vec<RosterEntry>,
    },
    /// A file was uploaded for this peer
    NewFile {
        /// Descriptor of the persisted upload
        file: FileDescriptor,
        /// Session id of the uploader, if it identified itself
        from: Option<String>,
    },
}

// The wire format tags with `type`/`data` but `newFile` carries `from` as a
// sibling of `data`, which serde's tag/content attributes cannot express.
impl Serialize for PeerEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::UserIdAssigned { id } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "userId")?;
                map.serialize_entry("data", id)?;
                map.end()
            }
            Self::RosterUpdate { peers } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "userList")?;
                map.serialize_entry("data", peers)?;
                map.end()
            }
            Self::NewFile { file, from } => {
                let len = if from.is_some() { 3 } else { 2 };
                let mut map = serializer.serialize_map(Some(len))?;
                map.serialize_entry("type", "newFile")?;
                map.serialize_entry("data", file)?;
                if let Some(from) = from {
                    map.serialize_entry("from", from)?;
                }
                map.end()
            }
        }
    }
}

impl PeerEvent {
    /// Serialize to the single-frame JSON wire form.
    pub fn to_frame(&self) -> crate::Result<String> {
        serde_json::to_string(self).map_err(|e| crate::Error::Serialization(e.to_string()))
    }
}
