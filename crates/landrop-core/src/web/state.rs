//! Application state shared across all HTTP handlers.
//!
//! The registry behind the dispatcher is the only mutable piece; it is owned
//! here and injected into the dispatcher at construction, so tests can spin
//! up independent states with their own registries.

use std::sync::Arc;

use crate::dispatch::Dispatcher;
use crate::presence::PresenceRegistry;
use crate::store::UploadStore;

use super::WebServerConfig;

/// Shared application state for all HTTP handlers.
#[derive(Debug)]
pub struct AppState {
    /// Server configuration
    pub config: WebServerConfig,
    /// Event fan-out to connected peers
    pub dispatcher: Dispatcher,
    /// Upload persistence
    pub store: UploadStore,
}

impl AppState {
    /// Create application state with the given configuration.
    #[must_use]
    pub fn new(config: WebServerConfig) -> Self {
        let store = UploadStore::new(config.upload_dir.clone());
        let dispatcher = Dispatcher::new(Arc::new(PresenceRegistry::new()));
        Self {
            config,
            dispatcher,
            store,
        }
    }

    /// Create state already wrapped for handler sharing.
    #[must_use]
    pub fn shared(config: WebServerConfig) -> SharedState {
        Arc::new(Self::new(config))
    }
}

/// Type alias for shared state across handlers.
pub type SharedState = Arc<AppState>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_state_owns_an_empty_registry() {
        let state = AppState::shared(WebServerConfig::default());
        assert!(state.dispatcher.registry().is_empty().await);
    }

    #[test]
    fn test_store_rooted_at_configured_dir() {
        let config = WebServerConfig {
            upload_dir: std::path::PathBuf::from("/tmp/landrop-test"),
            ..Default::default()
        };
        let state = AppState::new(config);
        assert_eq!(
            state.store.root(),
            std::path::Path::new("/tmp/landrop-test")
        );
    }
}
