//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::PortalConfig;
use crate::library::{LibraryClient, LibraryError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the backend client and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PortalConfig,
    library: LibraryClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client cannot be built.
    pub fn new(config: PortalConfig) -> Result<Self, LibraryError> {
        let library = LibraryClient::new(&config.library)?;

        Ok(Self {
            inner: Arc::new(AppStateInner { config, library }),
        })
    }

    /// Get a reference to the portal configuration.
    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.inner.config
    }

    /// Get a reference to the library backend client.
    #[must_use]
    pub fn library(&self) -> &LibraryClient {
        &self.inner.library
    }
}
