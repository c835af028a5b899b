use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

// Export modules
pub mod api;
pub mod error;
pub mod events;
pub mod gateway;
pub mod http_client;
pub mod session;
pub mod store;

#[cfg(test)]
mod tests;

pub use api::{LoginResponse, Msg, PortalApi};
pub use error::{ClientError, ClientResult, ErrorCategory};
pub use events::{EventStream, EventStreamStats, Subscriber};
pub use gateway::{RequestGateway, TOKEN_HEADER};
pub use http_client::{HttpClient, ReqwestHttpClient};
pub use session::{SessionManager, DEFAULT_STATUS_CAPACITY};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore, StoreError};

/// Default API origin
pub const DEFAULT_API_ORIGIN: &str = "http://localhost:7000";

/// Configuration for the portal client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Origin all API requests are issued against
    pub api_origin: String,
    /// Path of the session file; `None` selects the per-user default
    pub session_file: Option<PathBuf>,
    /// Capacity of the login-status broadcast channel
    pub status_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_origin: DEFAULT_API_ORIGIN.to_string(),
            session_file: None,
            status_capacity: session::DEFAULT_STATUS_CAPACITY,
        }
    }
}

impl ClientConfig {
    /// Build a configuration from the environment.
    ///
    /// Recognized variables: `PORTAL_API_ORIGIN`, `PORTAL_SESSION_FILE`,
    /// `PORTAL_STATUS_CAPACITY`. Unset variables keep their defaults.
    pub fn from_env() -> ClientResult<Self> {
        let mut config = Self::default();

        if let Ok(origin) = std::env::var("PORTAL_API_ORIGIN") {
            config.api_origin = origin;
        }
        if let Ok(path) = std::env::var("PORTAL_SESSION_FILE") {
            config.session_file = Some(PathBuf::from(path));
        }
        if let Ok(capacity) = std::env::var("PORTAL_STATUS_CAPACITY") {
            config.status_capacity = capacity.parse().map_err(|_| {
                error::errors::config(
                    "PORTAL_STATUS_CAPACITY",
                    format!("'{capacity}' is not a valid capacity"),
                )
            })?;
        }

        debug!(origin = %config.api_origin, "Configuration loaded from environment");
        Ok(config)
    }
}

/// Composition root wiring store, transport, gateway, API surface and
/// session manager together.
pub struct PortalClient {
    api: Arc<PortalApi>,
    session: Arc<SessionManager>,
}

impl PortalClient {
    /// Create a client with the reqwest transport and the file-backed store
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let path = match config.session_file.clone() {
            Some(path) => path,
            None => FileSessionStore::default_path().ok_or_else(|| {
                error::errors::config("session_file", "no user config directory available")
            })?,
        };
        let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(path));
        Self::with_parts(config, Arc::new(ReqwestHttpClient::new()), store)
    }

    /// Create a client over an injected transport and store
    pub fn with_parts(
        config: ClientConfig,
        http: Arc<dyn HttpClient>,
        store: Arc<dyn SessionStore>,
    ) -> ClientResult<Self> {
        if config.status_capacity == 0 {
            return Err(error::errors::config(
                "status_capacity",
                "capacity must be at least 1",
            ));
        }

        let gateway = RequestGateway::new(config.api_origin, http, Arc::clone(&store));
        let api = Arc::new(PortalApi::new(gateway));
        let session = Arc::new(SessionManager::new(
            Arc::clone(&api),
            store,
            config.status_capacity,
        ));

        Ok(Self { api, session })
    }

    /// Derive and broadcast the startup login status. Must run before the
    /// session state is trusted.
    pub async fn initialize(&self) -> bool {
        self.session.initialize().await
    }

    /// The typed API surface
    pub fn api(&self) -> &Arc<PortalApi> {
        &self.api
    }

    /// The session manager
    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }
}
