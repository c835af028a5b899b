use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::PortalApi;
use crate::error::ClientResult;
use crate::events::{EventStream, EventStreamStats, Subscriber};
use crate::store::{SessionStore, StoreError};

/// Default capacity of the status broadcast channel
pub const DEFAULT_STATUS_CAPACITY: usize = 16;

/// Manages the authenticated session.
///
/// The manager is the only writer to the session store and the sole owner
/// of the login-status stream. Status is never cached: every query and
/// every broadcast derives it from the store at that instant.
///
/// Call [`initialize`](Self::initialize) once after construction so the
/// initial status is derived and broadcast before anything else trusts it.
pub struct SessionManager {
    api: Arc<PortalApi>,
    store: Arc<dyn SessionStore>,
    status: EventStream<bool>,
}

impl SessionManager {
    /// Create a manager over an API surface and a session store.
    ///
    /// Performs no I/O; follow with [`initialize`](Self::initialize).
    pub fn new(api: Arc<PortalApi>, store: Arc<dyn SessionStore>, capacity: usize) -> Self {
        Self {
            api,
            store,
            status: EventStream::new(capacity),
        }
    }

    /// Derive and broadcast the startup status. Returns it.
    pub async fn initialize(&self) -> bool {
        info!("Initializing session manager");
        self.ping().await
    }

    /// Re-derive the login status from the store and broadcast it.
    ///
    /// Exactly one status event is published per call. A storage fault is
    /// reported as logged-out, since no token can be proven to exist.
    pub async fn ping(&self) -> bool {
        let logged_in = match self.store.get().await {
            Ok(_) => true,
            Err(StoreError::NotFound) => false,
            Err(e) => {
                warn!(error = %e, "Session store unreadable during ping");
                false
            }
        };

        debug!(logged_in, "Ping derived session status");
        self.status.publish(logged_in).await;
        logged_in
    }

    /// Authenticate against the portal and persist the returned token.
    ///
    /// On success exactly one `true` status event is published. A login the
    /// server rejects, or a transport failure, leaves the session state
    /// untouched and publishes nothing; the typed error reaches the caller.
    /// If the token cannot be persisted the error is propagated and the
    /// derived status (`false`, nothing on record) is broadcast.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<()> {
        let response = self.api.login(username, password).await?;

        if let Err(e) = self.store.set(&response.token).await {
            warn!(error = %e, "Login succeeded but token could not be persisted");
            self.status.publish(false).await;
            return Err(e.into());
        }

        info!(
            username = response.username.as_deref().unwrap_or(username),
            "Login succeeded"
        );
        self.status.publish(true).await;
        Ok(())
    }

    /// Drop the persisted token and broadcast logged-out.
    ///
    /// Clearing an absent token is success; a storage fault during removal
    /// is logged and swallowed, since the session is over either way.
    pub async fn logout(&self) {
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "Failed to clear persisted token during logout");
        }
        info!("Logged out");
        self.status.publish(false).await;
    }

    /// Current login status, derived from the store. Broadcasts nothing.
    pub async fn is_logged_in(&self) -> bool {
        self.store.get().await.is_ok()
    }

    /// Subscribe to login-status events.
    ///
    /// The last broadcast status (if any) is replayed to the new subscriber
    /// first. Subscribing does not trigger a ping.
    pub async fn subscribe(&self) -> Subscriber<bool> {
        self.status.subscribe().await
    }

    /// Number of current status subscribers
    pub fn subscriber_count(&self) -> usize {
        self.status.subscriber_count()
    }

    /// Statistics of the status stream
    pub async fn status_stats(&self) -> EventStreamStats {
        self.status.stats().await
    }
}
