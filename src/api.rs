use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{errors, ClientError, ClientResult};
use crate::gateway::RequestGateway;

/// Credentials posted to the login endpoint
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful login response
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// The session token to persist
    pub token: String,
    /// Display name of the authenticated user
    #[serde(default)]
    pub username: Option<String>,
}

/// Message payload returned by the demo endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Msg {
    pub msg: String,
}

/// Typed surface over the portal API endpoints
pub struct PortalApi {
    gateway: RequestGateway,
}

impl PortalApi {
    /// Create the API surface over a gateway
    pub fn new(gateway: RequestGateway) -> Self {
        Self { gateway }
    }

    /// The API origin requests are issued against
    pub fn origin(&self) -> &str {
        self.gateway.origin()
    }

    /// Exchange credentials for a session token.
    ///
    /// The server answers rejected credentials with 400 and a `message`
    /// body; that is reported as `AuthRejected` alongside the 401/403
    /// cases the gateway already maps.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<LoginResponse> {
        debug!(username, "Posting login request");
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        match self.gateway.post::<LoginResponse, _>("/login", &request).await {
            Ok(response) => Ok(response),
            Err(ClientError::RequestFailed { status: 400, message }) => {
                Err(errors::auth_rejected(400, message))
            }
            Err(e) => Err(e),
        }
    }

    /// Fetch the quick demo message (signed request)
    pub async fn quick(&self) -> ClientResult<Msg> {
        self.gateway.get("/quick").await
    }

    /// Fetch the long-running demo message (signed request)
    pub async fn long(&self) -> ClientResult<Msg> {
        self.gateway.get("/long").await
    }
}
