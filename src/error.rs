use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::store::StoreError;

/// Error type for portal client operations
#[derive(Error, Debug, Clone)]
pub enum ClientError {
    /// No session token is persisted; the client is logged out
    #[error("no session token stored")]
    TokenNotFound,

    /// The persistence medium failed (quota, permissions, corrupt file)
    #[error("session storage failed: {reason}")]
    Storage { reason: String },

    /// The transport failed before an HTTP response was produced
    #[error("request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    /// The server rejected the credentials or the session token
    #[error("authentication rejected ({status}): {message}")]
    AuthRejected { status: u16, message: String },

    /// The server answered with a non-success status outside the auth range
    #[error("API request failed ({status}): {message}")]
    RequestFailed { status: u16, message: String },

    /// The response body could not be decoded as the expected JSON shape
    #[error("could not decode response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },

    /// A configuration value is missing or unusable
    #[error("invalid configuration value for '{key}': {reason}")]
    Config { key: String, reason: String },
}

/// Error categories for reporting and handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Transport-level failures
    Network,
    /// Credential or token rejection by the server
    Authentication,
    /// Persistence medium failures
    Storage,
    /// Unexpected wire formats or server answers
    Protocol,
    /// Local configuration problems
    Configuration,
}

impl ClientError {
    /// Classify this error for logging and user messaging
    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::TokenNotFound | ClientError::AuthRejected { .. } => {
                ErrorCategory::Authentication
            }
            ClientError::Storage { .. } => ErrorCategory::Storage,
            ClientError::Network { .. } => ErrorCategory::Network,
            ClientError::RequestFailed { .. } | ClientError::InvalidResponse { .. } => {
                ErrorCategory::Protocol
            }
            ClientError::Config { .. } => ErrorCategory::Configuration,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Network => write!(f, "Network"),
            ErrorCategory::Authentication => write!(f, "Authentication"),
            ErrorCategory::Storage => write!(f, "Storage"),
            ErrorCategory::Protocol => write!(f, "Protocol"),
            ErrorCategory::Configuration => write!(f, "Configuration"),
        }
    }
}

impl From<StoreError> for ClientError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ClientError::TokenNotFound,
            StoreError::Storage { reason } => ClientError::Storage { reason },
        }
    }
}

/// Result type for portal client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Helpers for constructing errors at call sites
pub mod errors {
    use super::*;

    /// Create a network error from a transport failure
    pub fn network(url: impl Into<String>, reason: impl fmt::Display) -> ClientError {
        ClientError::Network {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an authentication rejected error
    pub fn auth_rejected(status: u16, message: impl Into<String>) -> ClientError {
        ClientError::AuthRejected {
            status,
            message: message.into(),
        }
    }

    /// Create a request failed error
    pub fn request_failed(status: u16, message: impl Into<String>) -> ClientError {
        ClientError::RequestFailed {
            status,
            message: message.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(url: impl Into<String>, reason: impl fmt::Display) -> ClientError {
        ClientError::InvalidResponse {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a configuration error
    pub fn config(key: impl Into<String>, reason: impl Into<String>) -> ClientError {
        ClientError::Config {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
