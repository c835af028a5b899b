use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{errors, ClientError, ClientResult};
use crate::http_client::{HttpClient, HttpMethod, HttpResponse};
use crate::store::{SessionStore, StoreError};

/// Name of the request header carrying the session token
pub const TOKEN_HEADER: &str = "Token";

/// Error body shape returned by the API on failures
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Builds signed requests against the fixed API origin.
///
/// The gateway re-reads the session token from the store before every
/// request and attaches it as a `Token` header when present; when no token
/// is stored the request goes out without the header. Beyond header
/// injection and JSON decoding it is a pass-through over the injected
/// transport: no retries, no timeouts, no error masking.
pub struct RequestGateway {
    origin: String,
    http: Arc<dyn HttpClient>,
    store: Arc<dyn SessionStore>,
}

impl RequestGateway {
    /// Create a gateway for the given API origin
    pub fn new(
        origin: impl Into<String>,
        http: Arc<dyn HttpClient>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        let mut origin = origin.into();
        while origin.ends_with('/') {
            origin.pop();
        }
        Self {
            origin,
            http,
            store,
        }
    }

    /// The API origin requests are issued against
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Issue a signed GET request and decode the JSON response
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send(HttpMethod::Get, path, None).await
    }

    /// Issue a signed POST request with a JSON body and decode the response
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.send(HttpMethod::Post, path, Some(Self::encode(body)?))
            .await
    }

    /// Issue a signed PUT request with a JSON body and decode the response
    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.send(HttpMethod::Put, path, Some(Self::encode(body)?))
            .await
    }

    /// Issue a signed DELETE request and decode the JSON response
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send(HttpMethod::Delete, path, None).await
    }

    fn encode<B: Serialize>(body: &B) -> ClientResult<String> {
        serde_json::to_string(body)
            .map_err(|e| errors::invalid_response("<request body>", e))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
    ) -> ClientResult<T> {
        let url = format!("{}{}", self.origin, path);
        let request_id = Uuid::new_v4();

        let mut headers = HashMap::new();
        match self.store.get().await {
            Ok(token) => {
                headers.insert(TOKEN_HEADER.to_string(), token);
            }
            // No token stored: the request goes out unsigned
            Err(StoreError::NotFound) => {}
            Err(e) => {
                warn!(request_id = %request_id, error = %e, "Token lookup failed, sending unsigned request");
            }
        }

        debug!(
            request_id = %request_id,
            method = method.as_str(),
            url = %url,
            signed = headers.contains_key(TOKEN_HEADER),
            "Sending API request"
        );

        let response = self
            .http
            .request(method, &url, headers, body)
            .await
            .map_err(|e| errors::network(&url, e))?;

        if !response.is_success() {
            let err = Self::error_from_response(&response);
            debug!(request_id = %request_id, status = response.status(), error = %err, "API request failed");
            return Err(err);
        }

        response
            .json::<T>()
            .map_err(|e| errors::invalid_response(&url, e))
    }

    /// Map a non-success response to a typed error, using the API error
    /// body's `message` field when it decodes.
    fn error_from_response(response: &HttpResponse) -> ClientError {
        let message = response
            .json::<ApiErrorBody>()
            .map(|body| body.message)
            .unwrap_or_else(|_| response.body().to_string());

        match response.status() {
            401 | 403 => errors::auth_rejected(response.status(), message),
            status => errors::request_failed(status, message),
        }
    }
}
