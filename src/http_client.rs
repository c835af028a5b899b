use anyhow::Result;
use std::collections::HashMap;

/// HTTP method enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// The wire name of the method
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// A minimal HTTP response holding status and body
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: u16,
    body: String,
}

impl HttpResponse {
    /// Create a new response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Get the status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Get a reference to the response body
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Parse body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Check if successful (2xx status)
    pub fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Trait for HTTP transport operations, allowing for mocking.
///
/// The transport is a pure pass-through: no retries, no timeouts beyond the
/// underlying client's own, no error rewriting.
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform an HTTP request and return the raw response
    async fn request(
        &self,
        method: HttpMethod,
        url: &str,
        headers: HashMap<String, String>,
        body: Option<String>,
    ) -> Result<HttpResponse>;
}

/// Implementation of HttpClient using reqwest
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Create a new ReqwestHttpClient
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Create a new client with custom configuration
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn request(
        &self,
        method: HttpMethod,
        url: &str,
        headers: HashMap<String, String>,
        body: Option<String>,
    ) -> Result<HttpResponse> {
        let mut request = match method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
            HttpMethod::Put => self.client.put(url),
            HttpMethod::Delete => self.client.delete(url),
        };

        for (key, value) in headers {
            request = request.header(key, value);
        }

        if let Some(body) = body {
            request = request
                .header("content-type", "application/json")
                .body(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(HttpResponse::new(status, body))
    }
}


#[cfg(test)]
mod tests {
    use super::mock::MockHttpClient;
    use super::*;

    #[tokio::test]
    async fn mock_client_returns_configured_responses() -> Result<()> {
        let client = MockHttpClient::new();

        client.mock_response("http://example.com/api", 200, "hello");
        client.mock_json(
            "http://example.com/api/json",
            200,
            &serde_json::json!({"msg": "hi"}),
        )?;
        client.mock_response("http://example.com/api/missing", 404, "not found");

        let response = client
            .request(HttpMethod::Get, "http://example.com/api", HashMap::new(), None)
            .await?;
        assert_eq!(response.status(), 200);
        assert_eq!(response.body(), "hello");
        assert!(response.is_success());

        let response = client
            .request(
                HttpMethod::Get,
                "http://example.com/api/json",
                HashMap::new(),
                None,
            )
            .await?;
        let json: serde_json::Value = response.json()?;
        assert_eq!(json["msg"], "hi");

        let response = client
            .request(
                HttpMethod::Get,
                "http://example.com/api/missing",
                HashMap::new(),
                None,
            )
            .await?;
        assert_eq!(response.status(), 404);
        assert!(!response.is_success());

        // An unconfigured URL is a transport error
        let result = client
            .request(
                HttpMethod::Get,
                "http://example.com/nowhere",
                HashMap::new(),
                None,
            )
            .await;
        assert!(result.is_err());

        Ok(())
    }

    #[tokio::test]
    async fn mock_client_records_requests() -> Result<()> {
        let client = MockHttpClient::new();
        client.mock_response("http://example.com/api", 200, "ok");

        let mut headers = HashMap::new();
        headers.insert("Token".to_string(), "abc".to_string());
        client
            .request(
                HttpMethod::Post,
                "http://example.com/api",
                headers,
                Some(r#"{"k":"v"}"#.to_string()),
            )
            .await?;

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert_eq!(requests[0].url, "http://example.com/api");
        assert_eq!(requests[0].headers.get("Token").unwrap(), "abc");
        assert_eq!(requests[0].body.as_deref(), Some(r#"{"k":"v"}"#));

        Ok(())
    }
}
