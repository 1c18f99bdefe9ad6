//! HTTP adapter: plain-data requests and responses plus the verbs built on
//! top of them.
//!
//! # Design
//! Requests and responses are described as plain data. `HttpClient` builds an
//! `HttpRequest`, hands it to a `Transport` for the actual round-trip, and
//! parses the returned `HttpResponse`. Building and parsing stay pure and
//! public, so a host that performs its own I/O can skip the transport
//! entirely and still share the same request shapes and status handling.
//!
//! Exactly one attempt is made per call. The timeout lives in `HttpConfig`
//! and is enforced by the transport.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::NetworkError;

/// Base URL of the public fixture service.
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// How long a single request may take before it fails.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL: base URL joined with the resource path.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Connection settings shared by every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub base_url: String,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
}

impl HttpConfig {
    /// JSON content type and the default timeout against `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Executes a request and returns the raw response.
///
/// Non-2xx statuses are data, not errors: implementations only fail when no
/// response was obtained at all.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, NetworkError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, NetworkError> {
        (**self).execute(request).await
    }
}

/// JSON client bound to one base URL.
#[derive(Debug, Clone)]
pub struct HttpClient<T> {
    config: HttpConfig,
    transport: T,
}

impl<T> HttpClient<T> {
    pub fn new(config: HttpConfig, transport: T) -> Self {
        let config = HttpConfig {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            ..config
        };
        Self { config, transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build a body-less request for `path` (which starts with `/`).
    pub fn build_request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest {
            method,
            url: format!("{}{path}", self.config.base_url),
            headers: self.config.headers.clone(),
            body: None,
        }
    }

    /// Build a request carrying `body` serialized as JSON.
    pub fn build_json_request<B>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> Result<HttpRequest, NetworkError>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_string(body).map_err(|e| NetworkError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            body: Some(body),
            ..self.build_request(method, path)
        })
    }
}

impl<T: Transport> HttpClient<T> {
    /// Run `request` through the transport. Status is not checked here.
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, NetworkError> {
        debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let response = self.transport.execute(request).await?;
        debug!(status = response.status, "received response");
        Ok(response)
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, NetworkError> {
        let request = self.build_request(HttpMethod::Get, path);
        decode_json(self.execute(request).await?)
    }

    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, NetworkError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.build_json_request(HttpMethod::Post, path, body)?;
        decode_json(self.execute(request).await?)
    }

    pub async fn put<B, R>(&self, path: &str, body: &B) -> Result<R, NetworkError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.build_json_request(HttpMethod::Put, path, body)?;
        decode_json(self.execute(request).await?)
    }

    /// The response body is an acknowledgement only and is discarded.
    pub async fn delete(&self, path: &str) -> Result<(), NetworkError> {
        let request = self.build_request(HttpMethod::Delete, path);
        check_status(&self.execute(request).await?)
    }
}

/// Map non-success status codes to the appropriate `NetworkError` variant.
pub fn check_status(response: &HttpResponse) -> Result<(), NetworkError> {
    match response.status {
        200..=299 => Ok(()),
        404 => Err(NetworkError::NotFound),
        status => Err(NetworkError::Status {
            status,
            body: response.body.clone(),
        }),
    }
}

/// Check the status, then decode the body as JSON.
pub fn decode_json<R: DeserializeOwned>(response: HttpResponse) -> Result<R, NetworkError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| NetworkError::Deserialization(e.to_string()))
}
