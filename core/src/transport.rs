//! `reqwest`-backed `Transport`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use tracing::warn;

use crate::error::NetworkError;
use crate::http::{HttpConfig, HttpMethod, HttpRequest, HttpResponse, Transport};

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Performs requests over the network with a fixed per-request timeout.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, NetworkError> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| NetworkError::Transport(e.to_string()))?;
        Ok(Self { client, timeout })
    }

    pub fn from_config(config: &HttpConfig) -> Result<Self, NetworkError> {
        Self::new(config.timeout)
    }

    fn map_error(&self, err: &reqwest::Error) -> NetworkError {
        if err.is_timeout() {
            NetworkError::Timeout {
                millis: self.timeout.as_millis(),
            }
        } else {
            NetworkError::Transport(err.to_string())
        }
    }
}

fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, NetworkError> {
        let mut builder = self.client.request(to_method(request.method), &request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(url = %request.url, error = %e, "request failed");
            self.map_error(&e)
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = response.text().await.map_err(|e| self.map_error(&e))?;

        Ok(HttpResponse { status, headers, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn methods_map_one_to_one() {
        assert_eq!(to_method(HttpMethod::Get), Method::GET);
        assert_eq!(to_method(HttpMethod::Post), Method::POST);
        assert_eq!(to_method(HttpMethod::Put), Method::PUT);
        assert_eq!(to_method(HttpMethod::Delete), Method::DELETE);
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        // Port 9 (discard) on loopback is closed in test environments.
        let transport = ReqwestTransport::new(Duration::from_secs(2)).unwrap();
        let err = transport
            .execute(HttpRequest {
                method: HttpMethod::Get,
                url: "http://127.0.0.1:9/users".to_string(),
                headers: Vec::new(),
                body: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, NetworkError::Transport(_) | NetworkError::Timeout { .. }));
    }
}
