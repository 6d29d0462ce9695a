//! HTTP transport over `reqwest`.
//!
//! Sends a built `ProviderRequest` as a JSON POST and reads the whole
//! response. No retries: one request, one attempt.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

use crate::request::ProviderRequest;
use crate::traits::{RawResponse, Transport};

/// Default whole-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

// ─────────────────────────────────────────────
// ReqwestTransport
// ─────────────────────────────────────────────

/// Transport backed by a shared, connection-pooled `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ReqwestTransport {
    /// Build a transport whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(ReqwestTransport { client, timeout })
    }
}

/// Convert builder headers into a `HeaderMap`, marking credentials sensitive.
fn header_map(headers: &[(String, String)]) -> anyhow::Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .with_context(|| format!("invalid header name '{key}'"))?;
        let mut val = HeaderValue::from_str(value)
            .with_context(|| format!("invalid value for header '{key}'"))?;
        if name == reqwest::header::AUTHORIZATION || name.as_str() == "x-api-key" {
            val.set_sensitive(true);
        }
        map.insert(name, val);
    }
    Ok(map)
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ProviderRequest) -> anyhow::Result<RawResponse> {
        let headers = header_map(&request.headers)?;

        let mut builder = self.client.post(&request.url).headers(headers);
        if !request.query_params.is_empty() {
            builder = builder.query(&request.query_params);
        }

        // `without_url` keeps query-string keys out of error messages.
        let response = builder
            .json(&request.body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow::anyhow!("timed out after {}s", self.timeout.as_secs())
                } else {
                    anyhow::Error::new(e.without_url())
                }
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| anyhow::Error::new(e.without_url()))
            .context("failed to read response body")?;

        debug!(
            provider = %request.provider,
            status,
            bytes = body.len(),
            "HTTP response received"
        );

        Ok(RawResponse { status, body })
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use cotask_core::types::ProviderTag;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(url: String) -> ProviderRequest {
        ProviderRequest {
            provider: ProviderTag::OpenAi,
            url,
            headers: vec![("Authorization".into(), "Bearer test-key".into())],
            query_params: Vec::new(),
            body: json!({ "model": "gpt-4o" }),
        }
    }

    #[test]
    fn test_header_map_marks_credentials_sensitive() {
        let map = header_map(&[
            ("x-api-key".into(), "k".into()),
            ("anthropic-version".into(), "2023-06-01".into()),
        ])
        .unwrap();
        assert!(map["x-api-key"].is_sensitive());
        assert!(!map["anthropic-version"].is_sensitive());
    }

    #[test]
    fn test_header_map_rejects_invalid_value() {
        let err = header_map(&[("Authorization".into(), "Bearer bad\nkey".into())]).unwrap_err();
        assert!(err.to_string().contains("Authorization"));
    }

    #[tokio::test]
    async fn test_send_posts_json_with_headers() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(json!({ "model": "gpt-4o" })))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"ok\":true}"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let transport = ReqwestTransport::new(DEFAULT_TIMEOUT).unwrap();
        let resp = transport
            .send(&request(format!("{}/chat/completions", mock_server.uri())))
            .await
            .unwrap();

        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, "{\"ok\":true}");
    }

    #[tokio::test]
    async fn test_send_appends_query_params() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-pro:generateContent"))
            .and(query_param("key", "g-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut req = request(format!("{}/models/gemini-pro:generateContent", mock_server.uri()));
        req.headers.clear();
        req.query_params.push(("key".into(), "g-key".into()));

        let transport = ReqwestTransport::new(DEFAULT_TIMEOUT).unwrap();
        let resp = transport.send(&req).await.unwrap();
        assert_eq!(resp.status, 200);
    }

    #[tokio::test]
    async fn test_error_status_is_a_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&mock_server)
            .await;

        let transport = ReqwestTransport::new(DEFAULT_TIMEOUT).unwrap();
        let resp = transport.send(&request(mock_server.uri())).await.unwrap();
        assert_eq!(resp.status, 503);
        assert_eq!(resp.body, "overloaded");
        assert!(!resp.is_success());
    }

    #[tokio::test]
    async fn test_network_error() {
        // Point to a port that's not listening
        let transport = ReqwestTransport::new(DEFAULT_TIMEOUT).unwrap();
        let mut req = request("http://127.0.0.1:1/chat/completions".into());
        req.query_params.push(("key".into(), "super-secret".into()));

        let err = transport.send(&req).await.unwrap_err();
        assert!(!format!("{err:#}").contains("super-secret"));
    }

    #[tokio::test]
    async fn test_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("{}")
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&mock_server)
            .await;

        let transport = ReqwestTransport::new(Duration::from_millis(200)).unwrap();
        let err = transport.send(&request(mock_server.uri())).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
