//! # HTTP Client Utilities
//!
//! Shared HTTP client for provider adapters.
//!
//! This module provides a reusable client wrapper with:
//! - A per-request timeout
//! - JSON request and response bodies
//! - Mapping of transport failures and status codes into [`ProviderError`]
//!
//! # Examples
//!
//! ```ignore
//! use financing_aggregator::infrastructure::providers::http_client::HttpClient;
//!
//! let client = HttpClient::new(5000)?;
//! let response: MyResponse = client.get("https://bank.example.com/applications/1").await?;
//! ```

use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use reqwest::{Client, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client wrapper for provider adapters.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout_ms: u64,
}

impl HttpClient {
    /// Creates a new HTTP client with the specified timeout.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Internal` if the client cannot be created.
    pub fn new(timeout_ms: u64) -> ProviderResult<Self> {
        Self::build(timeout_ms, false)
    }

    /// Creates a client that skips TLS certificate validation.
    ///
    /// Only for partners whose certificates cannot be validated.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Internal` if the client cannot be created.
    pub fn insecure(timeout_ms: u64) -> ProviderResult<Self> {
        Self::build(timeout_ms, true)
    }

    fn build(timeout_ms: u64, accept_invalid_certs: bool) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .map_err(|e| ProviderError::internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, timeout_ms })
    }

    /// Returns the configured timeout in milliseconds.
    #[inline]
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Makes a GET request and deserializes the JSON response.
    ///
    /// Only `200 OK` is accepted.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Timeout` or `ProviderError::Connection` if the
    /// request fails, `ProviderError::Rejected` on any other status and
    /// `ProviderError::Protocol` if the body cannot be parsed.
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> ProviderResult<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        self.handle_response(response, &[StatusCode::OK]).await
    }

    /// Makes a POST request with a JSON body and deserializes the JSON response.
    ///
    /// `200 OK` and `201 Created` are accepted.
    ///
    /// # Errors
    ///
    /// Same as [`HttpClient::get`].
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> ProviderResult<T> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        self.handle_response(response, &[StatusCode::OK, StatusCode::CREATED])
            .await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
        accepted: &[StatusCode],
    ) -> ProviderResult<T> {
        let status = response.status();

        if accepted.contains(&status) {
            response
                .json::<T>()
                .await
                .map_err(|e| ProviderError::protocol(format!("failed to parse response: {e}")))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ProviderError::rejected(status.as_u16(), body))
        }
    }

    fn map_reqwest_error(&self, error: reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::timeout_with_duration("request timed out", self.timeout_ms)
        } else if error.is_connect() {
            ProviderError::connection(format!("connection failed: {error}"))
        } else {
            ProviderError::connection(format!("HTTP request failed: {error}"))
        }
    }
}

/// Parses a provider base URL, ignoring trailing slashes.
///
/// # Errors
///
/// Returns `ProviderError::Internal` if `base_url` is not an absolute URL.
pub fn parse_base_url(base_url: &str) -> ProviderResult<Url> {
    Url::parse(base_url.trim_end_matches('/'))
        .map_err(|e| ProviderError::internal(format!("invalid base URL {base_url}: {e}")))
}

/// Appends `segments` to the path of `base`, percent-encoding each one.
///
/// # Errors
///
/// Returns `ProviderError::Internal` if `base` cannot carry a path.
pub fn endpoint(base: &Url, segments: &[&str]) -> ProviderResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ProviderError::internal(format!("base URL {base} cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Pong {
        ok: bool,
    }

    #[test]
    fn new_client() {
        let client = HttpClient::new(5000).unwrap();
        assert_eq!(client.timeout_ms(), 5000);
        assert!(HttpClient::insecure(1000).is_ok());
    }

    #[tokio::test]
    async fn get_accepts_only_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/created"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let client = HttpClient::new(1000).unwrap();
        let pong: Pong = client.get(&format!("{}/ok", server.uri())).await.unwrap();
        assert!(pong.ok);

        let err = client
            .get::<Pong>(&format!("{}/created", server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(201));
    }

    #[tokio::test]
    async fn post_accepts_created() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/items"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let client = HttpClient::new(1000).unwrap();
        let pong: Pong = client
            .post(&format!("{}/items", server.uri()), &serde_json::json!({}))
            .await
            .unwrap();
        assert!(pong.ok);
    }

    #[tokio::test]
    async fn malformed_body_is_protocol_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = HttpClient::new(1000).unwrap();
        let err = client.get::<Pong>(&server.uri()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Protocol { .. }));
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"ok": true}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = HttpClient::new(50).unwrap();
        let err = client.get::<Pong>(&server.uri()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Timeout { .. }));
    }

    #[test]
    fn endpoint_joins_onto_base_path() {
        let base = parse_base_url("http://bank.test/api/").unwrap();
        let url = endpoint(&base, &["applications"]).unwrap();
        assert_eq!(url.as_str(), "http://bank.test/api/applications");

        let root = parse_base_url("http://bank.test").unwrap();
        let url = endpoint(&root, &["applications", "42"]).unwrap();
        assert_eq!(url.as_str(), "http://bank.test/applications/42");
    }

    #[test]
    fn endpoint_escapes_reserved_characters() {
        let base = parse_base_url("http://bank.test/api").unwrap();
        let url = endpoint(&base, &["applications", "a/b?c#d"]).unwrap();
        assert_eq!(url.as_str(), "http://bank.test/api/applications/a%2Fb%3Fc%23d");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn relative_base_url_is_rejected() {
        let err = parse_base_url("bank.test/api").unwrap_err();
        assert!(matches!(err, ProviderError::Internal { .. }));
    }
}
