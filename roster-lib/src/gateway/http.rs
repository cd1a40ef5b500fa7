//! JSON-over-HTTP gateway

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::RequestBuilder;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::RecordGateway;
use crate::error::GatewayError;
use crate::model::ListPage;
use crate::model::Record;
use crate::model::RecordId;

/// Gateway for backends exposing a collection as three endpoints:
///
/// | Call | Request |
/// |------|---------|
/// | list | `POST {base}/{collection}/list` with `{}` |
/// | create, update | `POST {base}/{collection}/save` with the record |
/// | delete | `DELETE {base}/{collection}/remove/{id}` |
///
/// Responses are wrapped as `{ "success": bool, "response": ... }`.
///
/// Cheap to clone (uses `Arc` internally).
///
/// # Example
///
/// ```ignore
/// use roster_lib::gateway::HttpGateway;
///
/// let gateway = HttpGateway::builder()
///     .url("https://api.example.com")
///     .collection("client")
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
#[derive(Clone)]
pub struct HttpGateway {
    inner: Arc<HttpGatewayInner>,
}

struct HttpGatewayInner {
    base_url: Url,
    collection: String,
    http_client: Client,
    timeout: Option<Duration>,
}

/// Response envelope used by every endpoint.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default = "default_success")]
    success: bool,
    response: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

fn default_success() -> bool {
    true
}

impl HttpGateway {
    /// Creates a new builder for constructing a gateway.
    pub fn builder() -> HttpGatewayBuilder<Missing> {
        HttpGatewayBuilder::new()
    }

    /// Returns the base URL of the backend.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Returns the collection path segment.
    pub fn collection(&self) -> &str {
        &self.inner.collection
    }

    /// Builds `{base}/{collection}/{segments...}`.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .push(&self.inner.collection)
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<String, GatewayError> {
        let request = match self.inner.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        };

        let response = request.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.classify(e))?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(GatewayError::http(status.as_u16(), body))
        }
    }

    fn classify(&self, error: reqwest::Error) -> GatewayError {
        if error.is_timeout() {
            GatewayError::Timeout(self.inner.timeout.unwrap_or_default())
        } else {
            GatewayError::Network(error)
        }
    }

    async fn save(&self, record: &Record) -> Result<Record, GatewayError> {
        let url = self.endpoint(&["save"])?;
        log::debug!("POST {url}");
        let body = self.send(self.inner.http_client.post(url).json(record)).await?;
        decode_envelope(&body)
    }
}

#[async_trait]
impl RecordGateway for HttpGateway {
    async fn list(&self) -> Result<ListPage, GatewayError> {
        let url = self.endpoint(&["list"])?;
        log::debug!("POST {url}");
        let body = self
            .send(self.inner.http_client.post(url).json(&serde_json::json!({})))
            .await?;
        decode_envelope(&body)
    }

    async fn create(&self, record: &Record) -> Result<Record, GatewayError> {
        let saved = self.save(record).await?;
        if saved.is_new() {
            return Err(GatewayError::parse("backend returned a created record without an id"));
        }
        Ok(saved)
    }

    async fn update(&self, record: &Record) -> Result<Record, GatewayError> {
        self.save(record).await
    }

    async fn delete(&self, id: &RecordId) -> Result<(), GatewayError> {
        let id = id.to_string();
        let url = self.endpoint(&["remove", &id])?;
        log::debug!("DELETE {url}");
        let body = self.send(self.inner.http_client.delete(url)).await?;
        decode_ack(&body)
    }
}

/// Unwraps `{ success, response }`, failing on `success: false`.
pub(crate) fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<T, GatewayError> {
    let envelope: Envelope<T> = serde_json::from_str(body)
        .map_err(|e| GatewayError::parse_with_body(e.to_string(), body))?;

    if !envelope.success {
        return Err(GatewayError::Rejected(
            envelope.message.unwrap_or_else(|| "no reason given".to_string()),
        ));
    }

    envelope
        .response
        .ok_or_else(|| GatewayError::parse_with_body("envelope has no response", body))
}

/// Accepts an empty body, any non-envelope JSON, or a successful envelope.
pub(crate) fn decode_ack(body: &str) -> Result<(), GatewayError> {
    if body.trim().is_empty() {
        return Ok(());
    }
    match serde_json::from_str::<Envelope<serde_json::Value>>(body) {
        Ok(envelope) if !envelope.success => Err(GatewayError::Rejected(
            envelope.message.unwrap_or_else(|| "no reason given".to_string()),
        )),
        _ => Ok(()),
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing an [`HttpGateway`].
///
/// The base URL is required and enforced at compile time; the collection
/// defaults to `client`.
pub struct HttpGatewayBuilder<U> {
    url: U,
    collection: String,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl HttpGatewayBuilder<Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: Missing,
            collection: "client".to_string(),
            timeout: None,
            connect_timeout: None,
            http_client: None,
        }
    }

    /// Sets the backend base URL.
    pub fn url(self, url: impl Into<String>) -> HttpGatewayBuilder<Set<String>> {
        HttpGatewayBuilder {
            url: Set(url.into()),
            collection: self.collection,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl Default for HttpGatewayBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> HttpGatewayBuilder<U> {
    /// Sets the collection path segment (e.g. `client`).
    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout used when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client, e.g. one carrying auth headers.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl HttpGatewayBuilder<Set<String>> {
    /// Builds the [`HttpGateway`].
    pub fn build(self) -> Result<HttpGateway, GatewayError> {
        let base_url = Url::parse(&self.url.0).map_err(|e| GatewayError::InvalidUrl(format!("{}: {e}", self.url.0)))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::InvalidUrl(self.url.0));
        }

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(HttpGateway {
            inner: Arc::new(HttpGatewayInner {
                base_url,
                collection: self.collection,
                http_client,
                timeout: self.timeout,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(url: &str) -> HttpGateway {
        HttpGateway::builder().url(url).build().unwrap()
    }

    #[test]
    fn test_endpoint_layout() {
        let gw = gateway("https://api.example.com");
        assert_eq!(gw.endpoint(&["list"]).unwrap().as_str(), "https://api.example.com/client/list");
        assert_eq!(
            gw.endpoint(&["remove", "1757"]).unwrap().as_str(),
            "https://api.example.com/client/remove/1757"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path_and_encodes_ids() {
        let gw = HttpGateway::builder()
            .url("https://api.example.com/v1/")
            .collection("customer")
            .build()
            .unwrap();
        assert_eq!(
            gw.endpoint(&["remove", "a b"]).unwrap().as_str(),
            "https://api.example.com/v1/customer/remove/a%20b"
        );
    }

    #[test]
    fn test_invalid_url() {
        let err = HttpGateway::builder().url("not a url").build().err().unwrap();
        assert!(matches!(err, GatewayError::InvalidUrl(_)));
    }

    #[test]
    fn test_decode_list_envelope() {
        let body = r#"{"success": true, "response": {"data": [{"id": 1, "firstname": "Ana"}], "total": 50}}"#;
        let page: ListPage = decode_envelope(body).unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.total(), 50);
    }

    #[test]
    fn test_decode_rejected_envelope() {
        let body = r#"{"success": false, "message": "duplicate email"}"#;
        let err = decode_envelope::<Record>(body).unwrap_err();
        assert!(matches!(err, GatewayError::Rejected(m) if m == "duplicate email"));
    }

    #[test]
    fn test_decode_garbage() {
        let err = decode_envelope::<Record>("<html>").unwrap_err();
        assert!(matches!(err, GatewayError::Parse { body: Some(_), .. }));
    }

    #[test]
    fn test_decode_ack() {
        assert!(decode_ack("").is_ok());
        assert!(decode_ack(r#"{"id": 2, "firstname": "Bo"}"#).is_ok());
        assert!(decode_ack(r#"{"success": false}"#).is_err());
    }
}
