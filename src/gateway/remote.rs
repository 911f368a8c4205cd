//! Remote adapter: JSON over HTTP against a single collection endpoint.
//!
//! | op         | verb   | path        |
//! |------------|--------|-------------|
//! | list       | GET    | base        |
//! | create     | POST   | base        |
//! | delete one | DELETE | base/{id}   |
//! | delete all | DELETE | base        |

use super::{BackendMode, GatewayResult, RecordStore, TransportError};
use crate::errors::{AppError, AppResult};
use crate::models::Record;
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, RequestBuilder, Response, Url};

/// Header carrying the credential on every request.
pub const API_KEY_HEADER: &str = "x-api-key";

pub struct RemoteStore {
    client: Client,
    base_url: String,
    base: Url,
    api_key: String,
}

impl RemoteStore {
    pub fn new(base_url: &str, api_key: &str) -> AppResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(AppError::Config("remote endpoint is empty".into()));
        }
        let base = Url::parse(&base_url)
            .map_err(|e| AppError::Config(format!("invalid remote endpoint '{base_url}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "invalid remote endpoint '{base_url}'"
            )));
        }

        let client = Client::builder()
            .user_agent(concat!("linkvault/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            base,
            api_key: api_key.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `base/{id}` with the id as one percent-encoded path segment.
    fn item_url(&self, id: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(id);
        }
        url
    }

    /// Attach the credential, send, and turn anything but 2xx into a TransportError.
    async fn send(&self, req: RequestBuilder, op: &str) -> GatewayResult<Response> {
        let resp = req
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| {
                warn!("backend error ({op}): {e}");
                TransportError::Network(e.to_string())
            })?;

        let status = resp.status();
        if status.is_success() {
            debug!("backend {op} -> {status}");
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        warn!("backend error ({op}): HTTP {status} {body}");
        Err(TransportError::Status {
            status: status.as_u16(),
            body,
        }
        .into())
    }
}

#[async_trait]
impl RecordStore for RemoteStore {
    fn mode(&self) -> BackendMode {
        BackendMode::Remote
    }

    async fn list(&self) -> GatewayResult<Vec<Record>> {
        let resp = self.send(self.client.get(&self.base_url), "GET").await?;
        let body = resp
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let records = serde_json::from_str::<Vec<Record>>(&body)
            .map_err(|e| TransportError::Decode(e.to_string()))?;
        Ok(records)
    }

    async fn create(&self, record: &Record) -> GatewayResult<()> {
        self.send(self.client.post(&self.base_url).json(record), "POST")
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> GatewayResult<()> {
        self.send(self.client.delete(self.item_url(id)), "DELETE")
            .await?;
        Ok(())
    }

    async fn clear(&self) -> GatewayResult<()> {
        self.send(self.client.delete(&self.base_url), "Clear All")
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let store = RemoteStore::new("https://api.example.com/estimates/", "k").unwrap();
        assert_eq!(store.base_url(), "https://api.example.com/estimates");
        assert_eq!(
            store.item_url("17-abc").as_str(),
            "https://api.example.com/estimates/17-abc"
        );
    }

    #[test]
    fn id_is_a_single_encoded_segment() {
        let store = RemoteStore::new("https://api.example.com/estimates", "k").unwrap();
        assert_eq!(
            store.item_url("a/b?c#d").as_str(),
            "https://api.example.com/estimates/a%2Fb%3Fc%23d"
        );

        let root = RemoteStore::new("http://127.0.0.1:8080", "k").unwrap();
        assert_eq!(root.item_url("1-x").as_str(), "http://127.0.0.1:8080/1-x");
    }

    #[test]
    fn endpoint_must_be_a_url() {
        assert!(matches!(
            RemoteStore::new("not a url", "k"),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn empty_endpoint_is_a_config_error() {
        assert!(matches!(
            RemoteStore::new("  ", "k"),
            Err(AppError::Config(_))
        ));
    }
}
