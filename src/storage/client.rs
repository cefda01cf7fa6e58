//! HTTP client for the object-storage service.
//!
//! - `PUT {base}/{key}` uploads a blob
//! - `GET {base}/{key}/url?expires={secs}` resolves a display URL
//! - `DELETE {base}/{key}` removes a blob

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::BlobStore;
use crate::error::ClientError;

/// Default base URL of the local mock backend.
pub const DEFAULT_URL: &str = "http://localhost:17020/storage";

/// Display URLs stay valid for 15 minutes unless configured otherwise.
pub const DEFAULT_EXPIRY_SECS: u64 = 900;

#[derive(Debug, Deserialize)]
struct SignedUrl {
    url: String,
}

/// HTTP client for blob storage.
#[derive(Debug, Clone)]
pub struct HttpBlobStore {
    base_url: String,
    token: Option<String>,
    expiry_secs: u64,
    client: Client,
}

impl HttpBlobStore {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            expiry_secs: DEFAULT_EXPIRY_SECS,
            client: Client::new(),
        }
    }

    /// Lifetime requested for display URLs.
    pub fn with_expiry_secs(mut self, secs: u64) -> Self {
        self.expiry_secs = secs;
        self
    }

    fn key_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, urlencoding::encode(key))
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let mut req = self.client.request(method, url);
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::NOT_FOUND => ClientError::NotFound(body),
            StatusCode::BAD_REQUEST => ClientError::BadRequest(body),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClientError::Unauthorized,
            _ => ClientError::Server(format!("{}: {}", status, body)),
        })
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), ClientError> {
        let size = bytes.len();
        let mut req = self
            .request(reqwest::Method::PUT, &self.key_url(key))
            .body(bytes);
        if let Some(content_type) = content_type {
            req = req.header(reqwest::header::CONTENT_TYPE, content_type);
        }
        self.check(req.send().await?).await?;
        tracing::debug!(key, size, "uploaded blob");
        Ok(())
    }

    async fn get_url(&self, key: &str) -> Result<String, ClientError> {
        let url = format!("{}/url?expires={}", self.key_url(key), self.expiry_secs);
        let response = self.request(reqwest::Method::GET, &url).send().await?;
        let signed: SignedUrl = self.check(response).await?.json().await?;
        Ok(signed.url)
    }

    async fn remove(&self, key: &str) -> Result<(), ClientError> {
        let response = self
            .request(reqwest::Method::DELETE, &self.key_url(key))
            .send()
            .await?;
        self.check(response).await?;
        tracing::debug!(key, "removed blob");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_percent_encoded() {
        let store = HttpBlobStore::new("http://host/storage/", None);
        assert_eq!(
            store.key_url("my lunch/1.jpg"),
            "http://host/storage/my%20lunch%2F1.jpg"
        );
    }
}
