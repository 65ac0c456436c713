//! Image fetchers used to warm downstream caches

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Image request failed: {0}")]
    RequestFailed(String),

    #[error("Image request timed out")]
    Timeout,

    #[error("Image request returned HTTP {0}")]
    Status(u16),
}

/// Fetches an image so the layer below keeps it warm; the bytes are not returned.
#[async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load(&self, url: &str) -> Result<(), LoadError>;
}

/// Fetch-and-discard loader over HTTP
pub struct HttpImageLoader {
    client: Client,
}

impl HttpImageLoader {
    pub fn new(request_timeout: Duration, user_agent: &str) -> Result<Self, LoadError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| LoadError::RequestFailed(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ImageLoader for HttpImageLoader {
    async fn load(&self, url: &str) -> Result<(), LoadError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                LoadError::Timeout
            } else {
                LoadError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| LoadError::RequestFailed(format!("Failed to read body: {}", e)))?;

        debug!(url, size = bytes.len(), "Image preloaded");
        Ok(())
    }
}
