//! reqwest-backed client for the pictures API

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::types::{AvailableDatesResponse, PicturesQuery, PicturesResponse};
use super::{BackendError, PhotoBackend, Result, api_root};
use crate::config::BackendConfig;
use crate::model::CameraKey;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl From<&BackendConfig> for HttpConfig {
    fn from(config: &BackendConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            connect_timeout: config.connect_timeout.as_duration(),
            request_timeout: config.request_timeout.as_duration(),
            user_agent: config.user_agent.clone(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::from(&BackendConfig::default())
    }
}

pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: HttpConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(BackendError::InvalidUrl(base_url));
        }

        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| BackendError::RequestFailed(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    fn camera_url(&self, key: &CameraKey, suffix: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            api_root(&self.base_url),
            key.site(),
            key.project(),
            key.camera(),
            suffix
        )
    }

    async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout
            } else {
                BackendError::Decode(e.to_string())
            }
        })?;

        debug!(url, "Backend response decoded");
        Ok(body)
    }
}

fn map_send_error(e: reqwest::Error) -> BackendError {
    if e.is_timeout() {
        BackendError::Timeout
    } else {
        BackendError::RequestFailed(e.to_string())
    }
}

#[async_trait]
impl PhotoBackend for HttpBackend {
    async fn list_pictures(
        &self,
        key: &CameraKey,
        query: &PicturesQuery,
    ) -> Result<PicturesResponse> {
        let url = self.camera_url(key, "pictures/");
        debug!(url = %url, ?query, "Listing pictures");

        let response = self
            .client
            .post(&url)
            .json(query)
            .send()
            .await
            .map_err(map_send_error)?;

        Self::decode(&url, response).await
    }

    async fn available_dates(&self, key: &CameraKey) -> Result<AvailableDatesResponse> {
        let url = self.camera_url(key, "available-dates");
        debug!(url = %url, "Listing available dates");

        let response = self.client.get(&url).send().await.map_err(map_send_error)?;

        Self::decode(&url, response).await
    }
}
