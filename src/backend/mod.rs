//! Photo-listing backend
//!
//! [`PhotoBackend`] is the seam between retrieval logic and the REST API.
//! [`HttpBackend`] talks to the real service; tests substitute their own.

mod http;
mod types;

pub use http::{HttpBackend, HttpConfig};
pub use types::{AvailableDatesResponse, PicturesQuery, PicturesResponse};

use async_trait::async_trait;
use thiserror::Error;

use crate::model::CameraKey;

/// Path prefix shared by the pictures API and the image proxy
pub const API_PREFIX: &str = "/api/camerapics-s3-test";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("HTTP {code}: {reason}")]
    Status { code: u16, reason: String },

    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, BackendError>;

#[async_trait]
pub trait PhotoBackend: Send + Sync {
    /// `POST {api}/{site}/{project}/{camera}/pictures/`
    async fn list_pictures(&self, key: &CameraKey, query: &PicturesQuery)
    -> Result<PicturesResponse>;

    /// `GET {api}/{site}/{project}/{camera}/available-dates`
    async fn available_dates(&self, key: &CameraKey) -> Result<AvailableDatesResponse>;
}

pub(crate) fn api_root(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), API_PREFIX)
}
