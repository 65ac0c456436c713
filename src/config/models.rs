use crate::humanize::HumanDuration;
use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub preload: PreloadConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Photo-listing backend connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Base URL the API paths and proxy image URLs are built on
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: HumanDuration,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: HumanDuration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout() -> HumanDuration {
    HumanDuration::from_secs(12)
}

fn default_connect_timeout() -> HumanDuration {
    HumanDuration::from_secs(5)
}

fn default_user_agent() -> String {
    format!("sitecam/{}", env!("CARGO_PKG_VERSION"))
}

/// Cache lifetimes
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_last_photo_ttl")]
    pub last_photo_ttl: HumanDuration,
    #[serde(default = "default_date_images_ttl")]
    pub date_images_ttl: HumanDuration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            last_photo_ttl: default_last_photo_ttl(),
            date_images_ttl: default_date_images_ttl(),
        }
    }
}

fn default_last_photo_ttl() -> HumanDuration {
    HumanDuration::from_secs(5 * 60)
}

fn default_date_images_ttl() -> HumanDuration {
    HumanDuration::from_secs(30 * 60)
}

/// Progressive preload pacing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PreloadConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_batch_delay")]
    pub batch_delay: HumanDuration,
    /// Days on each side of the selected date to warm
    #[serde(default = "default_adjacent_days")]
    pub adjacent_days: u32,
    /// Images loaded per adjacent date
    #[serde(default = "default_adjacent_images")]
    pub adjacent_images: usize,
    #[serde(default = "default_adjacent_delay_min")]
    pub adjacent_delay_min: HumanDuration,
    #[serde(default = "default_adjacent_delay_max")]
    pub adjacent_delay_max: HumanDuration,
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_delay: default_batch_delay(),
            adjacent_days: default_adjacent_days(),
            adjacent_images: default_adjacent_images(),
            adjacent_delay_min: default_adjacent_delay_min(),
            adjacent_delay_max: default_adjacent_delay_max(),
        }
    }
}

fn default_batch_size() -> usize {
    5
}

fn default_batch_delay() -> HumanDuration {
    HumanDuration::from_millis(100)
}

fn default_adjacent_days() -> u32 {
    2
}

fn default_adjacent_images() -> usize {
    3
}

fn default_adjacent_delay_min() -> HumanDuration {
    HumanDuration::from_millis(1000)
}

fn default_adjacent_delay_max() -> HumanDuration {
    HumanDuration::from_millis(1500)
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            json: false,
        }
    }
}

fn default_log_filter() -> String {
    "sitecam=info".to_string()
}
