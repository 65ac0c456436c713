//! Runtime settings: backend endpoint, cache lifetimes, preload pacing and logging.
//!
//! Values come from struct defaults, then `config/sitecam.toml` (or the file
//! named by `SITECAM_CONFIG`), then `SITECAM__<SECTION>__<KEY>` environment
//! variables, e.g. `SITECAM__CACHE__LAST_PHOTO_TTL=2m`. Durations accept
//! `ms`/`s`/`m`/`h` suffixes or bare milliseconds.
//!
//! ```no_run
//! use sitecam::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Backend: {}", config.backend.base_url);
//! ```

mod models;
mod sources;
mod validation;

pub use crate::humanize::HumanDuration;
pub use models::{BackendConfig, CacheConfig, Config, PreloadConfig, TelemetryConfig};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or
    /// validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}
