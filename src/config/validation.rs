use super::models::Config;
use std::time::Duration;
use thiserror::Error;

const MIN_REQUEST_TIMEOUT: Duration = Duration::from_secs(1);
const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Backend base_url must be an http/https URL, got '{0}'")]
    InvalidBaseUrl(String),

    #[error("Request timeout {actual:?} outside allowed range {min:?}..={max:?}")]
    RequestTimeoutOutOfRange {
        actual: Duration,
        min: Duration,
        max: Duration,
    },

    #[error("Cache TTL must be positive: {field}")]
    InvalidCacheTTL { field: String },

    #[error("Preload batch_size must be at least 1")]
    InvalidBatchSize,

    #[error("adjacent_delay_min ({min:?}) exceeds adjacent_delay_max ({max:?})")]
    InvalidAdjacentDelayWindow { min: Duration, max: Duration },
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_backend(config)?;
    validate_cache(config)?;
    validate_preload(config)?;
    Ok(())
}

fn validate_backend(config: &Config) -> Result<(), ValidationError> {
    let base_url = config.backend.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ValidationError::InvalidBaseUrl(base_url.to_string()));
    }

    let timeout = config.backend.request_timeout.as_duration();
    if !(MIN_REQUEST_TIMEOUT..=MAX_REQUEST_TIMEOUT).contains(&timeout) {
        return Err(ValidationError::RequestTimeoutOutOfRange {
            actual: timeout,
            min: MIN_REQUEST_TIMEOUT,
            max: MAX_REQUEST_TIMEOUT,
        });
    }

    Ok(())
}

fn validate_cache(config: &Config) -> Result<(), ValidationError> {
    if config.cache.last_photo_ttl.as_duration().is_zero() {
        return Err(ValidationError::InvalidCacheTTL {
            field: "last_photo_ttl".to_string(),
        });
    }

    if config.cache.date_images_ttl.as_duration().is_zero() {
        return Err(ValidationError::InvalidCacheTTL {
            field: "date_images_ttl".to_string(),
        });
    }

    Ok(())
}

fn validate_preload(config: &Config) -> Result<(), ValidationError> {
    if config.preload.batch_size == 0 {
        return Err(ValidationError::InvalidBatchSize);
    }

    let min = config.preload.adjacent_delay_min.as_duration();
    let max = config.preload.adjacent_delay_max.as_duration();
    if min > max {
        return Err(ValidationError::InvalidAdjacentDelayWindow { min, max });
    }

    Ok(())
}
