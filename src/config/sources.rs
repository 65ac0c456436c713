use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "SITECAM_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/sitecam.toml";
const ENV_PREFIX: &str = "SITECAM";
const ENV_SEPARATOR: &str = "__";

/// Resolve settings in priority order: struct defaults, the TOML file,
/// `.env` (via dotenvy), then process environment.
pub fn load() -> Result<Config, ConfigError> {
    // A missing .env is normal outside development
    let _ = dotenvy::dotenv();

    load_from_sources(config_path())
}

/// `SITECAM_CONFIG` if set, otherwise `config/sitecam.toml`
fn config_path() -> PathBuf {
    env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Build from an explicit file path plus environment overrides
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!(path = %config_path.display(), "Loading configuration file");
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            path = %config_path.display(),
            "Configuration file not found, using defaults and environment"
        );
    }

    // SITECAM__BACKEND__BASE_URL -> backend.base_url
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let mut config: Config = builder.build()?.try_deserialize()?;
    normalize(&mut config);

    tracing::info!(
        backend = %config.backend.base_url,
        last_photo_ttl = %config.cache.last_photo_ttl,
        date_images_ttl = %config.cache.date_images_ttl,
        batch_size = config.preload.batch_size,
        "Configuration resolved"
    );

    Ok(config)
}

/// Image URLs are joined onto the base URL, so it never keeps a trailing slash.
fn normalize(config: &mut Config) {
    let base = config.backend.base_url.trim().trim_end_matches('/');
    if base.len() != config.backend.base_url.len() {
        config.backend.base_url = base.to_string();
    }
}
