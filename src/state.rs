use std::sync::Arc;
use thiserror::Error;

use crate::backend::{BackendError, HttpBackend, HttpConfig, PhotoBackend};
use crate::cache::CacheStore;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::observability::Metrics;
use crate::preload::{HttpImageLoader, ImageLoader, LoadError, PreloadScheduler};
use crate::retrieval::ImageRetriever;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("backend client: {0}")]
    Backend(#[from] BackendError),
    #[error("image loader: {0}")]
    Loader(#[from] LoadError),
}

/// Process-wide wiring: one cache, one retriever, one preload scheduler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub cache: Arc<CacheStore>,
    pub retriever: Arc<ImageRetriever>,
    pub scheduler: Arc<PreloadScheduler>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Build against the real backend and wall clock
    pub fn from_config(config: Config) -> Result<Self, StateError> {
        let backend = HttpBackend::new(HttpConfig::from(&config.backend))?;
        let loader = HttpImageLoader::new(
            config.backend.request_timeout.as_duration(),
            &config.backend.user_agent,
        )?;

        Ok(Self::new(config, Arc::new(backend), Arc::new(loader), Arc::new(SystemClock)))
    }

    pub fn new(
        config: Config,
        backend: Arc<dyn PhotoBackend>,
        loader: Arc<dyn ImageLoader>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let metrics = Arc::new(Metrics::new());
        let cache = Arc::new(CacheStore::new(clock.clone(), &config.cache));
        let retriever = Arc::new(
            ImageRetriever::new(backend, cache.clone(), clock, config.backend.base_url.clone())
                .with_metrics(metrics.clone()),
        );
        let scheduler = Arc::new(PreloadScheduler::new(
            retriever.clone(),
            loader,
            config.preload.clone(),
        ));

        Self {
            config: Arc::new(config),
            cache,
            retriever,
            scheduler,
            metrics,
        }
    }
}
