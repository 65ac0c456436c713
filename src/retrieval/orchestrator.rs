use futures::future::join_all;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

use super::url::image_url;
use crate::backend::{PhotoBackend, PicturesQuery};
use crate::cache::CacheStore;
use crate::clock::Clock;
use crate::model::{CalendarDate, CameraKey, CameraStatus, PhotoTimestamp, parse_iso_date};
use crate::observability::Metrics;
use crate::status::classify;

/// Photos for one camera and day, newest first.
///
/// `timestamps[i]` and `urls[i]` always refer to the same photo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateImages {
    pub timestamps: Vec<PhotoTimestamp>,
    pub urls: Vec<String>,
}

impl DateImages {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Union of the two photo lists, de-duplicated, newest first.
///
/// Sorting is lexical, which is chronological for fixed-width timestamps.
pub fn merge_photos(date1_photos: Vec<String>, date2_photos: Vec<String>) -> Vec<PhotoTimestamp> {
    let unique: BTreeSet<String> = date1_photos
        .into_iter()
        .chain(date2_photos)
        .filter(|photo| !photo.is_empty())
        .collect();

    unique.into_iter().rev().map(PhotoTimestamp::from).collect()
}

/// Answers "which photos exist and where are they" for a camera,
/// cache first, backend second.
///
/// Every backend failure degrades to an empty answer; nothing here returns
/// an error to the caller.
pub struct ImageRetriever {
    backend: Arc<dyn PhotoBackend>,
    cache: Arc<CacheStore>,
    clock: Arc<dyn Clock>,
    metrics: Arc<Metrics>,
    base_url: String,
}

impl ImageRetriever {
    pub fn new(
        backend: Arc<dyn PhotoBackend>,
        cache: Arc<CacheStore>,
        clock: Arc<dyn Clock>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            cache,
            clock,
            metrics: Arc::new(Metrics::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Pure URL construction; never touches the network.
    pub fn image_url(&self, key: &CameraKey, timestamp: &PhotoTimestamp) -> String {
        image_url(&self.base_url, key, timestamp)
    }

    /// Most recent photo for a camera, or `None` when it has none or the
    /// backend could not be reached.
    pub async fn get_last_photo(&self, key: &CameraKey) -> Option<PhotoTimestamp> {
        if let Some(timestamp) = self.cache.get_last_photo(key).await {
            self.metrics.cache_hit();
            return Some(timestamp);
        }
        self.metrics.cache_miss();

        self.metrics.backend_request();
        let response = match self.backend.list_pictures(key, &PicturesQuery::latest()).await {
            Ok(response) => response,
            Err(e) => {
                self.metrics.backend_failure();
                warn!(camera = %key, error = %e, "Failed to fetch latest photo");
                return None;
            }
        };

        let timestamp = response
            .last_photo
            .filter(|photo| !photo.is_empty())
            .map(PhotoTimestamp::from);

        match &timestamp {
            Some(ts) => {
                self.cache.set_last_photo(key, ts.clone()).await;
                debug!(camera = %key, timestamp = %ts, "Cached latest photo");
            }
            None => debug!(camera = %key, "Camera has no photos"),
        }

        timestamp
    }

    /// Proxy URL of the most recent photo, or an empty string when there is none.
    pub async fn get_last_image_url(&self, key: &CameraKey) -> String {
        match self.get_last_photo(key).await {
            Some(timestamp) => self.image_url(key, &timestamp),
            None => String::new(),
        }
    }

    /// Latest image URL for many cameras at once, in input order.
    pub async fn get_latest_image_urls(&self, keys: &[CameraKey]) -> Vec<(CameraKey, String)> {
        let urls = join_all(keys.iter().map(|key| self.get_last_image_url(key))).await;
        keys.iter().cloned().zip(urls).collect()
    }

    /// Current status of a camera, recomputed against the clock on every call.
    pub async fn camera_status(&self, key: &CameraKey) -> CameraStatus {
        let last = self.get_last_photo(key).await;
        classify(last.as_ref().map(PhotoTimestamp::as_str), self.clock.now())
    }

    /// Photos for one day, newest first.
    ///
    /// Today's set is still growing, so it is always fetched and never cached.
    /// Past days are served from cache while fresh. An empty past day falls
    /// back to the camera's latest photo so there is always something to show.
    pub async fn get_images_for_date(&self, key: &CameraKey, date: CalendarDate) -> DateImages {
        if date == self.clock.today() {
            return self.fetch_date(key, date).await.unwrap_or_default();
        }

        if let Some(entry) = self.cache.get_date_images(key, date).await {
            self.metrics.cache_hit();
            debug!(camera = %key, %date, photos = entry.timestamps.len(), "Date images cache hit");
            return DateImages {
                timestamps: entry.timestamps,
                urls: entry.image_urls,
            };
        }
        self.metrics.cache_miss();

        let Some(images) = self.fetch_date(key, date).await else {
            return DateImages::default();
        };

        if images.is_empty() {
            debug!(camera = %key, %date, "No photos for date, falling back to latest");
            return self.latest_as_fallback(key).await;
        }

        self.cache
            .set_date_images(key, date, images.timestamps.clone(), images.urls.clone())
            .await;
        images
    }

    /// Days with photos. Not cached; failures give an empty list.
    pub async fn get_available_dates(&self, key: &CameraKey) -> Vec<CalendarDate> {
        self.metrics.backend_request();
        let response = match self.backend.available_dates(key).await {
            Ok(response) => response,
            Err(e) => {
                self.metrics.backend_failure();
                warn!(camera = %key, error = %e, "Failed to fetch available dates");
                return Vec::new();
            }
        };

        response
            .available_dates
            .iter()
            .filter_map(|raw| {
                let parsed = parse_iso_date(raw);
                if parsed.is_none() {
                    warn!(camera = %key, raw = %raw, "Skipping unparsable available date");
                }
                parsed
            })
            .collect()
    }

    /// `None` on backend failure, otherwise the merged (possibly empty) set.
    async fn fetch_date(&self, key: &CameraKey, date: CalendarDate) -> Option<DateImages> {
        self.metrics.backend_request();
        let response = match self.backend.list_pictures(key, &PicturesQuery::for_date(date)).await {
            Ok(response) => response,
            Err(e) => {
                self.metrics.backend_failure();
                warn!(camera = %key, %date, error = %e, "Failed to fetch photos for date");
                return None;
            }
        };

        let timestamps = merge_photos(response.date1_photos, response.date2_photos);
        let urls = timestamps
            .iter()
            .map(|timestamp| self.image_url(key, timestamp))
            .collect();

        debug!(camera = %key, %date, photos = timestamps.len(), "Fetched photos for date");
        Some(DateImages { timestamps, urls })
    }

    async fn latest_as_fallback(&self, key: &CameraKey) -> DateImages {
        match self.get_last_photo(key).await {
            Some(timestamp) => DateImages {
                urls: vec![self.image_url(key, &timestamp)],
                timestamps: vec![timestamp],
            },
            None => DateImages::default(),
        }
    }
}
