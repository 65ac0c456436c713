use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::config::CacheConfig;
use crate::model::{CalendarDate, CameraKey, PhotoTimestamp};

/// Most recent photo known for one camera
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastPhotoEntry {
    pub key: CameraKey,
    pub timestamp: PhotoTimestamp,
    pub cached_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

/// Photo set for one camera on one calendar day.
///
/// `timestamps[i]` and `image_urls[i]` describe the same photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateImagesEntry {
    pub key: CameraKey,
    pub date: CalendarDate,
    pub timestamps: Vec<PhotoTimestamp>,
    pub image_urls: Vec<String>,
    pub cached_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub last_photo_entries: usize,
    pub date_image_entries: usize,
}

/// Two-namespace TTL cache with lazy eviction.
///
/// Entries are only ever inserted, replaced whole, or removed. Expired
/// entries are dropped when a read finds them; there is no sweeper.
pub struct CacheStore {
    last_photo: RwLock<HashMap<CameraKey, LastPhotoEntry>>,
    date_images: RwLock<HashMap<(CameraKey, CalendarDate), DateImagesEntry>>,
    clock: Arc<dyn Clock>,
    last_photo_ttl: Duration,
    date_images_ttl: Duration,
}

impl CacheStore {
    pub fn new(clock: Arc<dyn Clock>, config: &CacheConfig) -> Self {
        Self::with_ttls(
            clock,
            config.last_photo_ttl.as_duration(),
            config.date_images_ttl.as_duration(),
        )
    }

    pub fn with_ttls(
        clock: Arc<dyn Clock>,
        last_photo_ttl: Duration,
        date_images_ttl: Duration,
    ) -> Self {
        Self {
            last_photo: RwLock::new(HashMap::new()),
            date_images: RwLock::new(HashMap::new()),
            clock,
            last_photo_ttl,
            date_images_ttl,
        }
    }

    pub async fn get_last_photo(&self, key: &CameraKey) -> Option<PhotoTimestamp> {
        let now = self.clock.now();
        // Write lock so an expired entry can be evicted in place.
        let mut guard = self.last_photo.write().await;
        let entry = guard.get(key)?;
        if now > entry.expires_at {
            guard.remove(key);
            debug!(camera = %key, "Evicted expired last-photo entry");
            return None;
        }
        Some(entry.timestamp.clone())
    }

    pub async fn set_last_photo(&self, key: &CameraKey, timestamp: PhotoTimestamp) {
        let now = self.clock.now();
        let entry = LastPhotoEntry {
            key: key.clone(),
            timestamp,
            cached_at: now,
            expires_at: expiry(now, self.last_photo_ttl),
        };
        self.last_photo.write().await.insert(key.clone(), entry);
    }

    pub async fn get_date_images(
        &self,
        key: &CameraKey,
        date: CalendarDate,
    ) -> Option<DateImagesEntry> {
        let now = self.clock.now();
        let scoped_key = (key.clone(), date);
        let mut guard = self.date_images.write().await;
        let entry = guard.get(&scoped_key)?;
        if now > entry.expires_at {
            guard.remove(&scoped_key);
            debug!(camera = %key, %date, "Evicted expired date-images entry");
            return None;
        }
        Some(entry.clone())
    }

    /// Store a day's photo set. Returns `false` (and stores nothing) when the
    /// two lists are not the same length.
    pub async fn set_date_images(
        &self,
        key: &CameraKey,
        date: CalendarDate,
        timestamps: Vec<PhotoTimestamp>,
        image_urls: Vec<String>,
    ) -> bool {
        if timestamps.len() != image_urls.len() {
            warn!(
                camera = %key,
                %date,
                timestamps = timestamps.len(),
                urls = image_urls.len(),
                "Refusing to cache misaligned photo set"
            );
            return false;
        }

        let now = self.clock.now();
        let entry = DateImagesEntry {
            key: key.clone(),
            date,
            timestamps,
            image_urls,
            cached_at: now,
            expires_at: expiry(now, self.date_images_ttl),
        };
        self.date_images
            .write()
            .await
            .insert((key.clone(), date), entry);
        true
    }

    pub async fn clear_all(&self) {
        self.last_photo.write().await.clear();
        self.date_images.write().await.clear();
        debug!("Cleared all cache entries");
    }

    /// Drop everything cached for one camera, in both namespaces
    pub async fn clear(&self, key: &CameraKey) {
        self.last_photo.write().await.remove(key);
        self.date_images
            .write()
            .await
            .retain(|(camera, _), _| camera != key);
    }

    pub async fn clear_date(&self, key: &CameraKey, date: CalendarDate) {
        self.date_images
            .write()
            .await
            .remove(&(key.clone(), date));
    }

    /// Raw entry counts, expired-but-unread entries included
    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            last_photo_entries: self.last_photo.read().await.len(),
            date_image_entries: self.date_images.read().await.len(),
        }
    }
}

fn expiry(now: NaiveDateTime, ttl: Duration) -> NaiveDateTime {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(NaiveDateTime::MAX)
}
