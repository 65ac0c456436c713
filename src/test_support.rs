//! In-memory backend and loader doubles shared by unit tests

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::backend::{
    AvailableDatesResponse, BackendError, PhotoBackend, PicturesQuery, PicturesResponse,
};
use crate::cache::CacheStore;
use crate::clock::ManualClock;
use crate::config::CacheConfig;
use crate::model::CameraKey;
use crate::preload::{ImageLoader, LoadError};
use crate::retrieval::ImageRetriever;

pub const BASE_URL: &str = "http://cams.test";

pub fn key(camera: &str) -> CameraKey {
    CameraKey::new("site", "proj", camera).unwrap()
}

/// 2024-03-15 12:00:00
pub fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 15)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

#[derive(Default)]
pub struct MockBackend {
    latest: Mutex<HashMap<CameraKey, String>>,
    by_date: Mutex<HashMap<(CameraKey, String), (Vec<String>, Vec<String>)>>,
    dates: Mutex<HashMap<CameraKey, Vec<String>>>,
    failing: AtomicBool,
    picture_calls: AtomicUsize,
    date_calls: AtomicUsize,
    queries: Mutex<Vec<(CameraKey, PicturesQuery)>>,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_latest(&self, key: &CameraKey, timestamp: &str) {
        self.latest
            .lock()
            .unwrap()
            .insert(key.clone(), timestamp.to_string());
    }

    /// `compact` is the `YYYYMMDD` day sent as date1/date2
    pub fn set_day(&self, key: &CameraKey, compact: &str, date1: &[&str], date2: &[&str]) {
        let to_vec = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        self.by_date
            .lock()
            .unwrap()
            .insert((key.clone(), compact.to_string()), (to_vec(date1), to_vec(date2)));
    }

    pub fn set_available(&self, key: &CameraKey, dates: &[&str]) {
        self.dates
            .lock()
            .unwrap()
            .insert(key.clone(), dates.iter().map(|s| s.to_string()).collect());
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn picture_calls(&self) -> usize {
        self.picture_calls.load(Ordering::SeqCst)
    }

    pub fn date_calls(&self) -> usize {
        self.date_calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<(CameraKey, PicturesQuery)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl PhotoBackend for MockBackend {
    async fn list_pictures(
        &self,
        key: &CameraKey,
        query: &PicturesQuery,
    ) -> Result<PicturesResponse, BackendError> {
        self.picture_calls.fetch_add(1, Ordering::SeqCst);
        self.queries
            .lock()
            .unwrap()
            .push((key.clone(), query.clone()));
        if self.failing.load(Ordering::SeqCst) {
            return Err(BackendError::RequestFailed("connection refused".to_string()));
        }

        let last_photo = self.latest.lock().unwrap().get(key).cloned();
        let (date1_photos, date2_photos) = match &query.date1 {
            Some(day) => self
                .by_date
                .lock()
                .unwrap()
                .get(&(key.clone(), day.clone()))
                .cloned()
                .unwrap_or_default(),
            None => (Vec::new(), Vec::new()),
        };

        Ok(PicturesResponse {
            first_photo: None,
            last_photo,
            date1_photos,
            date2_photos,
            path: None,
        })
    }

    async fn available_dates(
        &self,
        key: &CameraKey,
    ) -> Result<AvailableDatesResponse, BackendError> {
        self.date_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(BackendError::Timeout);
        }

        let available_dates = self.dates.lock().unwrap().get(key).cloned().unwrap_or_default();
        Ok(AvailableDatesResponse {
            count: available_dates.len(),
            first_date: available_dates.first().cloned(),
            last_date: available_dates.last().cloned(),
            available_dates,
        })
    }
}

pub fn retriever(backend: Arc<MockBackend>) -> (Arc<ImageRetriever>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(noon()));
    let cache = Arc::new(CacheStore::new(clock.clone(), &CacheConfig::default()));
    let retriever = ImageRetriever::new(backend, cache, clock.clone(), BASE_URL);
    (Arc::new(retriever), clock)
}

/// Loader that records URLs, fails those containing `fail`, and holds
/// gated URLs until [`RecordingLoader::open_gate`] is called.
#[derive(Default)]
pub struct RecordingLoader {
    pub seen: Mutex<Vec<String>>,
    gated: Mutex<HashSet<String>>,
    gate: Notify,
    gate_open: AtomicBool,
}

impl RecordingLoader {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn gate(&self, url: impl Into<String>) {
        self.gated.lock().unwrap().insert(url.into());
    }

    pub fn open_gate(&self) {
        self.gate_open.store(true, Ordering::SeqCst);
        self.gate.notify_waiters();
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageLoader for RecordingLoader {
    async fn load(&self, url: &str) -> Result<(), LoadError> {
        self.seen.lock().unwrap().push(url.to_string());

        let gated = self.gated.lock().unwrap().contains(url);
        if gated {
            let notified = self.gate.notified();
            if !self.gate_open.load(Ordering::SeqCst) {
                notified.await;
            }
        }

        if url.contains("fail") {
            return Err(LoadError::Status(404));
        }
        Ok(())
    }
}
