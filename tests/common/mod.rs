//! Mock camera backend served by axum on a random local port

#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sitecam::CameraKey;
use sitecam::backend::{HttpBackend, HttpConfig};
use sitecam::cache::CacheStore;
use sitecam::clock::ManualClock;
use sitecam::config::CacheConfig;
use sitecam::retrieval::ImageRetriever;

pub const SITE: &str = "northyard";
pub const PROJECT: &str = "tower-b";

/// Camera that answers every request with HTTP 500
pub const BROKEN_CAMERA: &str = "broken";
/// Camera whose answers arrive after the client has given up
pub const SLOW_CAMERA: &str = "slow";

#[derive(Default)]
pub struct MockState {
    pub picture_calls: AtomicUsize,
    pub date_calls: AtomicUsize,
    pub image_calls: AtomicUsize,
    pub bodies: Mutex<Vec<Value>>,
}

pub struct MockServer {
    pub base_url: String,
    pub state: Arc<MockState>,
}

impl MockServer {
    pub fn picture_calls(&self) -> usize {
        self.state.picture_calls.load(Ordering::SeqCst)
    }

    pub fn date_calls(&self) -> usize {
        self.state.date_calls.load(Ordering::SeqCst)
    }

    pub fn image_calls(&self) -> usize {
        self.state.image_calls.load(Ordering::SeqCst)
    }

    pub fn bodies(&self) -> Vec<Value> {
        self.state.bodies.lock().unwrap().clone()
    }
}

pub fn camera(name: &str) -> CameraKey {
    CameraKey::new(SITE, PROJECT, name).unwrap()
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

/// Photos per compact day for `cam1`; the two lists overlap on purpose.
fn photos_for(day: &str) -> (Vec<&'static str>, Vec<&'static str>) {
    match day {
        "20240310" => (
            vec!["20240310080000", "20240310120000"],
            vec!["20240310120000", "20240310170000"],
        ),
        "20240315" => (vec!["20240315090000", "20240315113000"], vec![]),
        _ => (vec![], vec![]),
    }
}

async fn pictures(
    State(state): State<Arc<MockState>>,
    Path((_site, _project, camera)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.picture_calls.fetch_add(1, Ordering::SeqCst);
    state.bodies.lock().unwrap().push(body.clone());

    match camera.as_str() {
        BROKEN_CAMERA => return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))),
        SLOW_CAMERA => tokio::time::sleep(Duration::from_secs(3)).await,
        "empty" => {
            return (
                StatusCode::OK,
                Json(json!({
                    "firstPhoto": null,
                    "lastPhoto": null,
                    "date1Photos": [],
                    "date2Photos": [],
                })),
            );
        }
        _ => {}
    }

    let (date1, date2) = body
        .get("date1")
        .and_then(Value::as_str)
        .map(photos_for)
        .unwrap_or_default();

    (
        StatusCode::OK,
        Json(json!({
            "firstPhoto": "20230601070000",
            "lastPhoto": "20240315113000",
            "date1Photos": date1,
            "date2Photos": date2,
            "path": format!("{}/{}/{}", SITE, PROJECT, camera),
        })),
    )
}

async fn available_dates(
    State(state): State<Arc<MockState>>,
    Path((_site, _project, camera)): Path<(String, String, String)>,
) -> impl IntoResponse {
    state.date_calls.fetch_add(1, Ordering::SeqCst);

    if camera == BROKEN_CAMERA {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({})));
    }

    (
        StatusCode::OK,
        Json(json!({
            "availableDates": ["2024-03-10", "2024-03-14", "2024-03-15"],
            "count": 3,
            "firstDate": "2024-03-10",
            "lastDate": "2024-03-15",
        })),
    )
}

async fn proxy_image(
    State(state): State<Arc<MockState>>,
    Path((_site, _project, _camera, timestamp)): Path<(String, String, String, String)>,
) -> impl IntoResponse {
    state.image_calls.fetch_add(1, Ordering::SeqCst);

    if timestamp.starts_with("missing") {
        return (StatusCode::NOT_FOUND, Vec::new());
    }
    (StatusCode::OK, vec![0xFF, 0xD8, 0xFF, 0xE0])
}

/// Start the mock backend and return its base URL
pub async fn start_mock_server() -> MockServer {
    let state = Arc::new(MockState::default());

    let app = Router::new()
        .route(
            "/api/camerapics-s3-test/{site}/{project}/{camera}/pictures/",
            post(pictures),
        )
        .route(
            "/api/camerapics-s3-test/{site}/{project}/{camera}/available-dates",
            get(available_dates),
        )
        .route(
            "/api/camerapics-s3-test/proxy/{site}/{project}/{camera}/{timestamp}",
            get(proxy_image),
        )
        .with_state(state.clone());

    // Bind to random available port
    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let bound_addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockServer {
        base_url: format!("http://{}", bound_addr),
        state,
    }
}

pub fn http_backend(base_url: &str) -> HttpBackend {
    HttpBackend::new(HttpConfig {
        base_url: base_url.to_string(),
        request_timeout: Duration::from_secs(1),
        ..HttpConfig::default()
    })
    .unwrap()
}

/// Retriever over the real HTTP client with a clock pinned to [`noon`]
pub fn http_retriever(base_url: &str) -> (Arc<ImageRetriever>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(noon()));
    let cache = Arc::new(CacheStore::new(clock.clone(), &CacheConfig::default()));
    let retriever = ImageRetriever::new(
        Arc::new(http_backend(base_url)),
        cache,
        clock.clone(),
        base_url,
    );
    (Arc::new(retriever), clock)
}
