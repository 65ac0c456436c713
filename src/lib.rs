//! Camera imagery retrieval and caching for a construction-site dashboard.
//!
//! - [`cache::CacheStore`] keeps last-known photos and per-day photo sets with TTLs
//! - [`retrieval::ImageRetriever`] resolves photos cache-first with a backend fallback
//! - [`status::classify`] turns the age of a camera's latest photo into a status
//! - [`preload::PreloadScheduler`] warms image loading in paced batches

pub mod backend;
pub mod cache;
pub mod clock;
pub mod config;
pub mod humanize;
pub mod model;
pub mod observability;
pub mod preload;
pub mod retrieval;
pub mod state;
pub mod status;

#[cfg(test)]
mod test_support;

pub use model::{CalendarDate, CameraKey, CameraStatus, KeyError, PhotoTimestamp};
