//! In-memory expiring cache for last-known photos and per-date photo sets

mod store;

pub use store::{CacheStats, CacheStore, DateImagesEntry, LastPhotoEntry};
