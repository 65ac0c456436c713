//! Progressive image preloading
//!
//! [`PreloadScheduler`] fetches a day's photos in small paced batches and
//! warms the neighbouring days in the background. The actual byte transfer
//! goes through an [`ImageLoader`].

mod loader;
mod scheduler;

pub use loader::{HttpImageLoader, ImageLoader, LoadError};
pub use scheduler::{AdjacentWarmup, DateSelection, PreloadHandle, PreloadScheduler};
