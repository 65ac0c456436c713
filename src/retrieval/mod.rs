//! Cache-backed photo lookup for cameras
//!
//! [`ImageRetriever`] answers the three questions the dashboard asks:
//! the latest photo of a camera, the photos of one day, and which days
//! have photos at all. URLs are synthesized with [`image_url`] and always
//! point at the backend image proxy.

mod orchestrator;
mod url;

pub use orchestrator::{DateImages, ImageRetriever, merge_photos};
pub use url::image_url;
