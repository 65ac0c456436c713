use crate::backend::api_root;
use crate::model::{CameraKey, PhotoTimestamp};

/// Proxy URL for one photo.
///
/// `{base}/api/camerapics-s3-test/proxy/{site}/{project}/{camera}/{timestamp}`.
/// Tags and timestamp are inserted verbatim. Images always go through the
/// backend proxy, never straight to object storage.
pub fn image_url(base_url: &str, key: &CameraKey, timestamp: &PhotoTimestamp) -> String {
    format!(
        "{}/proxy/{}/{}/{}/{}",
        api_root(base_url),
        key.site(),
        key.project(),
        key.camera(),
        timestamp.as_str()
    )
}
