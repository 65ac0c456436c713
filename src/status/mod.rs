//! Camera liveness derived from the age of its most recent photo

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::model::{CameraStatus, TIMESTAMP_FORMAT, TIMESTAMP_LEN};

/// Below this age a camera is online
pub const ONLINE_WINDOW_HOURS: i64 = 2;
/// From this age on a camera is considered stopped
pub const STOPPED_AFTER_DAYS: i64 = 5;

/// Classify a camera from its latest photo timestamp.
///
/// - missing or shorter than `YYYYMMDDHHMMSS` → `Removed`
/// - younger than 2 hours (including timestamps ahead of `now`) → `Online`
/// - younger than 5 days → `Offline`
/// - otherwise, or when the digits do not form a valid date → `Stopped`
///
/// Characters past the 14th are ignored.
pub fn classify(timestamp: Option<&str>, now: NaiveDateTime) -> CameraStatus {
    let Some(raw) = timestamp else {
        return CameraStatus::Removed;
    };
    if raw.len() < TIMESTAMP_LEN {
        return CameraStatus::Removed;
    }

    let Some(captured) = raw
        .get(..TIMESTAMP_LEN)
        .filter(|digits| digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| NaiveDateTime::parse_from_str(digits, TIMESTAMP_FORMAT).ok())
    else {
        return CameraStatus::Stopped;
    };

    let elapsed = now - captured;
    if elapsed < Duration::hours(ONLINE_WINDOW_HOURS) {
        CameraStatus::Online
    } else if elapsed < Duration::days(STOPPED_AFTER_DAYS) {
        CameraStatus::Offline
    } else {
        CameraStatus::Stopped
    }
}

/// Per-status camera counts for a dashboard header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub online: usize,
    pub offline: usize,
    pub stopped: usize,
    pub removed: usize,
}

impl StatusSummary {
    pub fn record(&mut self, status: CameraStatus) {
        match status {
            CameraStatus::Online => self.online += 1,
            CameraStatus::Offline => self.offline += 1,
            CameraStatus::Stopped => self.stopped += 1,
            CameraStatus::Removed => self.removed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.online + self.offline + self.stopped + self.removed
    }

    /// Cameras that need someone to look at them
    pub fn needs_attention(&self) -> usize {
        self.offline + self.stopped
    }
}

impl FromIterator<CameraStatus> for StatusSummary {
    fn from_iter<I: IntoIterator<Item = CameraStatus>>(iter: I) -> Self {
        let mut summary = StatusSummary::default();
        for status in iter {
            summary.record(status);
        }
        summary
    }
}
