//! Core domain types shared by the cache, retrieval and preload layers.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Calendar day used for date-scoped browsing.
pub type CalendarDate = NaiveDate;

/// Wire format of a photo timestamp (`YYYYMMDDHHMMSS`).
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Width of a well-formed photo timestamp
pub const TIMESTAMP_LEN: usize = 14;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("site tag must not be empty")]
    EmptySite,
    #[error("project tag must not be empty")]
    EmptyProject,
    #[error("camera tag must not be empty")]
    EmptyCamera,
}

/// Composite identifier of one camera: `(site, project, camera)`.
///
/// Tags are case-sensitive and kept exactly as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CameraKey {
    site: String,
    project: String,
    camera: String,
}

impl CameraKey {
    pub fn new(
        site: impl Into<String>,
        project: impl Into<String>,
        camera: impl Into<String>,
    ) -> Result<Self, KeyError> {
        let site = site.into();
        let project = project.into();
        let camera = camera.into();

        if site.trim().is_empty() {
            return Err(KeyError::EmptySite);
        }
        if project.trim().is_empty() {
            return Err(KeyError::EmptyProject);
        }
        if camera.trim().is_empty() {
            return Err(KeyError::EmptyCamera);
        }

        Ok(Self {
            site,
            project,
            camera,
        })
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn camera(&self) -> &str {
        &self.camera
    }
}

impl fmt::Display for CameraKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.site, self.project, self.camera)
    }
}

/// Backend-issued photo identifier.
///
/// Ordering is plain string ordering. That matches chronological order only
/// because well-formed timestamps are fixed-width and zero-padded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoTimestamp(String);

impl PhotoTimestamp {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exactly 14 ASCII digits
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == TIMESTAMP_LEN && self.0.bytes().all(|b| b.is_ascii_digit())
    }

    /// Wall-clock instant of the capture, if the digits form a valid date and time.
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        if !self.is_well_formed() {
            return None;
        }
        NaiveDateTime::parse_from_str(&self.0, TIMESTAMP_FORMAT).ok()
    }
}

impl fmt::Display for PhotoTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PhotoTimestamp {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for PhotoTimestamp {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Derived liveness of a camera. Never stored, always recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraStatus {
    Online,
    Offline,
    Stopped,
    Removed,
}

impl CameraStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CameraStatus::Online => "online",
            CameraStatus::Offline => "offline",
            CameraStatus::Stopped => "stopped",
            CameraStatus::Removed => "removed",
        }
    }
}

impl fmt::Display for CameraStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `YYYYMMDD`, the form the pictures endpoint expects for `date1`/`date2`.
pub fn compact_date(date: CalendarDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Parse a `YYYY-MM-DD` date as returned by the available-dates endpoint.
pub fn parse_iso_date(value: &str) -> Option<CalendarDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}
