//! Wire types for the camera pictures API

use serde::{Deserialize, Serialize};

use crate::model::{CalendarDate, compact_date};

/// Body of `POST .../pictures/`. Omitted dates mean "most recent".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PicturesQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date2: Option<String>,
}

impl PicturesQuery {
    pub fn latest() -> Self {
        Self::default()
    }

    /// Both bounds on the same day
    pub fn for_date(date: CalendarDate) -> Self {
        let day = compact_date(date);
        Self {
            date1: Some(day.clone()),
            date2: Some(day),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PicturesResponse {
    #[serde(default)]
    pub first_photo: Option<String>,
    #[serde(default)]
    pub last_photo: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub date1_photos: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub date2_photos: Vec<String>,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableDatesResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub available_dates: Vec<String>,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub first_date: Option<String>,
    #[serde(default)]
    pub last_date: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
