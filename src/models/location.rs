//! Watched location record.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Largest integer a JSON consumer can hold exactly in a double.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// One watched location.
///
/// Field order is the order written to the stored file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub name: String,
    #[serde(serialize_with = "serialize_number")]
    pub lat: f64,
    #[serde(serialize_with = "serialize_number")]
    pub lon: f64,
    /// Temperature alert threshold
    #[serde(serialize_with = "serialize_number")]
    pub threshold: f64,
    /// Forecast horizon in days (1..=5)
    #[serde(
        default,
        deserialize_with = "deserialize_days",
        skip_serializing_if = "Option::is_none"
    )]
    pub days_ahead: Option<u8>,
}

impl Location {
    /// JSON keys this record reads and writes.
    pub const FIELDS: [&'static str; 5] = ["name", "lat", "lon", "threshold", "daysAhead"];

    pub fn new(name: impl Into<String>, lat: f64, lon: f64, threshold: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
            threshold,
            days_ahead: None,
        }
    }

    pub fn with_days_ahead(mut self, days: u8) -> Self {
        self.days_ahead = Some(days);
        self
    }
}

/// Writes integral values without a fractional part (`13`, not `13.0`).
fn serialize_number<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// Accepts any integral JSON number in `u8` range, so `2.0` reads as `2`.
fn deserialize_days<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<f64>::deserialize(deserializer)? {
        None => Ok(None),
        Some(days) if days.fract() == 0.0 && (0.0..=f64::from(u8::MAX)).contains(&days) => {
            Ok(Some(days as u8))
        }
        Some(days) => Err(serde::de::Error::custom(format!(
            "daysAhead must be a small whole number, got {}",
            days
        ))),
    }
}
