//! Record validation.
//!
//! The same rules guard the HTTP boundary (untyped JSON bodies) and the edit
//! session (typed records). Collection checks stop at the first offending row,
//! and within a row fields are checked coordinates first, then threshold, name
//! and horizon.

use serde_json::Value;
use thiserror::Error;

use crate::models::Location;

pub const MIN_NAME_LEN: usize = 2;
pub const MIN_DAYS_AHEAD: u64 = 1;
pub const MAX_DAYS_AHEAD: u64 = 5;

/// The part of a record a validation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// The request body as a whole
    Body,
    /// A collection element that is not a record at all
    Row,
    Name,
    Lat,
    Lon,
    Threshold,
    DaysAhead,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Body => "body",
            Field::Row => "row",
            Field::Name => "name",
            Field::Lat => "lat",
            Field::Lon => "lon",
            Field::Threshold => "threshold",
            Field::DaysAhead => "daysAhead",
        }
    }
}

/// A record (or the body holding it) violates an invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{}", row_prefix(.index), .reason)]
pub struct ValidationError {
    /// Position in the collection, when the record came from one
    pub index: Option<usize>,
    pub field: Field,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: Field, reason: impl Into<String>) -> Self {
        Self {
            index: None,
            field,
            reason: reason.into(),
        }
    }

    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

fn row_prefix(index: &Option<usize>) -> String {
    index.map(|i| format!("Row {}: ", i)).unwrap_or_default()
}

pub(crate) fn check_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().chars().count() < MIN_NAME_LEN {
        return Err(ValidationError::new(
            Field::Name,
            format!("Name must be at least {} characters", MIN_NAME_LEN),
        ));
    }
    Ok(())
}

pub(crate) fn check_lat(lat: f64) -> Result<(), ValidationError> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(ValidationError::new(
            Field::Lat,
            "Latitude must be between -90 and 90",
        ));
    }
    Ok(())
}

pub(crate) fn check_lon(lon: f64) -> Result<(), ValidationError> {
    if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
        return Err(ValidationError::new(
            Field::Lon,
            "Longitude must be between -180 and 180",
        ));
    }
    Ok(())
}

pub(crate) fn check_threshold(threshold: f64) -> Result<(), ValidationError> {
    if !threshold.is_finite() {
        return Err(ValidationError::new(
            Field::Threshold,
            "Threshold must be a finite number",
        ));
    }
    Ok(())
}

pub(crate) fn days_ahead_error() -> ValidationError {
    ValidationError::new(
        Field::DaysAhead,
        format!(
            "Days ahead must be an integer between {} and {}",
            MIN_DAYS_AHEAD, MAX_DAYS_AHEAD
        ),
    )
}

fn check_days_ahead(days: Option<u64>) -> Result<(), ValidationError> {
    match days {
        Some(d) if !(MIN_DAYS_AHEAD..=MAX_DAYS_AHEAD).contains(&d) => Err(days_ahead_error()),
        _ => Ok(()),
    }
}

/// Check a single typed record.
pub fn check_location(location: &Location) -> Result<(), ValidationError> {
    check_lat(location.lat)?;
    check_lon(location.lon)?;
    check_threshold(location.threshold)?;
    check_name(&location.name)?;
    check_days_ahead(location.days_ahead.map(u64::from))
}

/// Check a typed collection, failing on the first invalid row.
pub fn validate_locations(rows: &[Location]) -> Result<(), ValidationError> {
    for (index, row) in rows.iter().enumerate() {
        check_location(row).map_err(|e| e.at(index))?;
    }
    Ok(())
}

/// Validate an untyped candidate collection and convert it into records.
///
/// Fails fast: only the first offending row is reported.
pub fn validate(candidate: &Value) -> Result<Vec<Location>, ValidationError> {
    let items = candidate
        .as_array()
        .ok_or_else(|| ValidationError::new(Field::Body, "Body must be an array"))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| location_from_value(item).map_err(|e| e.at(index)))
        .collect()
}

fn location_from_value(value: &Value) -> Result<Location, ValidationError> {
    let obj = value
        .as_object()
        .ok_or_else(|| ValidationError::new(Field::Row, "must be an object"))?;

    let lat = number_field(obj.get("lat"), Field::Lat, "Latitude must be a number")?;
    check_lat(lat)?;
    let lon = number_field(obj.get("lon"), Field::Lon, "Longitude must be a number")?;
    check_lon(lon)?;
    let threshold = number_field(
        obj.get("threshold"),
        Field::Threshold,
        "Threshold must be a finite number",
    )?;
    check_threshold(threshold)?;

    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| ValidationError::new(Field::Name, "Name must be a string"))?;
    check_name(name)?;

    let days_ahead = match obj.get("daysAhead") {
        None | Some(Value::Null) => None,
        Some(v) => {
            let days = v
                .as_f64()
                .filter(|d| d.fract() == 0.0 && *d >= 0.0)
                .ok_or_else(days_ahead_error)?;
            check_days_ahead(Some(days as u64))?;
            // range-checked above
            Some(days as u8)
        }
    };

    Ok(Location {
        name: name.to_string(),
        lat,
        lon,
        threshold,
        days_ahead,
    })
}

fn number_field(
    value: Option<&Value>,
    field: Field,
    reason: &'static str,
) -> Result<f64, ValidationError> {
    value
        .and_then(Value::as_f64)
        .ok_or_else(|| ValidationError::new(field, reason))
}
