//! Edit form input.

use crate::models::Location;
use crate::validation::{self, Field, ValidationError};

/// Field values as an operator typed them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationForm {
    pub name: String,
    pub lat: String,
    pub lon: String,
    pub threshold: String,
    /// Empty means no horizon
    pub days_ahead: String,
}

impl LocationForm {
    pub fn from_location(location: &Location) -> Self {
        Self {
            name: location.name.clone(),
            lat: location.lat.to_string(),
            lon: location.lon.to_string(),
            threshold: location.threshold.to_string(),
            days_ahead: location
                .days_ahead
                .map(|d| d.to_string())
                .unwrap_or_default(),
        }
    }

    /// Parse into a record, reporting the first offending field in the order
    /// [`validation::check_location`] uses.
    pub fn parse(&self) -> Result<Location, ValidationError> {
        let lat = parse_number(&self.lat, Field::Lat, "Latitude must be a number")?;
        validation::check_lat(lat)?;
        let lon = parse_number(&self.lon, Field::Lon, "Longitude must be a number")?;
        validation::check_lon(lon)?;
        let threshold = parse_number(
            &self.threshold,
            Field::Threshold,
            "Threshold must be a number",
        )?;
        validation::check_threshold(threshold)?;

        let name = self.name.trim().to_string();
        validation::check_name(&name)?;

        let days_ahead = match self.days_ahead.trim() {
            "" => None,
            text => Some(
                text.parse::<u8>()
                    .map_err(|_| validation::days_ahead_error())?,
            ),
        };

        let location = Location {
            name,
            lat,
            lon,
            threshold,
            days_ahead,
        };
        validation::check_location(&location)?;
        Ok(location)
    }
}

fn parse_number(text: &str, field: Field, reason: &str) -> Result<f64, ValidationError> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| ValidationError::new(field, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, lat: &str, lon: &str, threshold: &str) -> LocationForm {
        LocationForm {
            name: name.to_string(),
            lat: lat.to_string(),
            lon: lon.to_string(),
            threshold: threshold.to_string(),
            days_ahead: String::new(),
        }
    }

    #[test]
    fn test_parse_trims_name() {
        let loc = form("  Berlin ", "52.5", " 13.4", "30").parse().unwrap();
        assert_eq!(loc, Location::new("Berlin", 52.5, 13.4, 30.0));
    }

    #[test]
    fn test_parse_days_ahead() {
        let mut f = form("Berlin", "52.5", "13.4", "30");
        f.days_ahead = "3".to_string();
        assert_eq!(f.parse().unwrap().days_ahead, Some(3));

        f.days_ahead = "6".to_string();
        assert_eq!(f.parse().unwrap_err().field, Field::DaysAhead);

        f.days_ahead = "two".to_string();
        assert_eq!(f.parse().unwrap_err().field, Field::DaysAhead);
    }

    #[test]
    fn test_parse_reports_first_offending_field() {
        assert_eq!(form("B", "abc", "0", "1").parse().unwrap_err().field, Field::Lat);
        assert_eq!(form("B", "1", "0", "1").parse().unwrap_err().field, Field::Name);
        assert_eq!(form("Bo", "abc", "0", "1").parse().unwrap_err().field, Field::Lat);
        assert_eq!(form("Bo", "100", "0", "1").parse().unwrap_err().field, Field::Lat);
        assert_eq!(form("Bo", "10", "", "1").parse().unwrap_err().field, Field::Lon);
        assert_eq!(form("Bo", "10", "0", "NaN").parse().unwrap_err().field, Field::Threshold);
    }

    #[test]
    fn test_form_from_location() {
        let loc = Location::new("Oslo", 59.9, 10.75, -2.0).with_days_ahead(2);
        let f = LocationForm::from_location(&loc);
        assert_eq!(f.threshold, "-2");
        assert_eq!(f.days_ahead, "2");
        assert_eq!(f.parse().unwrap(), loc);
    }
}
