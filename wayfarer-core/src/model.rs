use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::InvalidCoordinate;

/// A validated point on the globe. Can only be built through [`Coordinate::new`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinate> {
        if Self::is_valid(latitude, longitude) {
            Ok(Self { latitude, longitude })
        } else {
            Err(InvalidCoordinate { latitude, longitude })
        }
    }

    /// NaN and infinities fail the range checks.
    pub fn is_valid(latitude: f64, longitude: f64) -> bool {
        (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude)
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl TryFrom<(f64, f64)> for Coordinate {
    type Error = InvalidCoordinate;

    fn try_from((latitude, longitude): (f64, f64)) -> Result<Self, Self::Error> {
        Self::new(latitude, longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Which resolution path produced a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSource {
    Explicit,
    Geocoded,
    IpFallback,
}

impl LocationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationSource::Explicit => "explicit",
            LocationSource::Geocoded => "geocoded",
            LocationSource::IpFallback => "ip-fallback",
        }
    }
}

impl fmt::Display for LocationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub coordinate: Coordinate,
    pub display_name: String,
    pub source: LocationSource,
}

/// One geocoder hit.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeMatch {
    pub coordinate: Coordinate,
    pub display_name: Option<String>,
}

/// Approximate location of the caller, inferred from their IP address.
#[derive(Debug, Clone, PartialEq)]
pub struct IpLocation {
    pub city: String,
    pub region: Option<String>,
    pub country: Option<String>,
    pub coordinate: Coordinate,
}

impl IpLocation {
    pub fn display_name(&self) -> String {
        [Some(self.city.as_str()), self.region.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A single active weather alert. Every field may be missing in the raw feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertRecord {
    pub event: Option<String>,
    pub area_description: Option<String>,
    pub severity: Option<String>,
    pub description: Option<String>,
    pub instructions: Option<String>,
}

/// Result of an alerts query.
///
/// `features: None` means the feed had no feature collection at all, which is
/// not the same thing as an empty one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertFeed {
    pub features: Option<Vec<AlertRecord>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPeriod {
    pub name: String,
    pub temperature: f64,
    pub temperature_unit: String,
    pub wind_speed: String,
    pub wind_direction: String,
    pub detailed_forecast: String,
}

/// Current conditions from the secondary weather provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrentConditions {
    pub temperature_c: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub wind_direction_deg: Option<f64>,
    pub weather_code: Option<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyOutlook {
    pub date: String,
    pub high_c: Option<f64>,
    pub low_c: Option<f64>,
    pub weather_code: Option<u8>,
}

/// Forecast shape of the secondary provider: current conditions plus a few days.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyForecast {
    pub current: CurrentConditions,
    pub days: Vec<DailyOutlook>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Price {
    pub amount: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlightOption {
    pub carrier: String,
    pub flight_number: String,
    pub departure_time: NaiveDateTime,
    pub duration_minutes: u32,
    pub price: Option<Price>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightQuery {
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate,
}
