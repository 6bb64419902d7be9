use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::{
    config::Config,
    error::ProviderError,
    model::{Coordinate, GeocodeMatch},
    provider::{Geocoder, ProviderId, http::HttpClient},
};

/// OpenStreetMap Nominatim geocoder.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    http: HttpClient,
}

impl NominatimClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let id = ProviderId::Nominatim;
        let http = HttpClient::new(id, &config.provider_settings(id), &config.user_agent_header())?;
        Ok(Self::new(http))
    }
}

/// Nominatim sends coordinates as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: Option<String>,
}

impl NominatimPlace {
    fn into_match(self) -> Result<GeocodeMatch, ProviderError> {
        let id = ProviderId::Nominatim;
        let latitude: f64 = self
            .lat
            .trim()
            .parse()
            .map_err(|_| ProviderError::shape(id, format!("bad latitude '{}'", self.lat)))?;
        let longitude: f64 = self
            .lon
            .trim()
            .parse()
            .map_err(|_| ProviderError::shape(id, format!("bad longitude '{}'", self.lon)))?;
        let coordinate =
            Coordinate::new(latitude, longitude).map_err(|e| ProviderError::shape(id, e.to_string()))?;

        Ok(GeocodeMatch { coordinate, display_name: self.display_name })
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeMatch>, ProviderError> {
        let places: Vec<NominatimPlace> = self
            .http
            .get_json(
                &self.http.endpoint("search"),
                &[
                    ("q", query.to_string()),
                    ("format", "json".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;

        debug!(query, matches = places.len(), "geocoded");
        places.into_iter().map(NominatimPlace::into_match).collect()
    }
}
