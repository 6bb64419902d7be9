use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug};

use crate::{
    error::ProviderError,
    model::{AlertFeed, Coordinate, FlightOption, FlightQuery, GeocodeMatch, IpLocation},
};

pub mod http;
pub mod ip_api;
pub mod nominatim;
pub mod nws;
pub mod open_meteo;
pub mod serpapi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Nominatim,
    Nws,
    OpenMeteo,
    IpApi,
    SerpApi,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Nominatim => "nominatim",
            ProviderId::Nws => "nws",
            ProviderId::OpenMeteo => "open_meteo",
            ProviderId::IpApi => "ip_api",
            ProviderId::SerpApi => "serpapi",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[
            ProviderId::Nominatim,
            ProviderId::Nws,
            ProviderId::OpenMeteo,
            ProviderId::IpApi,
            ProviderId::SerpApi,
        ]
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderId::Nominatim => "https://nominatim.openstreetmap.org",
            ProviderId::Nws => "https://api.weather.gov",
            ProviderId::OpenMeteo => "https://api.open-meteo.com/v1",
            ProviderId::IpApi => "http://ip-api.com",
            ProviderId::SerpApi => "https://serpapi.com/search",
        }
    }

    /// Value of the `Accept` header sent to this provider.
    pub fn accept(&self) -> &'static str {
        match self {
            ProviderId::Nws => "application/geo+json",
            _ => "application/json",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase().replace('-', "_");

        match lower.as_str() {
            "nominatim" => Ok(ProviderId::Nominatim),
            "nws" => Ok(ProviderId::Nws),
            "open_meteo" | "openmeteo" => Ok(ProviderId::OpenMeteo),
            "ip_api" | "ipapi" => Ok(ProviderId::IpApi),
            "serpapi" => Ok(ProviderId::SerpApi),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: nominatim, nws, open_meteo, ip_api, serpapi."
            )),
        }
    }
}

/// Free-text place name to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeMatch>, ProviderError>;
}

/// Caller's approximate location from their network origin.
#[async_trait]
pub trait IpLocator: Send + Sync + Debug {
    async fn locate(&self) -> Result<IpLocation, ProviderError>;
}

/// One step of the weather fallback chain: fetch and render a forecast.
#[async_trait]
pub trait ForecastStrategy: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    async fn forecast(&self, at: Coordinate) -> Result<String, ProviderError>;
}

#[async_trait]
pub trait AlertSource: Send + Sync + Debug {
    async fn active_alerts(&self, state: &str) -> Result<AlertFeed, ProviderError>;
}

#[async_trait]
pub trait FlightSearch: Send + Sync + Debug {
    async fn search(&self, query: &FlightQuery) -> Result<Vec<FlightOption>, ProviderError>;
}
