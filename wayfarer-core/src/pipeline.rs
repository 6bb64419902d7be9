use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;

use crate::{
    config::Config,
    error::ResolutionError,
    flights::FlightResolver,
    location::LocationResolver,
    model::ResolvedLocation,
    provider::{
        FlightSearch, ForecastStrategy, ip_api::IpApiClient, nominatim::NominatimClient,
        nws::NwsClient, open_meteo::OpenMeteoClient, serpapi::SerpApiClient,
    },
    weather::WeatherResolver,
};

/// All resolvers, wired to the real providers.
#[derive(Debug, Clone)]
pub struct Pipeline {
    location: LocationResolver,
    weather: WeatherResolver,
    flights: FlightResolver,
}

impl Pipeline {
    pub fn new(location: LocationResolver, weather: WeatherResolver, flights: FlightResolver) -> Self {
        Self { location, weather, flights }
    }

    /// NWS first, Open-Meteo as fallback. NWS also serves alerts.
    pub fn from_config(config: &Config) -> Result<Self> {
        let location = LocationResolver::new(
            Arc::new(NominatimClient::from_config(config)?),
            Arc::new(IpApiClient::from_config(config)?),
        );

        let nws = Arc::new(NwsClient::from_config(config)?);
        let strategies: Vec<Arc<dyn ForecastStrategy>> =
            vec![nws.clone(), Arc::new(OpenMeteoClient::from_config(config)?)];
        let weather = WeatherResolver::new(strategies, nws);

        let search = SerpApiClient::from_config(config)?
            .map(|client| Arc::new(client) as Arc<dyn FlightSearch>);
        let flights = FlightResolver::new(search, config.flights.max_results);

        Ok(Self::new(location, weather, flights))
    }

    pub async fn resolve(
        &self,
        explicit: Option<(f64, f64)>,
        place: Option<&str>,
    ) -> Result<ResolvedLocation, ResolutionError> {
        self.location.resolve(explicit, place).await
    }

    /// Resolve a location, then forecast there.
    pub async fn forecast_for(&self, explicit: Option<(f64, f64)>, place: Option<&str>) -> String {
        match self.resolve(explicit, place).await {
            Ok(location) => self.weather.forecast(location.coordinate).await,
            Err(e) => e.user_message(),
        }
    }

    pub async fn alerts(&self, state: &str) -> String {
        self.weather.alerts(state).await
    }

    pub async fn flights(&self, origin: &str, destination: &str, date: Option<NaiveDate>) -> String {
        self.flights.flights(origin, destination, date).await
    }

    pub async fn geocode(&self, place: &str) -> String {
        self.location.geocode(place).await
    }

    pub async fn current_location(&self) -> String {
        self.location.current_location().await
    }

    pub fn location(&self) -> &LocationResolver {
        &self.location
    }

    pub fn weather(&self) -> &WeatherResolver {
        &self.weather
    }

    pub fn flight_resolver(&self) -> &FlightResolver {
        &self.flights
    }
}
