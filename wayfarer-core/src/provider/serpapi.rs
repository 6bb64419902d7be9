use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    config::Config,
    error::ProviderError,
    model::{FlightOption, FlightQuery, Price},
    provider::{FlightSearch, ProviderId, http::HttpClient},
};

const DEPARTURE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Google Flights results through SerpApi.
#[derive(Debug, Clone)]
pub struct SerpApiClient {
    http: HttpClient,
    api_key: String,
    currency: String,
}

impl SerpApiClient {
    pub fn new(http: HttpClient, api_key: String, currency: String) -> Self {
        Self { http, api_key, currency }
    }

    /// `None` when no API key is configured.
    pub fn from_config(config: &Config) -> anyhow::Result<Option<Self>> {
        let Some(api_key) = config.flight_api_key() else {
            return Ok(None);
        };

        let id = ProviderId::SerpApi;
        let http = HttpClient::new(id, &config.provider_settings(id), &config.user_agent_header())?;
        Ok(Some(Self::new(http, api_key.to_owned(), config.flights.currency.clone())))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    best_flights: Vec<Offer>,
    #[serde(default)]
    other_flights: Vec<Offer>,
    search_parameters: Option<SearchParameters>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchParameters {
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Offer {
    #[serde(default)]
    flights: Vec<Segment>,
    total_duration: Option<u32>,
    price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Segment {
    airline: Option<String>,
    flight_number: Option<String>,
    departure_airport: Option<Airport>,
    duration: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct Airport {
    time: Option<String>,
}

impl Offer {
    /// Built from the first segment; `None` without a parseable departure time.
    fn into_option(self, currency: &str) -> Option<FlightOption> {
        let duration_minutes = self
            .total_duration
            .unwrap_or_else(|| self.flights.iter().filter_map(|s| s.duration).sum());
        let first = self.flights.into_iter().next()?;

        let time = first.departure_airport.and_then(|a| a.time)?;
        let departure_time = match NaiveDateTime::parse_from_str(&time, DEPARTURE_FORMAT) {
            Ok(t) => t,
            Err(e) => {
                warn!(%time, error = %e, "dropping offer with unparseable departure time");
                return None;
            }
        };

        Some(FlightOption {
            carrier: first.airline.unwrap_or_else(|| "Unknown airline".to_string()),
            flight_number: first.flight_number.unwrap_or_default(),
            departure_time,
            duration_minutes,
            price: self.price.map(|amount| Price { amount, currency: currency.to_string() }),
        })
    }
}

impl SearchResponse {
    /// `other_flights` first, then `best_flights`, each in provider order.
    /// Departure-time ties later keep this order.
    fn into_options(self, requested_currency: &str) -> Result<Vec<FlightOption>, ProviderError> {
        let offers = self.best_flights.len() + self.other_flights.len();

        if offers == 0 {
            if let Some(error) = self.error {
                // SerpApi reports an empty search as an error string.
                if error.to_lowercase().contains("returned any results") {
                    return Ok(Vec::new());
                }
                return Err(ProviderError::shape(ProviderId::SerpApi, error));
            }
        }

        let currency = self
            .search_parameters
            .and_then(|p| p.currency)
            .unwrap_or_else(|| requested_currency.to_string());

        let options: Vec<FlightOption> = self
            .other_flights
            .into_iter()
            .chain(self.best_flights)
            .filter_map(|offer| offer.into_option(&currency))
            .collect();

        if options.len() < offers {
            warn!(dropped = offers - options.len(), "some flight offers had no usable first segment");
        }
        Ok(options)
    }
}

#[async_trait]
impl FlightSearch for SerpApiClient {
    async fn search(&self, query: &FlightQuery) -> Result<Vec<FlightOption>, ProviderError> {
        let res: SearchResponse = self
            .http
            .get_json(
                self.http.base_url(),
                &[
                    ("engine", "google_flights".to_string()),
                    ("departure_id", query.origin.clone()),
                    ("arrival_id", query.destination.clone()),
                    ("outbound_date", query.date.format("%Y-%m-%d").to_string()),
                    // one-way, sorted by price on the provider side
                    ("type", "2".to_string()),
                    ("sort_by", "2".to_string()),
                    ("currency", self.currency.clone()),
                    ("api_key", self.api_key.clone()),
                ],
            )
            .await?;

        let options = res.into_options(&self.currency)?;
        debug!(origin = %query.origin, destination = %query.destination, count = options.len(), "flight search done");
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorKind;
    use chrono::NaiveDate;
    use httpmock::prelude::*;
    use serde_json::{Value, json};

    fn client(server: &MockServer) -> SerpApiClient {
        let mut cfg = Config::default();
        cfg.set_provider_base_url(ProviderId::SerpApi, server.url("/search"));
        cfg.set_flight_api_key("TEST_KEY".to_string());
        SerpApiClient::from_config(&cfg).unwrap().expect("key is configured")
    }

    fn query() -> FlightQuery {
        FlightQuery {
            origin: "TRN".to_string(),
            destination: "FCO".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        }
    }

    fn offer(airline: &str, number: &str, time: &str, price: f64) -> Value {
        json!({
            "flights": [{
                "departure_airport": { "name": "Torino", "id": "TRN", "time": time },
                "arrival_airport": { "name": "Fiumicino", "id": "FCO", "time": "2025-03-01 23:59" },
                "duration": 70,
                "airline": airline,
                "flight_number": number
            }],
            "total_duration": 70,
            "price": price
        })
    }

    #[test]
    fn no_client_without_key() {
        assert!(SerpApiClient::from_config(&Config::default()).unwrap().is_none());
    }

    #[tokio::test]
    async fn sends_query_and_lists_other_before_best() {
        let server = MockServer::start_async().await;
        let m = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/search")
                    .query_param("engine", "google_flights")
                    .query_param("departure_id", "TRN")
                    .query_param("arrival_id", "FCO")
                    .query_param("outbound_date", "2025-03-01")
                    .query_param("api_key", "TEST_KEY");
                then.status(200).json_body(json!({
                    "search_parameters": { "currency": "USD" },
                    "best_flights": [offer("ITA", "AZ 1411", "2025-03-01 14:00", 120.0)],
                    "other_flights": [offer("Ryanair", "FR 100", "2025-03-01 09:00", 40.0)]
                }));
            })
            .await;

        let options = client(&server).search(&query()).await.unwrap();

        m.assert_async().await;
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].flight_number, "FR 100");
        assert_eq!(options[1].carrier, "ITA");
        assert_eq!(options[0].price.as_ref().unwrap().currency, "USD");
        assert_eq!(options[1].duration_minutes, 70);
    }

    #[test]
    fn equal_departures_keep_other_before_best() {
        let res: SearchResponse = serde_json::from_value(json!({
            "best_flights": [offer("ITA", "BEST", "2025-03-01 10:00", 90.0)],
            "other_flights": [offer("ITA", "OTHER", "2025-03-01 10:00", 60.0)]
        }))
        .unwrap();

        let mut options = res.into_options("EUR").unwrap();
        crate::flights::sort_by_departure(&mut options);

        let order: Vec<_> = options.iter().map(|o| o.flight_number.as_str()).collect();
        assert_eq!(order, ["OTHER", "BEST"]);
    }

    #[tokio::test]
    async fn offers_without_departure_time_are_dropped() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search");
                then.status(200).json_body(json!({
                    "other_flights": [
                        { "flights": [], "price": 10 },
                        offer("ITA", "AZ 1", "not a time", 20.0),
                        offer("ITA", "AZ 2", "2025-03-01 08:00", 30.0)
                    ]
                }));
            })
            .await;

        let options = client(&server).search(&query()).await.unwrap();

        assert_eq!(options.len(), 1);
        assert_eq!(options[0].flight_number, "AZ 2");
        assert_eq!(options[0].price.as_ref().unwrap().currency, "EUR");
    }

    #[tokio::test]
    async fn no_results_error_is_an_empty_search() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search");
                then.status(200).json_body(json!({
                    "error": "Google Flights hasn't returned any results for this query."
                }));
            })
            .await;

        let options = client(&server).search(&query()).await.unwrap();
        assert!(options.is_empty());
    }

    #[tokio::test]
    async fn bad_key_is_protocol_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search");
                then.status(401).json_body(json!({ "error": "Invalid API key." }));
            })
            .await;

        let err = client(&server).search(&query()).await.unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::Protocol);
        assert_eq!(err.status, Some(401));
    }
}
