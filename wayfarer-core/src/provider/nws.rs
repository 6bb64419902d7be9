use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::{
    config::Config,
    error::ProviderError,
    format,
    model::{AlertFeed, AlertRecord, Coordinate, ForecastPeriod},
    provider::{AlertSource, ForecastStrategy, ProviderId, http::HttpClient},
};

/// US National Weather Service (api.weather.gov).
///
/// Forecasts take two calls: `/points/{lat},{lon}` hands back the URL of the
/// gridded forecast covering that point, which is then fetched.
#[derive(Debug, Clone)]
pub struct NwsClient {
    http: HttpClient,
}

impl NwsClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let id = ProviderId::Nws;
        let http = HttpClient::new(id, &config.provider_settings(id), &config.user_agent_header())?;
        Ok(Self::new(http))
    }

    /// Locator of the forecast resource covering `at`.
    pub async fn forecast_url(&self, at: Coordinate) -> Result<String, ProviderError> {
        let url = self
            .http
            .endpoint(&format!("points/{:.4},{:.4}", at.latitude(), at.longitude()));
        let points: PointsResponse = self.http.get_json(&url, &[]).await?;

        points
            .properties
            .and_then(|p| p.forecast)
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| ProviderError::shape(ProviderId::Nws, "points response has no properties.forecast"))
    }

    /// All forecast periods for `at`, in the order the service returns them.
    pub async fn periods(&self, at: Coordinate) -> Result<Vec<ForecastPeriod>, ProviderError> {
        let forecast_url = self.forecast_url(at).await?;
        debug!(%forecast_url, "following NWS forecast locator");

        let forecast: ForecastResponse = self.http.get_json(&forecast_url, &[]).await?;
        let periods = forecast
            .properties
            .and_then(|p| p.periods)
            .ok_or_else(|| ProviderError::shape(ProviderId::Nws, "forecast response has no properties.periods"))?;

        if periods.is_empty() {
            return Err(ProviderError::no_match(ProviderId::Nws, "forecast has no periods"));
        }

        Ok(periods.into_iter().map(ForecastPeriod::from).collect())
    }
}

#[derive(Debug, Deserialize)]
struct PointsResponse {
    properties: Option<PointsProperties>,
}

#[derive(Debug, Deserialize)]
struct PointsProperties {
    forecast: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    properties: Option<ForecastProperties>,
}

#[derive(Debug, Deserialize)]
struct ForecastProperties {
    periods: Option<Vec<NwsPeriod>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NwsPeriod {
    name: String,
    temperature: f64,
    temperature_unit: String,
    wind_speed: String,
    wind_direction: String,
    detailed_forecast: String,
}

impl From<NwsPeriod> for ForecastPeriod {
    fn from(p: NwsPeriod) -> Self {
        Self {
            name: p.name,
            temperature: p.temperature,
            temperature_unit: p.temperature_unit,
            wind_speed: p.wind_speed,
            wind_direction: p.wind_direction,
            detailed_forecast: p.detailed_forecast,
        }
    }
}

/// GeoJSON FeatureCollection. `features` stays `None` when the key is absent.
#[derive(Debug, Deserialize)]
struct AlertsResponse {
    features: Option<Vec<AlertFeature>>,
}

#[derive(Debug, Deserialize)]
struct AlertFeature {
    properties: Option<AlertProperties>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlertProperties {
    event: Option<String>,
    area_desc: Option<String>,
    severity: Option<String>,
    description: Option<String>,
    instruction: Option<String>,
}

impl From<AlertProperties> for AlertRecord {
    fn from(p: AlertProperties) -> Self {
        Self {
            event: p.event,
            area_description: p.area_desc,
            severity: p.severity,
            description: p.description,
            instructions: p.instruction,
        }
    }
}

#[async_trait]
impl ForecastStrategy for NwsClient {
    fn id(&self) -> ProviderId {
        ProviderId::Nws
    }

    async fn forecast(&self, at: Coordinate) -> Result<String, ProviderError> {
        let periods = self.periods(at).await?;
        Ok(format::format_periods(&periods))
    }
}

#[async_trait]
impl AlertSource for NwsClient {
    async fn active_alerts(&self, state: &str) -> Result<AlertFeed, ProviderError> {
        let url = self.http.endpoint(&format!("alerts/active/area/{state}"));
        let res: AlertsResponse = self.http.get_json(&url, &[]).await?;

        let features = res.features.map(|features| {
            features
                .into_iter()
                .map(|f| AlertRecord::from(f.properties.unwrap_or_default()))
                .collect::<Vec<_>>()
        });
        debug!(state, count = features.as_ref().map(Vec::len), "fetched NWS alerts");

        Ok(AlertFeed { features })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorKind;
    use httpmock::prelude::*;
    use serde_json::{Value, json};

    fn client(server: &MockServer) -> NwsClient {
        let mut cfg = Config::default();
        cfg.set_provider_base_url(ProviderId::Nws, server.base_url());
        NwsClient::from_config(&cfg).unwrap()
    }

    fn topeka() -> Coordinate {
        Coordinate::new(39.7456, -97.0892).unwrap()
    }

    fn periods_json(count: usize) -> Value {
        let periods: Vec<Value> = (1..=count)
            .map(|i| {
                json!({
                    "number": i,
                    "name": format!("Period {i}"),
                    "temperature": 60 + i,
                    "temperatureUnit": "F",
                    "windSpeed": "10 mph",
                    "windDirection": "S",
                    "detailedForecast": format!("Forecast number {i}.")
                })
            })
            .collect();
        json!({ "properties": { "periods": periods } })
    }

    #[tokio::test]
    async fn follows_points_to_forecast() {
        let server = MockServer::start_async().await;
        let points = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/points/39.7456,-97.0892")
                    .header("accept", "application/geo+json");
                then.status(200).json_body(json!({
                    "properties": { "forecast": server.url("/gridpoints/TOP/32,81/forecast") }
                }));
            })
            .await;
        let forecast = server
            .mock_async(|when, then| {
                when.method(GET).path("/gridpoints/TOP/32,81/forecast");
                then.status(200).json_body(periods_json(3));
            })
            .await;

        let periods = client(&server).periods(topeka()).await.unwrap();

        points.assert_async().await;
        forecast.assert_async().await;
        assert_eq!(periods.len(), 3);
        assert_eq!(periods[0].name, "Period 1");
        assert_eq!(periods[2].temperature, 63.0);
    }

    #[tokio::test]
    async fn missing_forecast_locator_is_shape_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/points/39.7456,-97.0892");
                then.status(200).json_body(json!({ "properties": { "forecast": "" } }));
            })
            .await;

        let err = client(&server).forecast(topeka()).await.unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::Shape);
    }

    #[tokio::test]
    async fn missing_periods_is_shape_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/points/39.7456,-97.0892");
                then.status(200).json_body(json!({
                    "properties": { "forecast": server.url("/forecast") }
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/forecast");
                then.status(200).json_body(json!({ "properties": {} }));
            })
            .await;

        let err = client(&server).forecast(topeka()).await.unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::Shape);
        assert!(err.cause.contains("periods"));
    }

    #[tokio::test]
    async fn points_outside_coverage_is_protocol_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/points/45.0703,7.6869");
                then.status(404).json_body(json!({
                    "title": "Data Unavailable For Requested Point"
                }));
            })
            .await;

        let turin = Coordinate::new(45.0703, 7.6869).unwrap();
        let err = client(&server).forecast(turin).await.unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::Protocol);
        assert_eq!(err.status, Some(404));
    }

    #[tokio::test]
    async fn alerts_keep_absent_and_empty_apart() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/alerts/active/area/CA");
                then.status(200).json_body(json!({ "type": "FeatureCollection", "features": [] }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/alerts/active/area/NY");
                then.status(200).json_body(json!({ "type": "FeatureCollection" }));
            })
            .await;

        let nws = client(&server);
        let empty = nws.active_alerts("CA").await.unwrap();
        let absent = nws.active_alerts("NY").await.unwrap();

        assert_eq!(empty.features, Some(vec![]));
        assert_eq!(absent.features, None);
    }

    #[tokio::test]
    async fn alert_properties_map_with_nulls() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/alerts/active/area/TX");
                then.status(200).json_body(json!({
                    "features": [{
                        "properties": {
                            "event": "Heat Advisory",
                            "areaDesc": "Travis",
                            "severity": "Moderate",
                            "description": "Hot.",
                            "instruction": null
                        }
                    }]
                }));
            })
            .await;

        let feed = client(&server).active_alerts("TX").await.unwrap();
        let alerts = feed.features.unwrap();

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].area_description.as_deref(), Some("Travis"));
        assert_eq!(alerts[0].instructions, None);
    }

    #[tokio::test]
    async fn null_or_missing_properties_keep_the_feed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/alerts/active/area/FL");
                then.status(200).json_body(json!({
                    "features": [
                        { "properties": null },
                        { "id": "no-properties" },
                        { "properties": { "event": "Flood Watch" } }
                    ]
                }));
            })
            .await;

        let feed = client(&server).active_alerts("FL").await.unwrap();
        let alerts = feed.features.unwrap();

        assert_eq!(alerts.len(), 3);
        assert_eq!(alerts[0], AlertRecord::default());
        assert_eq!(alerts[1], AlertRecord::default());
        assert_eq!(alerts[2].event.as_deref(), Some("Flood Watch"));
    }
}
