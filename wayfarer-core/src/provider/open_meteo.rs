use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    config::Config,
    error::ProviderError,
    format,
    model::{Coordinate, CurrentConditions, DailyForecast, DailyOutlook},
    provider::{ForecastStrategy, ProviderId, http::HttpClient},
};

/// Open-Meteo forecast API. Worldwide coverage, no key, queried straight by coordinate.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: HttpClient,
    forecast_days: u8,
}

impl OpenMeteoClient {
    pub fn new(http: HttpClient, forecast_days: u8) -> Self {
        Self { http, forecast_days }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let id = ProviderId::OpenMeteo;
        let http = HttpClient::new(id, &config.provider_settings(id), &config.user_agent_header())?;
        Ok(Self::new(http, config.weather.forecast_days))
    }

    pub async fn daily_forecast(&self, at: Coordinate) -> Result<DailyForecast, ProviderError> {
        let res: OpenMeteoResponse = self
            .http
            .get_json(
                &self.http.endpoint("forecast"),
                &[
                    ("latitude", at.latitude().to_string()),
                    ("longitude", at.longitude().to_string()),
                    ("current_weather", "true".to_string()),
                    ("daily", "temperature_2m_max,temperature_2m_min,weathercode".to_string()),
                    ("timezone", "auto".to_string()),
                    ("forecast_days", self.forecast_days.to_string()),
                ],
            )
            .await?;

        Ok(res.into_forecast(usize::from(self.forecast_days)))
    }
}

#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    current_weather: Option<CurrentWeather>,
    daily: Option<Daily>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature: Option<f64>,
    windspeed: Option<f64>,
    winddirection: Option<f64>,
    weathercode: Option<u8>,
}

/// Column-oriented: entry `i` of every array belongs to `time[i]`.
#[derive(Debug, Deserialize)]
struct Daily {
    #[serde(default)]
    time: Vec<String>,
    #[serde(rename = "temperature_2m_max", default)]
    temperature_max: Vec<Option<f64>>,
    #[serde(rename = "temperature_2m_min", default)]
    temperature_min: Vec<Option<f64>>,
    #[serde(default)]
    weathercode: Vec<Option<u8>>,
}

impl OpenMeteoResponse {
    fn into_forecast(self, max_days: usize) -> DailyForecast {
        let current = self
            .current_weather
            .map(|c| CurrentConditions {
                temperature_c: c.temperature,
                wind_speed_kmh: c.windspeed,
                wind_direction_deg: c.winddirection,
                weather_code: c.weathercode,
            })
            .unwrap_or_default();

        let days = self
            .daily
            .map(|d| {
                d.time
                    .iter()
                    .take(max_days)
                    .enumerate()
                    .map(|(i, date)| DailyOutlook {
                        date: date.clone(),
                        high_c: d.temperature_max.get(i).copied().flatten(),
                        low_c: d.temperature_min.get(i).copied().flatten(),
                        weather_code: d.weathercode.get(i).copied().flatten(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        DailyForecast { current, days }
    }
}

#[async_trait]
impl ForecastStrategy for OpenMeteoClient {
    fn id(&self) -> ProviderId {
        ProviderId::OpenMeteo
    }

    async fn forecast(&self, at: Coordinate) -> Result<String, ProviderError> {
        let forecast = self.daily_forecast(at).await?;
        Ok(format::format_daily_forecast(&forecast))
    }
}
