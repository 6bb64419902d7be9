//! Forecasts through an ordered chain of providers, and active alerts.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    format,
    model::Coordinate,
    provider::{AlertSource, ForecastStrategy},
};

pub const FORECAST_UNAVAILABLE: &str = "Unable to fetch forecast data from any provider.";
pub const STATE_REQUIRED: &str = "A two-letter US state code (e.g. CA, NY) is required.";

#[derive(Debug, Clone)]
pub struct WeatherResolver {
    strategies: Vec<Arc<dyn ForecastStrategy>>,
    alerts: Arc<dyn AlertSource>,
}

impl WeatherResolver {
    /// `strategies` are tried in order until one succeeds.
    pub fn new(strategies: Vec<Arc<dyn ForecastStrategy>>, alerts: Arc<dyn AlertSource>) -> Self {
        Self { strategies, alerts }
    }

    /// Always returns displayable, non-empty text.
    pub async fn forecast(&self, at: Coordinate) -> String {
        for strategy in &self.strategies {
            match strategy.forecast(at).await {
                Ok(text) if !text.trim().is_empty() => {
                    info!(provider = %strategy.id(), coordinate = %at, "forecast ready");
                    return text;
                }
                Ok(_) => warn!(provider = %strategy.id(), "provider rendered an empty forecast"),
                Err(e) => warn!(provider = %strategy.id(), error = %e, "forecast provider failed"),
            }
        }

        FORECAST_UNAVAILABLE.to_string()
    }

    /// Active alerts for a US state, e.g. `CA`.
    pub async fn alerts(&self, state: &str) -> String {
        let state = state.trim().to_uppercase();
        if state.is_empty() {
            return STATE_REQUIRED.to_string();
        }

        match self.alerts.active_alerts(&state).await {
            Ok(feed) => format::format_alert_feed(&feed),
            Err(e) => {
                warn!(%state, error = %e, "alerts provider failed");
                format::ALERTS_UNAVAILABLE.to_string()
            }
        }
    }
}
