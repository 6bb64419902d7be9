//! Flight options between two airports, earliest departure first.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::{
    format,
    model::{FlightOption, FlightQuery},
    provider::FlightSearch,
};

pub const AIRPORTS_REQUIRED: &str =
    "Both departure and arrival airport IATA codes are required (e.g. TRN, FCO).";
pub const FLIGHTS_NOT_CONFIGURED: &str = "Flight search is not configured: no SerpApi key found.\n\
     Hint: set SERPAPI_KEY or run `wayfarer configure`.";

#[derive(Debug, Clone)]
pub struct FlightResolver {
    search: Option<Arc<dyn FlightSearch>>,
    max_results: usize,
}

impl FlightResolver {
    /// `search` is `None` when no flight provider is configured.
    pub fn new(search: Option<Arc<dyn FlightSearch>>, max_results: usize) -> Self {
        Self { search, max_results: max_results.max(1) }
    }

    /// Render flights from `origin` to `destination` on `date` (today when omitted).
    pub async fn flights(&self, origin: &str, destination: &str, date: Option<NaiveDate>) -> String {
        let origin = origin.trim().to_uppercase();
        let destination = destination.trim().to_uppercase();
        if origin.is_empty() || destination.is_empty() {
            return AIRPORTS_REQUIRED.to_string();
        }

        let Some(search) = &self.search else {
            return FLIGHTS_NOT_CONFIGURED.to_string();
        };

        // Evaluated per call, never cached.
        let date = date.unwrap_or_else(|| Local::now().date_naive());
        let query = FlightQuery { origin, destination, date };

        let mut options = match search.search(&query).await {
            Ok(options) => options,
            Err(e) => {
                warn!(origin = %query.origin, destination = %query.destination, error = %e, "flight search failed");
                return format!("Unable to fetch flight data: {}.", e.user_message());
            }
        };

        if options.is_empty() {
            return format!(
                "No flights found between {} and {} on {}.",
                query.origin, query.destination, query.date
            );
        }

        sort_by_departure(&mut options);
        options.truncate(self.max_results);
        info!(origin = %query.origin, destination = %query.destination, count = options.len(), "flights ready");

        format::format_flights(&query, &options)
    }
}

/// Earliest departure first; equal times keep their provider order.
pub fn sort_by_departure(options: &mut [FlightOption]) {
    options.sort_by_key(|o| o.departure_time);
}
