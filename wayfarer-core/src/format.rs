//! Pure text rendering of provider payloads.
//!
//! Every block is plain text meant to be shown as-is by the host; nothing here
//! touches the network.

use crate::model::{
    AlertFeed, AlertRecord, DailyForecast, FlightOption, FlightQuery, ForecastPeriod,
    ResolvedLocation,
};

/// Line placed between rendered blocks.
pub const SEPARATOR: &str = "\n---\n";

/// Number of primary-provider forecast periods rendered.
pub const PERIOD_WINDOW: usize = 5;

pub const UNKNOWN: &str = "Unknown";
pub const NO_DESCRIPTION: &str = "No description available";
pub const NO_INSTRUCTIONS: &str = "No specific instructions provided";

pub const ALERTS_UNAVAILABLE: &str = "Unable to fetch alerts for this state.";
pub const NO_ACTIVE_ALERTS: &str = "No active alerts for this state.";

const NOT_AVAILABLE: &str = "N/A";

pub fn format_period(period: &ForecastPeriod) -> String {
    format!(
        "{}:\nTemperature: {}°{}\nWind: {} {}\nForecast: {}",
        period.name,
        period.temperature,
        period.temperature_unit,
        period.wind_speed,
        period.wind_direction,
        period.detailed_forecast,
    )
}

/// Render the first [`PERIOD_WINDOW`] periods, in the order given.
pub fn format_periods(periods: &[ForecastPeriod]) -> String {
    periods
        .iter()
        .take(PERIOD_WINDOW)
        .map(format_period)
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

pub fn format_alert(alert: &AlertRecord) -> String {
    format!(
        "Event: {}\nArea: {}\nSeverity: {}\nDescription: {}\nInstructions: {}",
        or_placeholder(&alert.event, UNKNOWN),
        or_placeholder(&alert.area_description, UNKNOWN),
        or_placeholder(&alert.severity, UNKNOWN),
        or_placeholder(&alert.description, NO_DESCRIPTION),
        or_placeholder(&alert.instructions, NO_INSTRUCTIONS),
    )
}

/// A feed without a feature collection and one with an empty collection get
/// different messages.
pub fn format_alert_feed(feed: &AlertFeed) -> String {
    match &feed.features {
        None => ALERTS_UNAVAILABLE.to_string(),
        Some(features) if features.is_empty() => NO_ACTIVE_ALERTS.to_string(),
        Some(features) => features.iter().map(format_alert).collect::<Vec<_>>().join(SEPARATOR),
    }
}

pub fn format_daily_forecast(forecast: &DailyForecast) -> String {
    let current = &forecast.current;
    let mut out = format!(
        "Current Weather:\nTemperature: {}°C\nWind: {} km/h from {}°\nWeather Code: {}\n",
        or_na(current.temperature_c),
        or_na(current.wind_speed_kmh),
        or_na(current.wind_direction_deg),
        describe_code(current.weather_code),
    );

    out.push_str(&format!("\nNext {} Days Forecast:\n", forecast.days.len()));
    for day in &forecast.days {
        out.push_str(&format!(
            "{}: High {}°C, Low {}°C, Code {}\n",
            day.date,
            or_na(day.high_c),
            or_na(day.low_c),
            describe_code(day.weather_code),
        ));
    }

    out
}

pub fn format_flight(option: &FlightOption) -> String {
    let price = option
        .price
        .as_ref()
        .map(|p| format!("{} {}", p.amount, p.currency))
        .unwrap_or_else(|| "unavailable".to_string());

    format!(
        "Flight: {} {}\nDeparture Time: {}\nTotal Duration: {} minutes\nPrice: {}",
        option.carrier,
        option.flight_number,
        option.departure_time.format("%Y-%m-%d %H:%M"),
        option.duration_minutes,
        price,
    )
}

/// Header line followed by one block per option, in the order given.
pub fn format_flights(query: &FlightQuery, options: &[FlightOption]) -> String {
    let header = format!(
        "--- Flights from {} to {} on {} ---",
        query.origin, query.destination, query.date
    );

    std::iter::once(header)
        .chain(options.iter().map(format_flight))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

pub fn format_location(location: &ResolvedLocation) -> String {
    format!(
        "Latitude: {:.4}\nLongitude: {:.4}\nDisplay name: {}\nSource: {}",
        location.coordinate.latitude(),
        location.coordinate.longitude(),
        location.display_name,
        location.source,
    )
}

/// WMO weather interpretation code as reported by Open-Meteo.
#[must_use]
pub fn weather_code_to_description(code: u8) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

fn describe_code(code: Option<u8>) -> String {
    match code {
        Some(code) => format!("{code} ({})", weather_code_to_description(code)),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn or_na(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| v.to_string())
}

fn or_placeholder<'a>(value: &'a Option<String>, placeholder: &'a str) -> &'a str {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).unwrap_or(placeholder)
}
