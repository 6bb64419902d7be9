use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use inquire::{CustomType, Password, Text};
use tracing::info;
use wayfarer_core::{Config, Pipeline};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "wayfarer", version, about = "Location, weather and flight lookups")]
pub struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Read configuration from this file instead of the default location.
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Forecast for coordinates, a place name, or the current location.
    Forecast {
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Place name to geocode, e.g. "Turin".
        #[arg(long)]
        place: Option<String>,
    },

    /// Active weather alerts for a US state.
    Alerts {
        /// Two-letter state code, e.g. CA.
        state: String,
    },

    /// One-way flights between two airports.
    Flights {
        /// Departure IATA code.
        from: String,

        /// Arrival IATA code.
        to: String,

        /// Departure date (YYYY-MM-DD); today when absent.
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Coordinates of a place name.
    Geocode { place: String },

    /// City inferred from this machine's public IP address.
    Locate,

    /// Interactively set contact details and the flight search key.
    Configure,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let path = self.config.as_deref();
        let pipeline = || -> Result<Pipeline> {
            Pipeline::from_config(&load_config(path)?.with_env_overrides())
        };

        let output = match self.command {
            Command::Forecast { lat, lon, place } => {
                pipeline()?.forecast_for(lat.zip(lon), place.as_deref()).await
            }
            Command::Alerts { state } => pipeline()?.alerts(&state).await,
            Command::Flights { from, to, date } => pipeline()?.flights(&from, &to, date).await,
            Command::Geocode { place } => pipeline()?.geocode(&place).await,
            Command::Locate => pipeline()?.current_location().await,
            // Unvalidated and without environment overrides.
            Command::Configure => return configure(read_config(path)?, path),
        };

        println!("{output}");
        Ok(())
    }
}

/// A missing file yields defaults.
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Like [`load_config`] but without validation, so `configure` can repair a bad file.
fn read_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::read_from(path),
        None => Config::read_from(&Config::config_file_path()?),
    }
}

fn configure(mut config: Config, path: Option<&Path>) -> Result<()> {
    config.contact_email = Text::new("Contact email sent with every request:")
        .with_default(&config.contact_email)
        .prompt()
        .context("reading contact email")?;

    let key = Password::new("SerpApi key (leave empty to keep the current one):")
        .without_confirmation()
        .prompt()
        .context("reading SerpApi key")?;
    if !key.trim().is_empty() {
        config.set_flight_api_key(key.trim().to_string());
    }

    config.flights.currency = Text::new("Currency for flight prices:")
        .with_default(&config.flights.currency)
        .prompt()
        .context("reading currency")?
        .trim()
        .to_uppercase();

    config.weather.forecast_days = CustomType::<u8>::new("Days of fallback forecast (1-16):")
        .with_default(config.weather.forecast_days)
        .prompt()
        .context("reading forecast days")?;

    config.validate()?;

    let saved = match path {
        Some(path) => {
            config.save_to(path)?;
            path.to_path_buf()
        }
        None => config.save()?,
    };
    info!(path = %saved.display(), "configuration saved");
    println!("Configuration saved to {}", saved.display());
    Ok(())
}
