//! Core library for the `wayfarer` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Clients for the geocoding, weather, IP lookup and flight providers
//! - Resolvers that pick a location, fall back between forecast providers
//!   and rank flight options
//! - Plain-text rendering of every result
//!
//! Every resolver operation returns displayable text; provider failures are
//! logged through `tracing` and never surface as panics.

pub mod config;
pub mod error;
pub mod flights;
pub mod format;
pub mod location;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod weather;

pub use config::{Config, ProviderConfig};
pub use error::{ProviderError, ProviderErrorKind, ResolutionError};
pub use flights::FlightResolver;
pub use location::LocationResolver;
pub use model::{Coordinate, FlightOption, FlightQuery, LocationSource, ResolvedLocation};
pub use pipeline::Pipeline;
pub use provider::ProviderId;
pub use weather::WeatherResolver;
