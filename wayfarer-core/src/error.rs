use std::fmt;

use thiserror::Error;

use crate::provider::ProviderId;

/// How a provider call went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Connection failure or timeout.
    Network,
    /// Non-2xx HTTP status.
    Protocol,
    /// Body was not the JSON shape we expected.
    Shape,
    /// Well-formed answer with nothing usable in it.
    NoMatch,
}

impl ProviderErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderErrorKind::Network => "network",
            ProviderErrorKind::Protocol => "protocol",
            ProviderErrorKind::Shape => "shape",
            ProviderErrorKind::NoMatch => "no-match",
        }
    }
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized failure of a single outbound call.
///
/// Every provider client returns this instead of raising, so resolvers only
/// ever need one check to decide whether to fall back.
#[derive(Debug, Clone, Error)]
#[error("{provider} request failed ({kind}): {cause}")]
pub struct ProviderError {
    pub provider: ProviderId,
    pub status: Option<u16>,
    pub kind: ProviderErrorKind,
    pub cause: String,
}

impl ProviderError {
    pub fn network(provider: ProviderId, cause: impl Into<String>) -> Self {
        Self { provider, status: None, kind: ProviderErrorKind::Network, cause: cause.into() }
    }

    pub fn protocol(provider: ProviderId, status: u16, cause: impl Into<String>) -> Self {
        Self {
            provider,
            status: Some(status),
            kind: ProviderErrorKind::Protocol,
            cause: cause.into(),
        }
    }

    pub fn shape(provider: ProviderId, cause: impl Into<String>) -> Self {
        Self { provider, status: None, kind: ProviderErrorKind::Shape, cause: cause.into() }
    }

    pub fn no_match(provider: ProviderId, cause: impl Into<String>) -> Self {
        Self { provider, status: None, kind: ProviderErrorKind::NoMatch, cause: cause.into() }
    }

    /// Short, caller-safe description of what went wrong.
    #[must_use]
    pub fn user_message(&self) -> String {
        match (self.kind, self.status) {
            (ProviderErrorKind::Network, _) => {
                "the service could not be reached or did not answer in time".to_string()
            }
            (ProviderErrorKind::Protocol, Some(status)) => {
                format!("the service rejected the request (HTTP {status})")
            }
            (ProviderErrorKind::Protocol, None) => "the service rejected the request".to_string(),
            (ProviderErrorKind::Shape, _) => "the service returned an unexpected answer".to_string(),
            (ProviderErrorKind::NoMatch, _) => "the service had no matching data".to_string(),
        }
    }
}

/// Failure to turn a location request into coordinates.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// A non-empty place name could not be geocoded. Never falls back to IP lookup.
    #[error("could not geocode '{place}'")]
    GeocodeFailed {
        place: String,
        #[source]
        source: ProviderError,
    },

    /// Coordinates were supplied out of range and no place name was given.
    /// Never falls back to IP lookup.
    #[error("explicit coordinate rejected")]
    CoordinateOutOfRange {
        #[source]
        source: InvalidCoordinate,
    },

    /// Nothing was supplied and the caller's location could not be inferred.
    #[error("could not infer the caller's location")]
    LocationUnknown {
        #[source]
        source: ProviderError,
    },
}

impl ResolutionError {
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ResolutionError::GeocodeFailed { place, .. } => format!(
                "Unable to geocode the provided location '{place}'. \
                 Please check the spelling or supply coordinates instead."
            ),
            ResolutionError::CoordinateOutOfRange { source } => format!(
                "Invalid coordinates ({}, {}): latitude must be within [-90, 90] \
                 and longitude within [-180, 180].",
                source.latitude, source.longitude
            ),
            ResolutionError::LocationUnknown { .. } => "Unable to determine your current location. \
                 Please supply a place name or coordinates."
                .to_string(),
        }
    }
}

/// Latitude/longitude pair outside the valid ranges.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error(
    "invalid coordinate ({latitude}, {longitude}): latitude must be within [-90, 90] \
     and longitude within [-180, 180]"
)]
pub struct InvalidCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}
