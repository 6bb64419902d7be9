//! Location resolution.
//!
//! Turns an explicit coordinate, a place name, or nothing at all into a
//! [`ResolvedLocation`], in that priority order.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    error::{ProviderError, ResolutionError},
    format,
    model::{Coordinate, LocationSource, ResolvedLocation},
    provider::{Geocoder, IpLocator, ProviderId},
};

pub const GEOCODE_UNAVAILABLE: &str = "Unable to geocode the provided location.";
pub const CURRENT_LOCATION_UNAVAILABLE: &str = "Unable to determine the user location.";

#[derive(Debug, Clone)]
pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
    locator: Arc<dyn IpLocator>,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>, locator: Arc<dyn IpLocator>) -> Self {
        Self { geocoder, locator }
    }

    /// Resolve a location request.
    ///
    /// 1. a valid explicit coordinate is returned as-is, without any network call;
    ///    an out-of-range one is an error unless a place name is also given;
    /// 2. otherwise a non-blank place name is geocoded, and a failure there is
    ///    final: a different place is never substituted;
    /// 3. otherwise the caller's location is inferred from their IP address.
    pub async fn resolve(
        &self,
        explicit: Option<(f64, f64)>,
        place: Option<&str>,
    ) -> Result<ResolvedLocation, ResolutionError> {
        let place = place.map(str::trim).filter(|p| !p.is_empty());

        if let Some(pair) = explicit {
            match Coordinate::try_from(pair) {
                Ok(coordinate) => {
                    debug!(%coordinate, "using explicit coordinate");
                    return Ok(ResolvedLocation {
                        coordinate,
                        display_name: coordinate.to_string(),
                        source: LocationSource::Explicit,
                    });
                }
                Err(source) if place.is_none() => {
                    return Err(ResolutionError::CoordinateOutOfRange { source });
                }
                Err(e) => warn!(error = %e, "ignoring explicit coordinate, geocoding place instead"),
            }
        }

        if let Some(place) = place {
            return self.resolve_place(place).await;
        }

        self.resolve_by_ip().await
    }

    async fn resolve_place(&self, place: &str) -> Result<ResolvedLocation, ResolutionError> {
        debug!(place, "geocoding place name");

        let matches = self.geocoder.geocode(place).await.map_err(|source| {
            ResolutionError::GeocodeFailed { place: place.to_string(), source }
        })?;

        let Some(best) = matches.into_iter().next() else {
            return Err(ResolutionError::GeocodeFailed {
                place: place.to_string(),
                source: ProviderError::no_match(ProviderId::Nominatim, format!("no match for '{place}'")),
            });
        };

        let location = ResolvedLocation {
            coordinate: best.coordinate,
            display_name: best.display_name.unwrap_or_else(|| place.to_string()),
            source: LocationSource::Geocoded,
        };
        info!(place, coordinate = %location.coordinate, "geocoded place");
        Ok(location)
    }

    async fn resolve_by_ip(&self) -> Result<ResolvedLocation, ResolutionError> {
        debug!("no location given, falling back to IP lookup");

        let found = self
            .locator
            .locate()
            .await
            .map_err(|source| ResolutionError::LocationUnknown { source })?;

        let location = ResolvedLocation {
            coordinate: found.coordinate,
            display_name: found.display_name(),
            source: LocationSource::IpFallback,
        };
        info!(name = %location.display_name, "inferred location from IP");
        Ok(location)
    }

    /// Geocode a place name and render the best match.
    pub async fn geocode(&self, place: &str) -> String {
        let place = place.trim();
        if place.is_empty() {
            return GEOCODE_UNAVAILABLE.to_string();
        }

        match self.resolve_place(place).await {
            Ok(location) => format::format_location(&location),
            Err(e) => {
                warn!(error = %e, "geocoding failed");
                GEOCODE_UNAVAILABLE.to_string()
            }
        }
    }

    /// The caller's current city, from their IP address.
    pub async fn current_location(&self) -> String {
        match self.locator.locate().await {
            Ok(found) => found.city,
            Err(e) => {
                warn!(error = %e, "IP location failed");
                CURRENT_LOCATION_UNAVAILABLE.to_string()
            }
        }
    }
}
