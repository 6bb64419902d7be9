use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::{
    config::Config,
    error::ProviderError,
    model::{Coordinate, IpLocation},
    provider::{IpLocator, ProviderId, http::HttpClient},
};

/// ip-api.com lookup of the caller's own address.
#[derive(Debug, Clone)]
pub struct IpApiClient {
    http: HttpClient,
}

impl IpApiClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let id = ProviderId::IpApi;
        let http = HttpClient::new(id, &config.provider_settings(id), &config.user_agent_header())?;
        Ok(Self::new(http))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IpApiResponse {
    status: Option<String>,
    message: Option<String>,
    city: Option<String>,
    region_name: Option<String>,
    country: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl TryFrom<IpApiResponse> for IpLocation {
    type Error = ProviderError;

    fn try_from(res: IpApiResponse) -> Result<Self, Self::Error> {
        let id = ProviderId::IpApi;

        if res.status.as_deref() != Some("success") {
            let reason = res.message.unwrap_or_else(|| "lookup failed".to_string());
            return Err(ProviderError::no_match(id, reason));
        }

        let city = res
            .city
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ProviderError::shape(id, "response has no city"))?;
        let (lat, lon) = res
            .lat
            .zip(res.lon)
            .ok_or_else(|| ProviderError::shape(id, "response has no coordinates"))?;
        let coordinate =
            Coordinate::new(lat, lon).map_err(|e| ProviderError::shape(id, e.to_string()))?;

        Ok(IpLocation { city, region: res.region_name, country: res.country, coordinate })
    }
}

#[async_trait]
impl IpLocator for IpApiClient {
    async fn locate(&self) -> Result<IpLocation, ProviderError> {
        // No address in the path: the service answers for the caller's own IP.
        let res: IpApiResponse = self.http.get_json(&self.http.endpoint("json/"), &[]).await?;
        let location = IpLocation::try_from(res)?;

        debug!(city = %location.city, "located caller by IP");
        Ok(location)
    }
}
