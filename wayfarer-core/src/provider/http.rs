use std::time::Duration;

use anyhow::Context;
use reqwest::{
    Client,
    header::{ACCEPT, HeaderMap, HeaderValue},
};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::{config::ProviderSettings, error::ProviderError, provider::ProviderId};

/// Thin transport shared by all provider clients: fixed base URL, headers and
/// timeout, JSON decoding, and error normalization. No business logic.
#[derive(Debug, Clone)]
pub struct HttpClient {
    provider: ProviderId,
    base_url: String,
    timeout: Duration,
    http: Client,
}

impl HttpClient {
    pub fn new(
        provider: ProviderId,
        settings: &ProviderSettings,
        user_agent: &str,
    ) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(provider.accept()));

        let http = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()
            .with_context(|| format!("Failed to create HTTP client for {provider}"))?;

        Ok(Self {
            provider,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            timeout: settings.timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `path` joined onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET `url` and decode the body as `T`.
    ///
    /// Connection failures, timeouts, non-2xx statuses and undecodable bodies
    /// all come back as a [`ProviderError`].
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        debug!(provider = %self.provider, %url, "sending request");

        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| self.transport_error(&e))?;
        trace!(provider = %self.provider, %status, bytes = body.len(), "response received");

        if !status.is_success() {
            return Err(ProviderError::protocol(
                self.provider,
                status.as_u16(),
                format!("status {}: {}", status, truncate_body(&body)),
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            ProviderError::shape(self.provider, format!("failed to parse JSON response: {e}"))
        })
    }

    fn transport_error(&self, err: &reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::network(self.provider, format!("no answer within {:?}", self.timeout))
        } else {
            ProviderError::network(self.provider, err.to_string())
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
