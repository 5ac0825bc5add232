use async_trait::async_trait;
use fareline_core::{ProviderClient, ProviderUnavailable};
use fareline_shared::{FlightResult, Provider, ProviderResponse};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Reads `GET <base_url><provider>` from the scraper API.
#[derive(Clone)]
pub struct HttpProviderClient {
    client: Client,
    base_url: String,
}

impl HttpProviderClient {
    /// `timeout` bounds each fetch end to end; a hung provider fails instead of stalling the fan-out.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        let mut base_url = base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Ok(Self { client, base_url })
    }

    pub fn endpoint(&self, provider: Provider) -> String {
        format!("{}{}", self.base_url, provider.name())
    }
}

#[async_trait]
impl ProviderClient for HttpProviderClient {
    async fn fetch(&self, provider: Provider) -> Result<Vec<FlightResult>, ProviderUnavailable> {
        let url = self.endpoint(provider);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderUnavailable::new(provider, format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderUnavailable::new(provider, format!("{url} returned {status}")));
        }

        let body: ProviderResponse = response
            .json()
            .await
            .map_err(|e| ProviderUnavailable::new(provider, format!("malformed body from {url}: {e}")))?;

        debug!(%provider, count = body.results.len(), "fetched provider results");
        Ok(body.results)
    }
}
