use async_trait::async_trait;
use fareline_shared::{FlightResult, Provider};

/// A single provider could not be read: transport failure, timeout, non-2xx
/// status or an undecodable body. The reason is informational only.
#[derive(Debug, Clone, thiserror::Error)]
#[error("provider {provider} unavailable: {reason}")]
pub struct ProviderUnavailable {
    pub provider: Provider,
    pub reason: String,
}

impl ProviderUnavailable {
    pub fn new(provider: Provider, reason: impl Into<String>) -> Self {
        Self {
            provider,
            reason: reason.into(),
        }
    }
}

#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Fetch the full result list reported by `provider`. Failures are returned
    /// as-is; implementations do not retry.
    async fn fetch(&self, provider: Provider) -> Result<Vec<FlightResult>, ProviderUnavailable>;
}
