//! Test doubles shared by the unit tests in this crate.

use async_trait::async_trait;
use fareline_shared::{FlightResult, Provider};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::provider::{ProviderClient, ProviderUnavailable};

pub fn flight(provider: Provider, agony: f64, seq: usize) -> FlightResult {
    serde_json::from_value(json!({
        "provider": provider.name(),
        "agony": agony,
        "seq": seq,
    }))
    .expect("Failed to build flight")
}

/// `count` results for `provider` with agony cycling over a small range so
/// that ties across providers are common.
pub fn flights(provider: Provider, count: usize) -> Vec<FlightResult> {
    (0..count)
        .map(|i| flight(provider, ((i * 7) % 13) as f64, i))
        .collect()
}

/// Serves canned responses and counts calls. Every fetch sleeps for `delay`
/// so that concurrency is observable under a paused clock.
#[derive(Default)]
pub struct FakeProviders {
    responses: HashMap<Provider, Result<Vec<FlightResult>, String>>,
    delay: Duration,
    pub calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeProviders {
    pub fn with_counts(counts: &[(Provider, usize)]) -> Self {
        let mut fake = Self::default();
        for (provider, count) in counts {
            fake.responses.insert(*provider, Ok(flights(*provider, *count)));
        }
        fake
    }

    pub fn failing(mut self, provider: Provider, reason: &str) -> Self {
        self.responses.insert(provider, Err(reason.to_string()));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderClient for FakeProviders {
    async fn fetch(&self, provider: Provider) -> Result<Vec<FlightResult>, ProviderUnavailable> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.responses.get(&provider) {
            Some(Ok(results)) => Ok(results.clone()),
            Some(Err(reason)) => Err(ProviderUnavailable::new(provider, reason.clone())),
            None => Ok(Vec::new()),
        }
    }
}
