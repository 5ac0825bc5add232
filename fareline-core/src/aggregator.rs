//! Concurrent provider fan-out and merge.

use fareline_shared::{FlightResult, Provider};
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::provider::{ProviderClient, ProviderUnavailable};
use crate::search::ResultSet;
use crate::{CoreError, CoreResult};

pub struct Aggregator {
    client: Arc<dyn ProviderClient>,
}

impl Aggregator {
    pub fn new(client: Arc<dyn ProviderClient>) -> Self {
        Self { client }
    }

    /// Fetch every provider concurrently and merge into one sorted set.
    ///
    /// All fetches are started before any is awaited, and all are awaited
    /// before the outcome is decided. Any single failure fails the whole
    /// aggregation; when several providers fail the first one in `providers`
    /// order is reported and the rest are only logged.
    pub async fn fetch_all(&self, providers: &[Provider]) -> CoreResult<ResultSet> {
        let started = Instant::now();

        let fetches = providers.iter().map(|&provider| async move {
            (provider, self.client.fetch(provider).await)
        });
        let outcomes = join_all(fetches).await;

        let mut merged: Vec<FlightResult> = Vec::new();
        let mut first_failure: Option<ProviderUnavailable> = None;

        for (provider, outcome) in outcomes {
            match outcome {
                Ok(results) => {
                    debug!(%provider, count = results.len(), "provider returned results");
                    if first_failure.is_none() {
                        merged.extend(results);
                    }
                }
                Err(err) => {
                    warn!(%provider, error = %err, "provider fetch failed");
                    if first_failure.is_none() {
                        first_failure = Some(err);
                    }
                }
            }
        }

        if let Some(cause) = first_failure {
            return Err(CoreError::AggregationFailed { cause });
        }

        let set = ResultSet::from_unsorted(merged);
        info!(
            providers = providers.len(),
            total = set.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "aggregation complete"
        );
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeProviders;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn full_fake() -> FakeProviders {
        FakeProviders::with_counts(&[
            (Provider::Orbitz, 300),
            (Provider::Expedia, 1199),
            (Provider::Priceline, 600),
            (Provider::Travelocity, 400),
            (Provider::United, 1799),
        ])
    }

    #[tokio::test]
    async fn test_merges_every_provider() {
        let aggregator = Aggregator::new(Arc::new(full_fake()));

        let set = aggregator.fetch_all(&Provider::ALL).await.unwrap();

        assert_eq!(set.len(), 4298);
        assert!(set.as_slice().windows(2).all(|w| w[0].agony_score() <= w[1].agony_score()));
        let united = set.iter().filter(|r| r.provider == "United").count();
        assert_eq!(united, 1799);
    }

    #[tokio::test]
    async fn test_ties_follow_provider_order() {
        let aggregator = Aggregator::new(Arc::new(full_fake()));

        let set = aggregator.fetch_all(&Provider::ALL).await.unwrap();

        // Within one agony value, providers appear in enumeration order and
        // each provider's results keep their original sequence.
        let position = |name: &str| Provider::ALL.iter().position(|p| p.name() == name).unwrap();
        for pair in set.as_slice().windows(2) {
            if pair[0].agony_score() != pair[1].agony_score() {
                continue;
            }
            let (a, b) = (position(&pair[0].provider), position(&pair[1].provider));
            assert!(a <= b);
            if a == b {
                assert!(pair[0].extra["seq"].as_u64() < pair[1].extra["seq"].as_u64());
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_run_concurrently() {
        let fake = Arc::new(full_fake().with_delay(Duration::from_millis(500)));
        let aggregator = Aggregator::new(fake.clone());

        let started = tokio::time::Instant::now();
        aggregator.fetch_all(&Provider::ALL).await.unwrap();

        assert_eq!(fake.max_in_flight.load(Ordering::SeqCst), Provider::ALL.len());
        assert!(started.elapsed() < Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_single_failure_fails_everything() {
        let fake = Arc::new(full_fake().failing(Provider::Priceline, "connection refused"));
        let aggregator = Aggregator::new(fake.clone());

        let err = aggregator.fetch_all(&Provider::ALL).await.unwrap_err();

        match err {
            CoreError::AggregationFailed { cause } => {
                assert_eq!(cause.provider, Provider::Priceline);
                assert_eq!(cause.reason, "connection refused");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // Every provider was still asked.
        assert_eq!(fake.calls(), Provider::ALL.len());
    }

    #[tokio::test]
    async fn test_first_failure_in_provider_order_is_reported() {
        let fake = full_fake()
            .failing(Provider::United, "timeout")
            .failing(Provider::Expedia, "502");
        let aggregator = Aggregator::new(Arc::new(fake));

        let err = aggregator.fetch_all(&Provider::ALL).await.unwrap_err();

        assert!(matches!(
            err,
            CoreError::AggregationFailed { cause } if cause.provider == Provider::Expedia
        ));
    }

    #[tokio::test]
    async fn test_empty_providers_are_fine() {
        let aggregator = Aggregator::new(Arc::new(FakeProviders::default()));

        let set = aggregator.fetch_all(&Provider::ALL).await.unwrap();

        assert!(set.is_empty());
    }
}
