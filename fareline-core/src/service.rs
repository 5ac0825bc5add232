//! Per-request orchestration: cache check, aggregate on miss, paginate.

use fareline_shared::{FlightResult, Provider};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::aggregator::Aggregator;
use crate::cache::ResultCache;
use crate::provider::ProviderClient;
use crate::search::{PageSpec, ResultSet};
use crate::CoreResult;

pub const DEFAULT_CACHE_KEY: &str = "allFlightsData";
pub const DEFAULT_TTL: Duration = Duration::from_secs(180);

#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// Single logical key for the whole dataset. Page parameters are never part of it.
    pub cache_key: String,
    pub ttl: Duration,
    /// Concurrent cold requests share one fan-out and its outcome, success or failure.
    pub single_flight: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            ttl: DEFAULT_TTL,
            single_flight: true,
        }
    }
}

/// One page of a [`ResultSet`]. Serializes as `{"results": [...]}`.
#[derive(Debug, Clone)]
pub struct SearchPage {
    set: ResultSet,
    spec: PageSpec,
    pub cache_hit: bool,
}

impl SearchPage {
    fn new(set: ResultSet, spec: PageSpec, cache_hit: bool) -> Self {
        Self { set, spec, cache_hit }
    }

    pub fn results(&self) -> &[FlightResult] {
        self.set.page(self.spec)
    }

    /// Size of the full set this page was cut from.
    pub fn total(&self) -> usize {
        self.set.len()
    }
}

impl Serialize for SearchPage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut body = serializer.serialize_struct("SearchPage", 1)?;
        body.serialize_field("results", self.results())?;
        body.end()
    }
}

/// `None` until the leading refresh finishes.
type Outcome = Option<CoreResult<ResultSet>>;

enum Role<'a> {
    Leader(InFlight<'a>),
    Follower(watch::Receiver<Outcome>),
}

/// Held by the request running the shared refresh. Dropping it, whether on
/// completion or cancellation, frees the slot for the next leader.
struct InFlight<'a> {
    slot: &'a Mutex<Option<watch::Receiver<Outcome>>>,
    tx: watch::Sender<Outcome>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

pub struct SearchService {
    aggregator: Aggregator,
    cache: Arc<dyn ResultCache>,
    providers: Vec<Provider>,
    settings: SearchSettings,
    in_flight: Mutex<Option<watch::Receiver<Outcome>>>,
}

impl SearchService {
    pub fn new(
        client: Arc<dyn ProviderClient>,
        cache: Arc<dyn ResultCache>,
        settings: SearchSettings,
    ) -> Self {
        Self {
            aggregator: Aggregator::new(client),
            cache,
            providers: Provider::ALL.to_vec(),
            settings,
            in_flight: Mutex::new(None),
        }
    }

    /// Serve one page. On an aggregation failure nothing is written to the
    /// cache and no partial page is produced.
    pub async fn search(&self, spec: PageSpec) -> CoreResult<SearchPage> {
        if let Some(set) = self.cached().await {
            return Ok(SearchPage::new(set, spec, true));
        }

        if !self.settings.single_flight {
            let set = self.refresh().await?;
            return Ok(SearchPage::new(set, spec, false));
        }

        loop {
            match self.join_or_lead() {
                Role::Leader(flight) => {
                    // A previous leader may have populated the cache since our miss.
                    if let Some(set) = self.cached().await {
                        flight.tx.send_replace(Some(Ok(set.clone())));
                        return Ok(SearchPage::new(set, spec, true));
                    }
                    let outcome = self.refresh().await;
                    flight.tx.send_replace(Some(outcome.clone()));
                    return outcome.map(|set| SearchPage::new(set, spec, false));
                }
                Role::Follower(mut rx) => {
                    let shared = rx.wait_for(Option::is_some).await.map(|outcome| outcome.clone());
                    match shared {
                        Ok(Some(outcome)) => {
                            debug!(key = %self.settings.cache_key, "joined in-flight refresh");
                            return outcome.map(|set| SearchPage::new(set, spec, false));
                        }
                        // Leader was cancelled before finishing; try again.
                        Ok(None) | Err(_) => continue,
                    }
                }
            }
        }
    }

    fn join_or_lead(&self) -> Role<'_> {
        let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(rx) = slot.as_ref() {
            return Role::Follower(rx.clone());
        }
        let (tx, rx) = watch::channel(None);
        *slot = Some(rx);
        Role::Leader(InFlight {
            slot: &self.in_flight,
            tx,
        })
    }

    /// Cache lookup. Backend errors are treated as a miss.
    async fn cached(&self) -> Option<ResultSet> {
        match self.cache.get(&self.settings.cache_key).await {
            Ok(Some(set)) => {
                debug!(key = %self.settings.cache_key, total = set.len(), "cache hit");
                Some(set)
            }
            Ok(None) => {
                debug!(key = %self.settings.cache_key, "cache miss");
                None
            }
            Err(e) => {
                warn!(key = %self.settings.cache_key, error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }

    async fn refresh(&self) -> CoreResult<ResultSet> {
        let set = self.aggregator.fetch_all(&self.providers).await?;

        if let Err(e) = self
            .cache
            .put(&self.settings.cache_key, set.clone(), self.settings.ttl)
            .await
        {
            warn!(key = %self.settings.cache_key, error = %e, "cache write failed");
        } else {
            info!(
                key = %self.settings.cache_key,
                total = set.len(),
                ttl_secs = self.settings.ttl.as_secs(),
                "cache populated"
            );
        }
        Ok(set)
    }
}
