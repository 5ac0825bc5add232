pub mod search;
pub mod pagination;
pub mod provider;
pub mod aggregator;
pub mod cache;
pub mod service;

pub use aggregator::Aggregator;
pub use cache::{CacheEntry, CacheError, MemoryResultCache, ResultCache};
pub use pagination::Paginator;
pub use provider::{ProviderClient, ProviderUnavailable};
pub use search::{PageSpec, ResultSet};
pub use service::{SearchPage, SearchService, SearchSettings};

#[derive(Debug, Clone, thiserror::Error)]
pub enum CoreError {
    #[error("aggregation failed: {cause}")]
    AggregationFailed {
        #[source]
        cause: ProviderUnavailable,
    },
    #[error("invalid query parameter `{name}`: {value:?}")]
    InvalidQueryParameter { name: &'static str, value: String },
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
pub(crate) mod testing;
