pub mod app_config;
pub mod provider_client;
pub mod redis_repo;

pub use provider_client::HttpProviderClient;
pub use redis_repo::RedisResultCache;
