use fareline_core::SearchSettings;
use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub providers: ProvidersConfig,
    pub cache: CacheConfig,
    pub redis: RedisConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProvidersConfig {
    /// Scraper root; the provider name is appended verbatim.
    pub base_url: String,
    /// Upper bound on a single provider fetch.
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Memory,
    Redis,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub key: String,
    pub ttl_seconds: u64,
    #[serde(default = "default_single_flight")]
    pub single_flight: bool,
}

fn default_single_flight() -> bool { true }

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

impl CacheConfig {
    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            cache_key: self.key.clone(),
            ttl: Duration::from_secs(self.ttl_seconds),
            single_flight: self.single_flight,
        }
    }
}

impl ProvidersConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Self::builder()?
            .add_source(config::File::with_name("config/default").required(false))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `FARELINE_CACHE__TTL_SECONDS=60` sets `cache.ttl_seconds`
            .add_source(
                config::Environment::with_prefix("FARELINE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Built-in defaults every other source layers on top of.
    pub fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        config::Config::builder()
            .set_default("server.port", 8000_i64)?
            .set_default("providers.base_url", "http://localhost:9000/scrapers/")?
            .set_default("providers.timeout_seconds", 10_i64)?
            .set_default("cache.backend", "memory")?
            .set_default("cache.key", fareline_core::service::DEFAULT_CACHE_KEY)?
            .set_default("cache.ttl_seconds", fareline_core::service::DEFAULT_TTL.as_secs() as i64)?
            .set_default("cache.single_flight", true)?
            .set_default("redis.url", "redis://127.0.0.1:6379")
    }

    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.providers.base_url.trim().is_empty() {
            return Err(config::ConfigError::Message("providers.base_url must not be empty".into()));
        }
        if self.providers.timeout_seconds == 0 {
            return Err(config::ConfigError::Message("providers.timeout_seconds must be positive".into()));
        }
        if self.cache.ttl_seconds == 0 {
            return Err(config::ConfigError::Message("cache.ttl_seconds must be positive".into()));
        }
        if self.cache.key.is_empty() {
            return Err(config::ConfigError::Message("cache.key must not be empty".into()));
        }
        Ok(())
    }
}
