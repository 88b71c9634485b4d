//! Configuration loading helpers.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::cache::PagedCacheConfig;
use crate::device::{FileStore, MemoryStore, PageStore, SegmentedStore};
use crate::error::ReadError;
use crate::http::HttpRangeSource;
use crate::reader::RangeReader;

/// Errors returned by configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error while reading config files or opening a store.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// Invalid value for a key.
    #[error("invalid value for {key}: {value}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Raw value string.
        value: String,
    },
    /// Unknown configuration key.
    #[error("unknown config key: {0}")]
    UnknownKey(String),
    /// Missing required configuration field.
    #[error("missing required field: {0}")]
    MissingField(String),
    /// HTTP client construction or size probe failed.
    #[error("http setup failed: {0}")]
    Http(#[from] ReadError),
}

impl From<reqwest::Error> for ConfigError {
    fn from(err: reqwest::Error) -> Self {
        ConfigError::Http(ReadError::Http(err))
    }
}

/// Top-level configuration schema.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RangeCacheConfig {
    /// Paged cache configuration.
    pub cache: Option<CacheConfigSpec>,
    /// Page store configuration.
    pub store: Option<StoreConfigSpec>,
    /// Upstream HTTP configuration.
    pub http: Option<HttpConfigSpec>,
}

impl RangeCacheConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Load configuration from the `RANGECACHE_CONFIG` env var (if set),
    /// then apply `RANGECACHE__section__field` overrides.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let config_path = env::var("RANGECACHE_CONFIG").ok();
        let mut config = match config_path {
            Some(path) => Self::load_from_path(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment overrides in-place.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        for (key, value) in env::vars() {
            if !key.starts_with("RANGECACHE__") {
                continue;
            }
            let path = key["RANGECACHE__".len()..].to_ascii_lowercase();
            let parts: Vec<&str> = path.split("__").collect();
            let value = value.trim().to_string();

            match parts.as_slice() {
                ["cache", "enabled"] => {
                    self.cache_mut().enabled = Some(parse_value(&key, &value)?);
                }
                ["cache", "page_size"] => {
                    self.cache_mut().page_size = Some(parse_value(&key, &value)?);
                }
                ["store", "kind"] => {
                    self.store_mut().kind = Some(value);
                }
                ["store", "path"] => {
                    self.store_mut().path = Some(PathBuf::from(value));
                }
                ["store", "base_dir"] => {
                    self.store_mut().base_dir = Some(PathBuf::from(value));
                }
                ["store", "prefix"] => {
                    self.store_mut().prefix = Some(value);
                }
                ["store", "segment_size"] => {
                    self.store_mut().segment_size = Some(parse_value(&key, &value)?);
                }
                ["http", "url"] => {
                    self.http_mut().url = Some(value);
                }
                ["http", "timeout_ms"] => {
                    self.http_mut().timeout_ms = Some(parse_value(&key, &value)?);
                }
                ["http", "user_agent"] => {
                    self.http_mut().user_agent = Some(value);
                }
                _ => return Err(ConfigError::UnknownKey(key)),
            }
        }

        Ok(())
    }

    /// Build a `PagedCacheConfig` when the cache is enabled.
    pub fn to_paged_cache_config(&self) -> Option<PagedCacheConfig> {
        let cache = self.cache.as_ref()?;
        if cache.enabled != Some(true) {
            return None;
        }

        let mut config = PagedCacheConfig::default();
        cache.apply_to(&mut config);
        Some(config)
    }

    /// Resolve a store configuration, if present.
    pub fn store_config(&self) -> Result<Option<StoreConfig>, ConfigError> {
        match self.store.as_ref() {
            Some(spec) => Ok(Some(spec.resolve()?)),
            None => Ok(None),
        }
    }

    /// Open the page store from the configuration, if present.
    pub fn open_store(&self) -> Result<Option<Box<dyn PageStore>>, ConfigError> {
        match self.store_config()? {
            Some(store) => Ok(Some(store.open()?)),
            None => Ok(None),
        }
    }

    /// Build the HTTP client from the `[http]` section.
    pub fn http_client(&self) -> Result<Client, ConfigError> {
        let mut builder = Client::builder();
        if let Some(http) = &self.http {
            if let Some(timeout_ms) = http.timeout_ms {
                builder = builder.timeout(Duration::from_millis(timeout_ms));
            }
            if let Some(user_agent) = &http.user_agent {
                builder = builder.user_agent(user_agent.clone());
            }
        }
        Ok(builder.build()?)
    }

    /// Open a reader for the configured URL, with the paged cache attached
    /// when it is enabled.
    ///
    /// An enabled cache without a `[store]` section caches in memory.
    pub fn open_reader(&self) -> Result<RangeReader<HttpRangeSource>, ConfigError> {
        let url = self
            .http
            .as_ref()
            .and_then(|http| http.url.clone())
            .ok_or_else(|| ConfigError::MissingField("http.url".into()))?;
        let reader = RangeReader::with_client(url, self.http_client()?);

        let Some(cache) = self.to_paged_cache_config() else {
            return Ok(reader);
        };
        let store: Box<dyn PageStore> = match self.open_store()? {
            Some(store) => store,
            None => Box::new(MemoryStore::new()),
        };
        Ok(reader.with_paged_cache(store, cache)?)
    }

    fn cache_mut(&mut self) -> &mut CacheConfigSpec {
        self.cache.get_or_insert_with(CacheConfigSpec::default)
    }

    fn store_mut(&mut self) -> &mut StoreConfigSpec {
        self.store.get_or_insert_with(StoreConfigSpec::default)
    }

    fn http_mut(&mut self) -> &mut HttpConfigSpec {
        self.http.get_or_insert_with(HttpConfigSpec::default)
    }
}

/// Paged cache configuration overrides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheConfigSpec {
    /// Whether to enable the paged cache.
    pub enabled: Option<bool>,
    /// Page size in bytes; `0` selects the default.
    pub page_size: Option<u64>,
}

impl CacheConfigSpec {
    fn apply_to(&self, config: &mut PagedCacheConfig) {
        if let Some(value) = self.page_size {
            config.page_size = value;
        }
    }
}

/// Upstream HTTP configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpConfigSpec {
    /// Resource URL.
    pub url: Option<String>,
    /// Whole-request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// `User-Agent` header value.
    pub user_agent: Option<String>,
}

/// Page store configuration from TOML/env.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfigSpec {
    /// Store kind: "single_file", "segmented" or "memory".
    pub kind: Option<String>,
    /// Path for single-file store.
    pub path: Option<PathBuf>,
    /// Base directory for segmented store.
    pub base_dir: Option<PathBuf>,
    /// File prefix for segmented store.
    pub prefix: Option<String>,
    /// Segment size for segmented store.
    pub segment_size: Option<u64>,
}

impl StoreConfigSpec {
    fn resolve(&self) -> Result<StoreConfig, ConfigError> {
        let kind = self.kind.as_deref().map(|v| v.to_ascii_lowercase());

        match kind.as_deref() {
            Some("single_file") => {
                let path = self
                    .path
                    .clone()
                    .ok_or_else(|| ConfigError::MissingField("store.path".into()))?;
                Ok(StoreConfig::SingleFile { path })
            }
            Some("segmented") => self.resolve_segmented(),
            Some("memory") => Ok(StoreConfig::Memory),
            None => {
                if let Some(path) = &self.path {
                    return Ok(StoreConfig::SingleFile { path: path.clone() });
                }
                if self.base_dir.is_some() || self.prefix.is_some() || self.segment_size.is_some() {
                    return self.resolve_segmented();
                }
                Err(ConfigError::MissingField("store.kind".into()))
            }
            Some(other) => Err(ConfigError::InvalidValue {
                key: "store.kind".into(),
                value: other.into(),
            }),
        }
    }

    fn resolve_segmented(&self) -> Result<StoreConfig, ConfigError> {
        let base_dir = self
            .base_dir
            .clone()
            .ok_or_else(|| ConfigError::MissingField("store.base_dir".into()))?;
        let prefix = self
            .prefix
            .clone()
            .ok_or_else(|| ConfigError::MissingField("store.prefix".into()))?;
        let segment_size = self
            .segment_size
            .ok_or_else(|| ConfigError::MissingField("store.segment_size".into()))?;
        if segment_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "store.segment_size".into(),
                value: "0".into(),
            });
        }
        Ok(StoreConfig::Segmented {
            base_dir,
            prefix,
            segment_size,
        })
    }
}

/// Resolved page store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// Single file store.
    SingleFile {
        /// Path to the cache file.
        path: PathBuf,
    },
    /// Segmented store.
    Segmented {
        /// Base directory for segments.
        base_dir: PathBuf,
        /// Segment filename prefix.
        prefix: String,
        /// Segment size in bytes.
        segment_size: u64,
    },
    /// In-memory store.
    Memory,
}

impl StoreConfig {
    /// Open the page store described by this config.
    pub fn open(&self) -> Result<Box<dyn PageStore>, ConfigError> {
        match self {
            StoreConfig::SingleFile { path } => Ok(Box::new(FileStore::open(path, true)?)),
            StoreConfig::Segmented {
                base_dir,
                prefix,
                segment_size,
            } => Ok(Box::new(SegmentedStore::new(base_dir, prefix, *segment_size)?)),
            StoreConfig::Memory => Ok(Box::new(MemoryStore::new())),
        }
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
