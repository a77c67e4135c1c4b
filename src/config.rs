//! Configuration management for Floodgate.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{FloodgateError, Result};
use crate::ratelimit::RateLimit;
use crate::store::{CounterStore, MemoryStore, RedisPool, RedisStore};

/// Main configuration for Floodgate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FloodgateConfig {
    /// Backing store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Named limit rules
    #[serde(default)]
    pub limits: HashMap<String, LimitRule>,
}

/// Which counter store backs the limiters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreConfig {
    /// In-process store (single instance only)
    Memory,
    /// Redis store (distributed)
    Redis {
        /// Server URL
        #[serde(default = "default_redis_url")]
        url: String,

        /// Pooled connection count
        #[serde(default = "default_connections")]
        connections: usize,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Memory
    }
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_connections() -> usize {
    1
}

/// A limit rule specifying window capacity and length.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LimitRule {
    /// Operations allowed per window
    pub max_requests: u64,

    /// Window length in seconds
    pub period_secs: u64,
}

impl FloodgateConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: FloodgateConfig =
            serde_yaml::from_str(yaml).map_err(|e| FloodgateError::Config(e.to_string()))?;

        info!(limits = config.limits.len(), "Configuration loaded");
        Ok(config)
    }

    /// Construct the configured counter store.
    pub async fn build_store(&self) -> Result<Arc<dyn CounterStore>> {
        match &self.store {
            StoreConfig::Memory => Ok(Arc::new(MemoryStore::new())),
            StoreConfig::Redis { url, connections } => {
                let pool = RedisPool::connect(url, *connections).await?;
                Ok(Arc::new(RedisStore::with_pool(pool)))
            }
        }
    }

    /// Build the limiter for the named rule against `store`.
    pub fn limiter(&self, name: &str, store: Arc<dyn CounterStore>) -> Result<RateLimit> {
        let rule = self.limits.get(name).ok_or_else(|| {
            FloodgateError::Config(format!("No limit named '{name}' in configuration"))
        })?;

        RateLimit::new(name, rule.max_requests, rule.period_secs, store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_defaults_to_memory_store() {
        let config = FloodgateConfig::from_yaml("{}").unwrap();
        assert!(matches!(config.store, StoreConfig::Memory));
        assert!(config.limits.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
store:
  backend: redis
  url: redis://cache.internal:6379
  connections: 4
limits:
  api_calls:
    max_requests: 100
    period_secs: 60
  logins:
    max_requests: 5
    period_secs: 300
"#;
        let config = FloodgateConfig::from_yaml(yaml).unwrap();

        match &config.store {
            StoreConfig::Redis { url, connections } => {
                assert_eq!(url, "redis://cache.internal:6379");
                assert_eq!(*connections, 4);
            }
            other => panic!("unexpected store config: {other:?}"),
        }

        assert_eq!(config.limits.len(), 2);
        assert_eq!(config.limits["api_calls"].max_requests, 100);
        assert_eq!(config.limits["logins"].period_secs, 300);
    }

    #[test]
    fn test_redis_store_defaults() {
        let config = FloodgateConfig::from_yaml("store:\n  backend: redis\n").unwrap();

        match &config.store {
            StoreConfig::Redis { url, connections } => {
                assert_eq!(url, "redis://127.0.0.1:6379");
                assert_eq!(*connections, 1);
            }
            other => panic!("unexpected store config: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_yaml_is_a_config_error() {
        let result = FloodgateConfig::from_yaml("limits: [not, a, map]");
        assert!(matches!(result, Err(FloodgateError::Config(_))));
    }

    #[tokio::test]
    async fn test_limiter_built_from_named_rule() {
        let yaml = r#"
limits:
  api_calls:
    max_requests: 3
    period_secs: 60
"#;
        let config = FloodgateConfig::from_yaml(yaml).unwrap();
        let store = config.build_store().await.unwrap();
        let limiter = config.limiter("api_calls", store).unwrap();

        assert_eq!(limiter.name(), "api_calls");
        assert_eq!(limiter.max_requests(), 3);

        for _ in 0..3 {
            assert!(limiter.check("alice").await.unwrap());
        }
        assert!(!limiter.check("alice").await.unwrap());
    }

    #[test]
    fn test_unknown_limit_name_rejected() {
        let config = FloodgateConfig::from_yaml("{}").unwrap();
        let store: Arc<dyn CounterStore> = Arc::new(MemoryStore::new());

        let result = config.limiter("missing", store);
        assert!(matches!(result, Err(FloodgateError::Config(_))));
    }

    #[test]
    fn test_zero_capacity_rule_rejected_at_build() {
        let yaml = r#"
limits:
  broken:
    max_requests: 0
    period_secs: 60
"#;
        let config = FloodgateConfig::from_yaml(yaml).unwrap();
        let store: Arc<dyn CounterStore> = Arc::new(MemoryStore::new());

        let result = config.limiter("broken", store);
        assert!(matches!(result, Err(FloodgateError::Config(_))));
    }
}
