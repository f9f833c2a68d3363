use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::FramecastError;

pub const DEFAULT_BASE_URL: &str = "https://api.replicate.com/v1";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_WAIT_MS: u64 = 600_000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3_000;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_DATABASE_PATH: &str = "./data/framecast.db";

/// Process configuration loaded from a YAML file. Every section is optional.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AppConfig {
    pub provider: Option<ProviderEndpointConfig>,
    pub polling: Option<PollingConfig>,
    pub cache: Option<CacheConfig>,
    pub database: Option<DatabaseConfig>,
}

impl AppConfig {
    pub fn base_url(&self) -> &str {
        self.provider.as_ref()
            .and_then(|p| p.base_url.as_deref())
            .unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.provider.as_ref()
            .and_then(|p| p.request_timeout_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
    }

    pub fn max_wait_ms(&self) -> u64 {
        self.polling.as_ref()
            .and_then(|p| p.max_wait_ms)
            .unwrap_or(DEFAULT_MAX_WAIT_MS)
    }

    pub fn poll_interval_ms(&self) -> u64 {
        self.polling.as_ref()
            .and_then(|p| p.poll_interval_ms)
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS)
    }

    pub fn cache_ttl_secs(&self) -> u64 {
        self.cache.as_ref()
            .and_then(|c| c.ttl_secs)
            .unwrap_or(DEFAULT_CACHE_TTL_SECS)
    }

    pub fn database_path(&self) -> &str {
        self.database.as_ref()
            .and_then(|d| d.path.as_deref())
            .unwrap_or(DEFAULT_DATABASE_PATH)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ProviderEndpointConfig {
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct PollingConfig {
    pub max_wait_ms: Option<u64>,
    pub poll_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CacheConfig {
    pub ttl_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DatabaseConfig {
    pub path: Option<String>,
}

/// Provider settings as stored by the settings collaborator, before the
/// environment fallback is applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub enabled: bool,
    pub default_model_key: Option<String>,
    pub webhook_secret: Option<String>,
}

/// Immutable provider configuration snapshot. Refreshing replaces the whole
/// snapshot.
#[derive(Clone, PartialEq)]
pub struct ProviderConfig {
    pub api_key: String,
    pub enabled: bool,
    pub default_model_key: Option<String>,
    pub webhook_secret: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl ProviderConfig {
    pub fn is_enabled(&self) -> bool {
        self.enabled && !self.api_key.is_empty()
    }

    /// Precondition for every provider call.
    pub fn ensure_usable(&self) -> Result<(), FramecastError> {
        if !self.enabled {
            return Err(FramecastError::ConfigurationMissing("provider is disabled in settings".into()));
        }
        if self.api_key.is_empty() {
            return Err(FramecastError::ConfigurationMissing(
                "no API key in settings or REPLICATE_API_TOKEN".into(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &if self.api_key.is_empty() { "" } else { "[REDACTED]" })
            .field("enabled", &self.enabled)
            .field("default_model_key", &self.default_model_key)
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "[REDACTED]"))
            .field("fetched_at", &self.fetched_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: &str, enabled: bool) -> ProviderConfig {
        ProviderConfig {
            api_key: api_key.to_string(),
            enabled,
            default_model_key: None,
            webhook_secret: Some("whsec_abc".into()),
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.max_wait_ms(), 600_000);
        assert_eq!(config.poll_interval_ms(), 3_000);
        assert_eq!(config.cache_ttl_secs(), 300);
        assert_eq!(config.database_path(), DEFAULT_DATABASE_PATH);
    }

    #[test]
    fn test_app_config_overrides() {
        let config: AppConfig = serde_yaml::from_str(
            "provider:\n  base_url: http://localhost:9000\npolling:\n  poll_interval_ms: 500\n",
        ).unwrap();
        assert_eq!(config.base_url(), "http://localhost:9000");
        assert_eq!(config.poll_interval_ms(), 500);
        assert_eq!(config.max_wait_ms(), DEFAULT_MAX_WAIT_MS);
    }

    #[test]
    fn test_is_enabled_requires_key_and_flag() {
        assert!(config("r8_key", true).is_enabled());
        assert!(!config("", true).is_enabled());
        assert!(!config("r8_key", false).is_enabled());
    }

    #[test]
    fn test_ensure_usable_names_missing_piece() {
        let err = config("", true).ensure_usable().unwrap_err();
        assert!(matches!(err, FramecastError::ConfigurationMissing(msg) if msg.contains("API key")));

        let err = config("r8_key", false).ensure_usable().unwrap_err();
        assert!(matches!(err, FramecastError::ConfigurationMissing(msg) if msg.contains("disabled")));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", config("r8_secret_value", true));
        assert!(!rendered.contains("r8_secret_value"));
        assert!(!rendered.contains("whsec_abc"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
