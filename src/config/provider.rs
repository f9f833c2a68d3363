use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Duration;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::errors::FramecastError;
use super::credentials::merge_api_key;
use super::types::{ProviderConfig, ProviderSettings, DEFAULT_CACHE_TTL_SECS};

/// Read side of the external settings store.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn read_settings(&self) -> Result<ProviderSettings, FramecastError>;
}

/// TTL cache in front of the settings store.
///
/// The cached snapshot is swapped as a whole. The lock only guards the
/// pointer and is never held across the store read, so concurrent refreshes
/// can race; the last one to finish wins.
pub struct ConfigProvider {
    store: Arc<dyn SettingsStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    cached: RwLock<Option<Arc<ProviderConfig>>>,
}

impl ConfigProvider {
    pub fn new(store: Arc<dyn SettingsStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(store, clock, std::time::Duration::from_secs(DEFAULT_CACHE_TTL_SECS))
    }

    pub fn with_ttl(store: Arc<dyn SettingsStore>, clock: Arc<dyn Clock>, ttl: std::time::Duration) -> Self {
        Self {
            store,
            clock,
            ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::seconds(DEFAULT_CACHE_TTL_SECS as i64)),
            cached: RwLock::new(None),
        }
    }

    pub async fn get_config(&self) -> Result<Arc<ProviderConfig>, FramecastError> {
        if let Some(snapshot) = self.current() {
            if self.clock.now() - snapshot.fetched_at < self.ttl {
                return Ok(snapshot);
            }
            debug!(fetched_at = %snapshot.fetched_at, "Provider config expired");
        }
        self.refresh().await
    }

    /// Drop the cached snapshot so the next read goes to the store.
    pub fn invalidate(&self) {
        self.swap(None);
        debug!("Provider config cache invalidated");
    }

    pub async fn is_enabled(&self) -> bool {
        self.get_config().await.map(|c| c.is_enabled()).unwrap_or(false)
    }

    async fn refresh(&self) -> Result<Arc<ProviderConfig>, FramecastError> {
        let settings = self.store.read_settings().await?;
        let snapshot = Arc::new(ProviderConfig {
            api_key: merge_api_key(settings.api_key.as_deref()),
            enabled: settings.enabled,
            default_model_key: settings.default_model_key.filter(|k| !k.is_empty()),
            webhook_secret: settings.webhook_secret.filter(|s| !s.is_empty()),
            fetched_at: self.clock.now(),
        });
        info!(
            enabled = snapshot.enabled,
            has_api_key = !snapshot.api_key.is_empty(),
            default_model = ?snapshot.default_model_key,
            "Provider config refreshed"
        );
        self.swap(Some(snapshot.clone()));
        Ok(snapshot)
    }

    fn current(&self) -> Option<Arc<ProviderConfig>> {
        match self.cached.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn swap(&self, next: Option<Arc<ProviderConfig>>) {
        match self.cached.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    struct CountingStore {
        reads: AtomicU32,
        settings: Mutex<ProviderSettings>,
    }

    impl CountingStore {
        fn new(settings: ProviderSettings) -> Self {
            Self { reads: AtomicU32::new(0), settings: Mutex::new(settings) }
        }

        fn reads(&self) -> u32 {
            self.reads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SettingsStore for CountingStore {
        async fn read_settings(&self) -> Result<ProviderSettings, FramecastError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.settings.lock().unwrap().clone())
        }
    }

    fn enabled_settings() -> ProviderSettings {
        ProviderSettings {
            api_key: Some("r8_test".into()),
            enabled: true,
            default_model_key: Some("luma-ray".into()),
            webhook_secret: None,
        }
    }

    fn provider(store: Arc<CountingStore>, clock: Arc<ManualClock>) -> ConfigProvider {
        ConfigProvider::new(store, clock)
    }

    #[tokio::test]
    async fn test_two_reads_within_ttl_hit_cache() {
        let store = Arc::new(CountingStore::new(enabled_settings()));
        let clock = Arc::new(ManualClock::default());
        let provider = provider(store.clone(), clock.clone());

        let first = provider.get_config().await.unwrap();
        clock.advance(Duration::seconds(299));
        let second = provider.get_config().await.unwrap();

        assert_eq!(*first, *second);
        assert_eq!(store.reads(), 1);
    }

    #[tokio::test]
    async fn test_expired_snapshot_is_refreshed() {
        let store = Arc::new(CountingStore::new(enabled_settings()));
        let clock = Arc::new(ManualClock::default());
        let provider = provider(store.clone(), clock.clone());

        provider.get_config().await.unwrap();
        clock.advance(Duration::seconds(300));
        provider.get_config().await.unwrap();

        assert_eq!(store.reads(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_exactly_one_refresh() {
        let store = Arc::new(CountingStore::new(enabled_settings()));
        let clock = Arc::new(ManualClock::default());
        let provider = provider(store.clone(), clock);

        provider.get_config().await.unwrap();
        provider.invalidate();
        provider.get_config().await.unwrap();
        provider.get_config().await.unwrap();

        assert_eq!(store.reads(), 2);
    }

    #[tokio::test]
    async fn test_refresh_replaces_snapshot_wholesale() {
        let store = Arc::new(CountingStore::new(enabled_settings()));
        let clock = Arc::new(ManualClock::default());
        let provider = provider(store.clone(), clock);

        let before = provider.get_config().await.unwrap();
        store.settings.lock().unwrap().enabled = false;
        provider.invalidate();
        let after = provider.get_config().await.unwrap();

        assert!(before.enabled);
        assert!(!after.enabled);
    }

    #[tokio::test]
    async fn test_is_enabled_requires_key() {
        let store = Arc::new(CountingStore::new(ProviderSettings {
            api_key: Some("r8_live".into()),
            enabled: true,
            ..Default::default()
        }));
        let provider = provider(store, Arc::new(ManualClock::default()));
        assert!(provider.is_enabled().await);

        let disabled = Arc::new(CountingStore::new(ProviderSettings {
            api_key: Some("r8_live".into()),
            enabled: false,
            ..Default::default()
        }));
        let provider = ConfigProvider::new(disabled, Arc::new(ManualClock::default()));
        assert!(!provider.is_enabled().await);
    }

    #[tokio::test]
    async fn test_empty_default_model_is_treated_as_unset() {
        let store = Arc::new(CountingStore::new(ProviderSettings {
            api_key: Some("r8_live".into()),
            enabled: true,
            default_model_key: Some(String::new()),
            webhook_secret: Some(String::new()),
        }));
        let provider = provider(store, Arc::new(ManualClock::default()));
        let config = provider.get_config().await.unwrap();
        assert!(config.default_model_key.is_none());
        assert!(config.webhook_secret.is_none());
    }
}
