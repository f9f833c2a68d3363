use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use framecast::clock::SystemClock;
use framecast::config::{self, AppConfig, ConfigProvider};
use framecast::db::Database;
use framecast::errors::FramecastError;
use framecast::jobs::{JobPoller, PollObserver};
use framecast::pipeline::Orchestrator;
use framecast::provider::{ModelCatalog, ReplicateClient};
use tracing::debug;

use super::commands::ContextArgs;

/// Process-wide collaborators shared by every command.
pub struct AppContext {
    pub config: AppConfig,
    pub db: Arc<Database>,
    pub provider_config: Arc<ConfigProvider>,
    api: Arc<ReplicateClient>,
}

impl AppContext {
    pub async fn load(args: &ContextArgs) -> Result<Self, FramecastError> {
        let config = match &args.config {
            Some(path) => config::parse_config(&PathBuf::from(path)).await?,
            None => AppConfig::default(),
        };

        let db_path = args.db.clone().unwrap_or_else(|| config.database_path().to_string());
        debug!(db_path = %db_path, base_url = %config.base_url(), "Loading context");
        let db = Arc::new(Database::new(&db_path)?);

        let provider_config = Arc::new(ConfigProvider::with_ttl(
            db.clone(),
            Arc::new(SystemClock),
            Duration::from_secs(config.cache_ttl_secs()),
        ));
        let api = Arc::new(ReplicateClient::new(
            config.base_url(),
            Duration::from_secs(config.request_timeout_secs()),
        )?);

        Ok(Self { config, db, provider_config, api })
    }

    pub fn orchestrator(&self, observer: Option<Arc<dyn PollObserver>>) -> Orchestrator {
        let orchestrator = Orchestrator::new(
            Arc::new(ModelCatalog::builtin().clone()),
            self.provider_config.clone(),
            self.api.clone(),
            self.db.clone(),
        );
        match observer {
            Some(observer) => orchestrator.with_observer(observer),
            None => orchestrator,
        }
    }

    pub fn poller(&self) -> JobPoller {
        JobPoller::new(self.provider_config.clone(), self.api.clone())
    }
}
