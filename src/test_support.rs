//! Scripted collaborators for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::clock::ManualClock;
use crate::config::{ConfigProvider, ProviderConfig, ProviderSettings, SettingsStore};
use crate::errors::FramecastError;
use crate::provider::{JobRecord, JobRequest, JobStatus, PredictionApi};

pub struct StaticSettings(pub ProviderSettings);

#[async_trait]
impl SettingsStore for StaticSettings {
    async fn read_settings(&self) -> Result<ProviderSettings, FramecastError> {
        Ok(self.0.clone())
    }
}

pub fn config_provider(settings: ProviderSettings) -> Arc<ConfigProvider> {
    Arc::new(ConfigProvider::new(
        Arc::new(StaticSettings(settings)),
        Arc::new(ManualClock::default()),
    ))
}

pub fn enabled_config_provider() -> Arc<ConfigProvider> {
    config_provider(ProviderSettings {
        api_key: Some("r8_unit_test".into()),
        enabled: true,
        default_model_key: None,
        webhook_secret: None,
    })
}

pub fn record(id: &str, status: JobStatus) -> JobRecord {
    JobRecord {
        id: id.to_string(),
        status,
        output: None,
        error_message: None,
        created_at: Utc::now(),
        started_at: None,
        completed_at: None,
        metrics: None,
    }
}

/// Provider fake that replays queued responses. Once the status queue is
/// drained, the last returned record repeats.
#[derive(Default)]
pub struct ScriptedApi {
    creates: Mutex<VecDeque<Result<JobRecord, FramecastError>>>,
    gets: Mutex<VecDeque<Result<JobRecord, FramecastError>>>,
    cancels: Mutex<VecDeque<Result<(), FramecastError>>>,
    last_get: Mutex<Option<JobRecord>>,
    get_delay: Mutex<Option<Duration>>,
    requests: Mutex<Vec<(String, JobRequest)>>,
    create_calls: AtomicU32,
    get_calls: AtomicU32,
    cancel_calls: AtomicU32,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statuses(statuses: &[JobStatus]) -> Self {
        let api = Self::new();
        for status in statuses {
            api.push_get(Ok(record("p1", *status)));
        }
        api
    }

    pub fn push_create(&self, result: Result<JobRecord, FramecastError>) {
        self.creates.lock().unwrap().push_back(result);
    }

    pub fn push_get(&self, result: Result<JobRecord, FramecastError>) {
        self.gets.lock().unwrap().push_back(result);
    }

    pub fn push_cancel(&self, result: Result<(), FramecastError>) {
        self.cancels.lock().unwrap().push_back(result);
    }

    /// Make every status fetch take `delay` of (tokio) time.
    pub fn set_get_delay(&self, delay: Duration) {
        *self.get_delay.lock().unwrap() = Some(delay);
    }

    pub fn create_calls(&self) -> u32 {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> u32 {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn cancel_calls(&self) -> u32 {
        self.cancel_calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<(String, JobRequest)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PredictionApi for ScriptedApi {
    async fn create_prediction(
        &self,
        _config: &ProviderConfig,
        provider_model_id: &str,
        request: &JobRequest,
    ) -> Result<JobRecord, FramecastError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push((provider_model_id.to_string(), request.clone()));
        self.creates.lock().unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(record("p1", JobStatus::Starting)))
    }

    async fn get_prediction(&self, _config: &ProviderConfig, _job_id: &str) -> Result<JobRecord, FramecastError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.get_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.gets.lock().unwrap().pop_front();
        match next {
            Some(Ok(record)) => {
                *self.last_get.lock().unwrap() = Some(record.clone());
                Ok(record)
            }
            Some(Err(e)) => Err(e),
            None => self.last_get.lock().unwrap()
                .clone()
                .ok_or_else(|| FramecastError::Internal("no scripted status".into())),
        }
    }

    async fn cancel_prediction(&self, _config: &ProviderConfig, _job_id: &str) -> Result<(), FramecastError> {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
        self.cancels.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    fn provider_name(&self) -> &str { "scripted" }
}
