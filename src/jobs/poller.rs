use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{AppConfig, ConfigProvider, DEFAULT_MAX_WAIT_MS, DEFAULT_POLL_INTERVAL_MS};
use crate::errors::FramecastError;
use crate::provider::{JobRecord, JobStatus, PredictionApi};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub max_wait: Duration,
    pub poll_interval: Duration,
}

impl PollOptions {
    pub fn new(max_wait: Duration, poll_interval: Duration) -> Self {
        Self { max_wait, poll_interval }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Duration::from_millis(config.max_wait_ms()),
            Duration::from_millis(config.poll_interval_ms()),
        )
    }

    /// Number of status fetches that fit in the wait budget, rounded up.
    pub fn max_fetches(&self) -> u64 {
        let interval = self.poll_interval.as_millis().max(1);
        let fetches = self.max_wait.as_millis().div_ceil(interval);
        u64::try_from(fetches).unwrap_or(u64::MAX).max(1)
    }
}

impl Default for PollOptions {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_MAX_WAIT_MS),
            Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        )
    }
}

/// Hook for callers who want to see every observed status (progress bars,
/// metrics). Observers must not block.
pub trait PollObserver: Send + Sync {
    fn on_status(&self, job_id: &str, attempt: u64, status: JobStatus);
}

#[derive(Debug, Default)]
pub struct NoopObserver;

impl PollObserver for NoopObserver {
    fn on_status(&self, _job_id: &str, _attempt: u64, _status: JobStatus) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The provider accepted the cancellation request.
    Requested,
    /// The job had already finished; nothing was changed.
    AlreadyTerminal(JobStatus),
}

pub struct JobPoller {
    config: Arc<ConfigProvider>,
    api: Arc<dyn PredictionApi>,
    observer: Arc<dyn PollObserver>,
}

impl JobPoller {
    pub fn new(config: Arc<ConfigProvider>, api: Arc<dyn PredictionApi>) -> Self {
        Self { config, api, observer: Arc::new(NoopObserver) }
    }

    pub fn with_observer(mut self, observer: Arc<dyn PollObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// One status fetch, no waiting.
    pub async fn fetch(&self, job_id: &str) -> Result<JobRecord, FramecastError> {
        let config = self.config.get_config().await?;
        config.ensure_usable()?;
        self.api.get_prediction(&config, job_id).await
    }

    /// Poll at a fixed interval until the job is terminal or the budget in
    /// `options` is spent, whichever of the fetch cap or the elapsed
    /// `max_wait` comes first. A timeout leaves the remote job running.
    pub async fn await_completion(
        &self,
        job_id: &str,
        options: PollOptions,
    ) -> Result<JobRecord, FramecastError> {
        let max_fetches = options.max_fetches();
        let started = Instant::now();
        let mut projected: Option<JobStatus> = None;
        let mut fetches = 0;

        for attempt in 1..=max_fetches {
            let mut record = self.fetch(job_id).await?;

            let status = projected.map_or(record.status, |prev| prev.advance(record.status));
            if status != record.status {
                warn!(job_id = %job_id, reported = %record.status, kept = %status, "Provider reported a regressive status");
                record.status = status;
            }
            projected = Some(status);

            self.observer.on_status(job_id, attempt, status);
            debug!(job_id = %job_id, attempt, max_fetches, status = %status, "Polled prediction");

            match status {
                JobStatus::Succeeded => {
                    info!(job_id = %job_id, attempts = attempt, "Prediction succeeded");
                    return Ok(record);
                }
                JobStatus::Failed => {
                    let message = record.error_message
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| format!("job {} failed without an error message", job_id));
                    warn!(job_id = %job_id, error = %message, "Prediction failed");
                    return Err(FramecastError::GenerationFailed(message));
                }
                JobStatus::Canceled => {
                    info!(job_id = %job_id, "Prediction was canceled");
                    return Err(FramecastError::Canceled(format!("job {} was canceled", job_id)));
                }
                JobStatus::Starting | JobStatus::Processing => {}
            }

            fetches = attempt;
            if attempt == max_fetches {
                break;
            }
            // Slow fetches count against the budget too.
            let remaining = options.max_wait.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                break;
            }
            tokio::time::sleep(options.poll_interval.min(remaining)).await;
        }

        let waited_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        warn!(job_id = %job_id, waited_ms, fetches, "Gave up waiting for prediction");
        Err(FramecastError::Timeout { job_id: job_id.to_string(), waited_ms })
    }

    /// Ask the provider to stop a job. Canceling a job that already finished
    /// is acknowledged as a no-op.
    pub async fn cancel(&self, job_id: &str) -> Result<CancelOutcome, FramecastError> {
        let config = self.config.get_config().await?;
        config.ensure_usable()?;

        match self.api.cancel_prediction(&config, job_id).await {
            Ok(()) => {
                info!(job_id = %job_id, "Cancellation requested");
                Ok(CancelOutcome::Requested)
            }
            Err(e @ FramecastError::TransportError(_)) => Err(e),
            Err(e) => match self.api.get_prediction(&config, job_id).await {
                Ok(record) if record.status.is_terminal() => {
                    debug!(job_id = %job_id, status = %record.status, "Cancel on finished job ignored");
                    Ok(CancelOutcome::AlreadyTerminal(record.status))
                }
                _ => Err(e),
            },
        }
    }
}
