use async_trait::async_trait;

use crate::config::ProviderConfig;
use crate::errors::FramecastError;
use super::types::{JobRecord, JobRequest};

/// The provider's prediction endpoints. Credentials come from the snapshot
/// passed with each call so a refreshed key takes effect immediately.
#[async_trait]
pub trait PredictionApi: Send + Sync {
    /// `POST /models/{provider_model_id}/predictions`
    async fn create_prediction(
        &self,
        config: &ProviderConfig,
        provider_model_id: &str,
        request: &JobRequest,
    ) -> Result<JobRecord, FramecastError>;

    /// `GET /predictions/{id}`
    async fn get_prediction(
        &self,
        config: &ProviderConfig,
        job_id: &str,
    ) -> Result<JobRecord, FramecastError>;

    /// `POST /predictions/{id}/cancel`
    async fn cancel_prediction(
        &self,
        config: &ProviderConfig,
        job_id: &str,
    ) -> Result<(), FramecastError>;

    /// Provider name for logging and the usage ledger
    fn provider_name(&self) -> &str;
}
