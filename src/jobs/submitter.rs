use std::sync::Arc;

use tracing::info;

use crate::config::ConfigProvider;
use crate::errors::FramecastError;
use crate::provider::{JobInput, JobRecord, JobRequest, ModelCatalog, PredictionApi, RawInput, WebhookEvent};

#[derive(Debug, Clone, Default)]
pub struct SubmitOptions {
    pub webhook_url: Option<String>,
    pub webhook_events_filter: Option<Vec<WebhookEvent>>,
}

/// Turns a model key and caller input into one creation request.
pub struct JobSubmitter {
    catalog: Arc<ModelCatalog>,
    config: Arc<ConfigProvider>,
    api: Arc<dyn PredictionApi>,
}

impl JobSubmitter {
    pub fn new(catalog: Arc<ModelCatalog>, config: Arc<ConfigProvider>, api: Arc<dyn PredictionApi>) -> Self {
        Self { catalog, config, api }
    }

    pub async fn submit(
        &self,
        model_key: &str,
        raw_input: &RawInput,
        options: &SubmitOptions,
    ) -> Result<JobRecord, FramecastError> {
        // Everything that can be rejected locally is checked before the
        // provider sees a request.
        let model = self.catalog.lookup_by_key(model_key)?;
        let input = JobInput::build(model, raw_input)?;
        let config = self.config.get_config().await?;
        config.ensure_usable()?;

        let request = JobRequest {
            model_key: model.key.to_string(),
            input,
            webhook_url: options.webhook_url.clone(),
            webhook_events_filter: options.webhook_events_filter.clone(),
        };

        let record = self.api.create_prediction(&config, model.provider_id, &request).await?;
        info!(
            model_key = %model.key,
            provider_model = %model.provider_id,
            job_id = %record.id,
            status = %record.status,
            "Prediction submitted"
        );
        Ok(record)
    }
}
