use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{error, info};

use crate::config::ConfigProvider;
use crate::errors::FramecastError;
use crate::jobs::{extract_from_record, JobPoller, JobSubmitter, PollObserver, PollOptions, SubmitOptions};
use crate::provider::{
    JobMetrics, JobRecord, ModelCatalog, ModelCategory, ModelDescriptor, ModelType, PredictionApi,
    RawInput, WebhookEvent,
};
use crate::usage::{UsageContext, UsageEntry, UsageLedger, UsageRecorder};
use super::stage::Stage;

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Explicit catalog key; the configured or built-in default otherwise.
    pub model_key: Option<String>,
    pub user_id: Option<String>,
    pub subject_type: Option<String>,
    pub prompt_optimizer: bool,
    pub webhook_url: Option<String>,
    pub webhook_events_filter: Option<Vec<WebhookEvent>>,
    pub poll: PollOptions,
    /// Extra caller fields merged into the usage entry's metadata.
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    pub result_url: String,
    pub job: JobRecord,
    pub model_key: String,
    pub cost_usd: f64,
}

/// What the call had learned by the time it finished, for the usage entry.
struct CallTrace {
    stage: Stage,
    model: Option<ModelDescriptor>,
    job_id: Option<String>,
    metrics: Option<JobMetrics>,
}

impl CallTrace {
    fn new() -> Self {
        Self { stage: Stage::Resolve, model: None, job_id: None, metrics: None }
    }
}

/// Single-call generation facades: submit, wait, extract, and record usage
/// exactly once whatever happens.
pub struct Orchestrator {
    catalog: Arc<ModelCatalog>,
    config: Arc<ConfigProvider>,
    submitter: JobSubmitter,
    poller: JobPoller,
    recorder: UsageRecorder,
    provider_name: String,
}

impl Orchestrator {
    pub fn new(
        catalog: Arc<ModelCatalog>,
        config: Arc<ConfigProvider>,
        api: Arc<dyn PredictionApi>,
        ledger: Arc<dyn UsageLedger>,
    ) -> Self {
        Self {
            submitter: JobSubmitter::new(catalog.clone(), config.clone(), api.clone()),
            poller: JobPoller::new(config.clone(), api.clone()),
            recorder: UsageRecorder::new(ledger),
            provider_name: api.provider_name().to_string(),
            catalog,
            config,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn PollObserver>) -> Self {
        self.poller = self.poller.with_observer(observer);
        self
    }

    pub async fn generate_from_text(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<GenerationResult, FramecastError> {
        let raw = RawInput::text(prompt).with_prompt_optimizer(options.prompt_optimizer);
        self.run(ModelCategory::Text, raw, options).await
    }

    /// The resolved model decides the payload: image-to-video models get the
    /// prompt and first frame, animation models get the image and fixed
    /// motion settings.
    pub async fn generate_from_image(
        &self,
        image_url: &str,
        prompt: Option<&str>,
        options: &GenerateOptions,
    ) -> Result<GenerationResult, FramecastError> {
        let raw = RawInput::image(image_url, prompt.map(str::to_string))
            .with_prompt_optimizer(options.prompt_optimizer);
        self.run(ModelCategory::Image, raw, options).await
    }

    async fn run(
        &self,
        category: ModelCategory,
        raw: RawInput,
        options: &GenerateOptions,
    ) -> Result<GenerationResult, FramecastError> {
        let started = Instant::now();
        let mut trace = CallTrace::new();

        let outcome = self.execute(category, &raw, options, &mut trace).await;
        let response_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let ctx = self.usage_context(category, options, &trace);
        let metadata = usage_metadata(options, &trace);
        match &outcome {
            Ok(result) => {
                info!(
                    model_key = %result.model_key,
                    job_id = %result.job.id,
                    cost_usd = result.cost_usd,
                    response_time_ms,
                    "Generation completed"
                );
                self.recorder
                    .record(UsageEntry::success(ctx, result.cost_usd, response_time_ms, metadata))
                    .await;
            }
            Err(e) => {
                error!(stage = %trace.stage, job_id = ?trace.job_id, error = %e, "Generation failed");
                self.recorder
                    .record(UsageEntry::failure(ctx, format!("{}: {}", trace.stage, e), response_time_ms, metadata))
                    .await;
            }
        }
        outcome
    }

    async fn execute(
        &self,
        category: ModelCategory,
        raw: &RawInput,
        options: &GenerateOptions,
        trace: &mut CallTrace,
    ) -> Result<GenerationResult, FramecastError> {
        let model = self.resolve_model(category, options.model_key.as_deref()).await?;
        trace.model = Some(model.clone());

        trace.stage = Stage::Submit;
        let submit_options = SubmitOptions {
            webhook_url: options.webhook_url.clone(),
            webhook_events_filter: options.webhook_events_filter.clone(),
        };
        let job = self.submitter.submit(model.key, raw, &submit_options).await?;
        trace.job_id = Some(job.id.clone());

        trace.stage = Stage::Poll;
        let finished = self.poller.await_completion(&job.id, options.poll).await?;
        trace.metrics = finished.metrics.clone();

        trace.stage = Stage::Extract;
        let result_url = extract_from_record(&finished)?;

        trace.stage = Stage::Complete;
        Ok(GenerationResult {
            result_url,
            job: finished,
            model_key: model.key.to_string(),
            cost_usd: model.cost_per_run,
        })
    }

    async fn resolve_model(
        &self,
        category: ModelCategory,
        requested: Option<&str>,
    ) -> Result<&ModelDescriptor, FramecastError> {
        let model = match requested.filter(|k| !k.is_empty()) {
            Some(key) => self.catalog.lookup_by_key(key)?,
            None => {
                let config = self.config.get_config().await?;
                self.catalog.resolve_default(category, config.default_model_key.as_deref())?
            }
        };

        if model.model_type.category() != category {
            let operation = match category {
                ModelCategory::Text => "text-to-video generation",
                ModelCategory::Image => "image-based generation",
            };
            return Err(FramecastError::UnsupportedOperation(format!(
                "model '{}' is {} and does not support {}",
                model.key, model.model_type, operation
            )));
        }
        Ok(model)
    }

    fn usage_context(&self, category: ModelCategory, options: &GenerateOptions, trace: &CallTrace) -> UsageContext {
        let request_kind = match (&trace.model, category) {
            (Some(model), _) => model.model_type.as_str().to_string(),
            (None, ModelCategory::Text) => ModelType::TextToVideo.as_str().to_string(),
            (None, ModelCategory::Image) => "image_generation".to_string(),
        };
        let model_id = match &trace.model {
            Some(model) => model.provider_id.to_string(),
            None => options.model_key.clone().unwrap_or_else(|| "unresolved".to_string()),
        };
        let subject_type = options.subject_type.clone().unwrap_or_else(|| {
            if options.user_id.is_some() { "user".to_string() } else { "system".to_string() }
        });

        UsageContext {
            user_id: options.user_id.clone(),
            subject_type,
            request_kind,
            model_id,
            provider: self.provider_name.clone(),
        }
    }
}

fn usage_metadata(options: &GenerateOptions, trace: &CallTrace) -> Value {
    let mut metadata = options.metadata.clone();
    metadata.insert("stage".into(), json!(trace.stage));
    if let Some(model) = &trace.model {
        metadata.insert("model_key".into(), json!(model.key));
        metadata.insert("provider_model_id".into(), json!(model.provider_id));
    }
    if let Some(job_id) = &trace.job_id {
        metadata.insert("job_id".into(), json!(job_id));
    }
    if let Some(predict_time) = trace.metrics.as_ref().and_then(|m| m.predict_time_seconds) {
        metadata.insert("predict_time_seconds".into(), json!(predict_time));
    }
    Value::Object(metadata)
}
