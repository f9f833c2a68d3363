use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::credentials::redact_credentials;
use crate::config::ProviderConfig;
use crate::errors::FramecastError;
use super::api::PredictionApi;
use super::input::JobInput;
use super::types::{JobMetrics, JobOutput, JobRecord, JobRequest, JobStatus, WebhookEvent};

pub struct ReplicateClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct CreatePredictionBody<'a> {
    input: &'a JobInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    webhook: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    webhook_events_filter: Option<&'a [WebhookEvent]>,
}

#[derive(Debug, Deserialize)]
struct PredictionPayload {
    id: String,
    status: JobStatus,
    #[serde(default)]
    output: Option<JobOutput>,
    #[serde(default)]
    error: Option<Value>,
    created_at: Option<DateTime<Utc>>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    metrics: Option<PredictionMetrics>,
}

#[derive(Debug, Deserialize)]
struct PredictionMetrics {
    predict_time: Option<f64>,
    total_time: Option<f64>,
}

impl From<PredictionPayload> for JobRecord {
    fn from(p: PredictionPayload) -> Self {
        let error_message = match p.error {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
        };
        JobRecord {
            id: p.id,
            status: p.status,
            output: p.output,
            error_message,
            created_at: p.created_at.unwrap_or_else(Utc::now),
            started_at: p.started_at,
            completed_at: p.completed_at,
            metrics: p.metrics.map(|m| JobMetrics {
                predict_time_seconds: m.predict_time,
                total_time_seconds: m.total_time,
            }),
        }
    }
}

impl ReplicateClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, FramecastError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("framecast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FramecastError::TransportError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Reuse an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn read_record(resp: Response, context: &str) -> Result<JobRecord, FramecastError> {
        let body = resp.text().await
            .map_err(|e| FramecastError::TransportError(format!("{}: failed to read response body: {}", context, e)))?;
        let payload: PredictionPayload = serde_json::from_str(&body)
            .map_err(|e| FramecastError::ProviderError {
                status: 200,
                body: format!("{}: malformed prediction payload ({}): {}", context, e, truncate(&body)),
            })?;
        Ok(payload.into())
    }

    async fn error_body(resp: Response, config: &ProviderConfig) -> String {
        let body = resp.text().await.unwrap_or_default();
        redact_credentials(&body, &[config.api_key.as_str()])
    }
}

#[async_trait]
impl PredictionApi for ReplicateClient {
    async fn create_prediction(
        &self,
        config: &ProviderConfig,
        provider_model_id: &str,
        request: &JobRequest,
    ) -> Result<JobRecord, FramecastError> {
        let body = CreatePredictionBody {
            input: &request.input,
            webhook: request.webhook_url.as_deref(),
            webhook_events_filter: request.webhook_events_filter.as_deref(),
        };

        let resp = self.client
            .post(format!("{}/models/{}/predictions", self.base_url, provider_model_id))
            .bearer_auth(&config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| FramecastError::TransportError(format!("create prediction for {} failed: {}", provider_model_id, e)))?;

        let status = resp.status();
        debug!(model = %provider_model_id, status = status.as_u16(), "Create prediction response");

        if status.is_success() {
            return Self::read_record(resp, "create prediction").await;
        }

        let body = Self::error_body(resp, config).await;
        Err(match status {
            StatusCode::NOT_FOUND => FramecastError::ModelNotFound(format!(
                "provider does not recognize model '{}': {}", provider_model_id, detail_text(&body)
            )),
            StatusCode::UNPROCESSABLE_ENTITY => FramecastError::ValidationFailed(detail_text(&body)),
            _ => FramecastError::ProviderError {
                status: status.as_u16(),
                body: format!("create prediction for {}: {}", provider_model_id, body),
            },
        })
    }

    async fn get_prediction(
        &self,
        config: &ProviderConfig,
        job_id: &str,
    ) -> Result<JobRecord, FramecastError> {
        let resp = self.client
            .get(format!("{}/predictions/{}", self.base_url, job_id))
            .bearer_auth(&config.api_key)
            .send()
            .await
            .map_err(|e| FramecastError::TransportError(format!("fetch prediction {} failed: {}", job_id, e)))?;

        let status = resp.status();
        if status.is_success() {
            return Self::read_record(resp, "fetch prediction").await;
        }

        let body = Self::error_body(resp, config).await;
        Err(match status {
            StatusCode::UNPROCESSABLE_ENTITY => FramecastError::ValidationFailed(detail_text(&body)),
            _ => FramecastError::ProviderError {
                status: status.as_u16(),
                body: format!("fetch prediction {}: {}", job_id, body),
            },
        })
    }

    async fn cancel_prediction(
        &self,
        config: &ProviderConfig,
        job_id: &str,
    ) -> Result<(), FramecastError> {
        let resp = self.client
            .post(format!("{}/predictions/{}/cancel", self.base_url, job_id))
            .bearer_auth(&config.api_key)
            .send()
            .await
            .map_err(|e| FramecastError::TransportError(format!("cancel prediction {} failed: {}", job_id, e)))?;

        let status = resp.status();
        debug!(job_id = %job_id, status = status.as_u16(), "Cancel prediction response");
        if status.is_success() {
            return Ok(());
        }

        let body = Self::error_body(resp, config).await;
        Err(match status {
            StatusCode::UNPROCESSABLE_ENTITY => FramecastError::ValidationFailed(detail_text(&body)),
            _ => FramecastError::ProviderError {
                status: status.as_u16(),
                body: format!("cancel prediction {}: {}", job_id, body),
            },
        })
    }

    fn provider_name(&self) -> &str { "replicate" }
}

/// Pull the human-readable `detail` out of a provider error body, falling
/// back to the raw body.
pub fn detail_text(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_text_prefers_detail_field() {
        assert_eq!(detail_text(r#"{"detail":"invalid motion_bucket_id"}"#), "invalid motion_bucket_id");
    }

    #[test]
    fn test_detail_text_falls_back_to_body() {
        assert_eq!(detail_text("  upstream exploded "), "upstream exploded");
        assert_eq!(detail_text(r#"{"title":"nope"}"#), r#"{"title":"nope"}"#);
    }

    #[test]
    fn test_payload_conversion() {
        let payload: PredictionPayload = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "status": "failed",
            "output": null,
            "error": "CUDA out of memory",
            "created_at": "2024-05-01T10:00:00Z",
            "metrics": {"predict_time": 12.5}
        })).unwrap();
        let record: JobRecord = payload.into();
        assert_eq!(record.status, JobStatus::Failed);
        assert_eq!(record.error_message.as_deref(), Some("CUDA out of memory"));
        assert!(record.output.is_none());
        assert_eq!(record.metrics.unwrap().predict_time_seconds, Some(12.5));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = ReplicateClient::with_client(Client::new(), "http://localhost:1234/v1/");
        assert_eq!(client.base_url(), "http://localhost:1234/v1");
    }
}
