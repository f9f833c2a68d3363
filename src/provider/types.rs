use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::input::JobInput;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    TextToVideo,
    ImageToVideo,
    ImageAnimation,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextToVideo => "text_to_video",
            Self::ImageToVideo => "image_to_video",
            Self::ImageAnimation => "image_animation",
        }
    }

    pub fn category(&self) -> ModelCategory {
        match self {
            Self::TextToVideo => ModelCategory::Text,
            Self::ImageToVideo | Self::ImageAnimation => ModelCategory::Image,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text_to_video" | "text-to-video" => Some(Self::TextToVideo),
            "image_to_video" | "image-to-video" => Some(Self::ImageToVideo),
            "image_animation" | "image-animation" => Some(Self::ImageAnimation),
            _ => None,
        }
    }
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which facade a model can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelCategory {
    Text,
    Image,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelDescriptor {
    pub key: &'static str,
    pub provider_id: &'static str,
    pub display_name: &'static str,
    pub model_type: ModelType,
    pub cost_per_run: f64,
    pub avg_duration_seconds: u32,
    pub output_format: &'static str,
    pub max_duration_seconds: Option<u32>,
    pub supports_prompt_optimizer: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Starting => 0,
            Self::Processing => 1,
            Self::Succeeded | Self::Failed | Self::Canceled => 2,
        }
    }

    /// Fold a newly observed status into the local projection. Terminal
    /// states are sticky and the projection never moves backwards.
    pub fn advance(self, observed: JobStatus) -> JobStatus {
        if self.is_terminal() || observed.rank() < self.rank() {
            self
        } else {
            observed
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Processing => "processing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw provider output. Video models return either one URL or a list of them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum JobOutput {
    Url(String),
    Urls(Vec<String>),
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct JobMetrics {
    pub predict_time_seconds: Option<f64>,
    pub total_time_seconds: Option<f64>,
}

/// Local projection of a provider-side prediction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobRecord {
    pub id: String,
    pub status: JobStatus,
    pub output: Option<JobOutput>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub metrics: Option<JobMetrics>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WebhookEvent {
    Start,
    Output,
    Logs,
    Completed,
}

impl WebhookEvent {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "start" => Some(Self::Start),
            "output" => Some(Self::Output),
            "logs" => Some(Self::Logs),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// A single creation request. Built per call and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRequest {
    pub model_key: String,
    pub input: JobInput,
    pub webhook_url: Option<String>,
    pub webhook_events_filter: Option<Vec<WebhookEvent>>,
}
