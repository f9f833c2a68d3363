use serde::Serialize;

use crate::errors::FramecastError;
use super::types::{ModelDescriptor, ModelType};

/// Motion parameters used for every image-animation request.
pub const ANIMATION_MOTION_BUCKET_ID: u32 = 127;
pub const ANIMATION_FPS: u32 = 6;
pub const ANIMATION_COND_AUG: f64 = 0.02;

/// Caller-supplied input before it is shaped for a particular model.
#[derive(Debug, Clone, Default)]
pub struct RawInput {
    pub prompt: Option<String>,
    pub image_url: Option<String>,
    pub prompt_optimizer: bool,
}

impl RawInput {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self { prompt: Some(prompt.into()), ..Default::default() }
    }

    pub fn image(image_url: impl Into<String>, prompt: Option<String>) -> Self {
        Self { prompt, image_url: Some(image_url.into()), ..Default::default() }
    }

    pub fn with_prompt_optimizer(mut self, enabled: bool) -> Self {
        self.prompt_optimizer = enabled;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextToVideoInput {
    pub prompt: String,
    pub prompt_optimizer: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageToVideoInput {
    pub prompt: String,
    pub first_frame_image: String,
    pub prompt_optimizer: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageAnimationInput {
    pub input_image: String,
    pub motion_bucket_id: u32,
    pub fps: u32,
    pub cond_aug: f64,
}

/// The `input` object of a creation request, one variant per model type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JobInput {
    TextToVideo(TextToVideoInput),
    ImageToVideo(ImageToVideoInput),
    ImageAnimation(ImageAnimationInput),
}

impl JobInput {
    /// Shape `raw` for `model`. The variant is chosen by the model's declared
    /// type only.
    pub fn build(model: &ModelDescriptor, raw: &RawInput) -> Result<Self, FramecastError> {
        let prompt_optimizer = raw.prompt_optimizer && model.supports_prompt_optimizer;

        match model.model_type {
            ModelType::TextToVideo => Ok(Self::TextToVideo(TextToVideoInput {
                prompt: require_prompt(model, raw)?,
                prompt_optimizer,
            })),
            ModelType::ImageToVideo => Ok(Self::ImageToVideo(ImageToVideoInput {
                prompt: require_prompt(model, raw)?,
                first_frame_image: require_image(model, raw)?,
                prompt_optimizer,
            })),
            ModelType::ImageAnimation => Ok(Self::ImageAnimation(ImageAnimationInput {
                input_image: require_image(model, raw)?,
                motion_bucket_id: ANIMATION_MOTION_BUCKET_ID,
                fps: ANIMATION_FPS,
                cond_aug: ANIMATION_COND_AUG,
            })),
        }
    }

    pub fn model_type(&self) -> ModelType {
        match self {
            Self::TextToVideo(_) => ModelType::TextToVideo,
            Self::ImageToVideo(_) => ModelType::ImageToVideo,
            Self::ImageAnimation(_) => ModelType::ImageAnimation,
        }
    }
}

fn require_prompt(model: &ModelDescriptor, raw: &RawInput) -> Result<String, FramecastError> {
    raw.prompt.as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .ok_or_else(|| FramecastError::ValidationFailed(format!(
            "a prompt is required for {} model '{}'", model.model_type, model.key
        )))
}

fn require_image(model: &ModelDescriptor, raw: &RawInput) -> Result<String, FramecastError> {
    raw.image_url.as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .ok_or_else(|| FramecastError::ValidationFailed(format!(
            "an image URL is required for {} model '{}'", model.model_type, model.key
        )))
}
