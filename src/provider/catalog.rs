use std::sync::LazyLock;

use crate::errors::FramecastError;
use super::types::{ModelCategory, ModelDescriptor, ModelType};

pub const DEFAULT_TEXT_MODEL_KEY: &str = "minimax-video-01";
pub const DEFAULT_IMAGE_MODEL_KEY: &str = "minimax-video-01-live";

static BUILTIN_MODELS: &[ModelDescriptor] = &[
    ModelDescriptor {
        key: "minimax-video-01",
        provider_id: "minimax/video-01",
        display_name: "Hailuo Video-01",
        model_type: ModelType::TextToVideo,
        cost_per_run: 0.50,
        avg_duration_seconds: 210,
        output_format: "mp4",
        max_duration_seconds: Some(6),
        supports_prompt_optimizer: true,
    },
    ModelDescriptor {
        key: "wan-2.1-t2v-480p",
        provider_id: "wavespeedai/wan-2.1-t2v-480p",
        display_name: "Wan 2.1 Text-to-Video (480p)",
        model_type: ModelType::TextToVideo,
        cost_per_run: 0.25,
        avg_duration_seconds: 120,
        output_format: "mp4",
        max_duration_seconds: Some(5),
        supports_prompt_optimizer: false,
    },
    ModelDescriptor {
        key: "luma-ray",
        provider_id: "luma/ray",
        display_name: "Luma Ray",
        model_type: ModelType::TextToVideo,
        cost_per_run: 0.45,
        avg_duration_seconds: 150,
        output_format: "mp4",
        max_duration_seconds: Some(5),
        supports_prompt_optimizer: false,
    },
    ModelDescriptor {
        key: "minimax-video-01-live",
        provider_id: "minimax/video-01-live",
        display_name: "Hailuo Video-01 Live",
        model_type: ModelType::ImageToVideo,
        cost_per_run: 0.50,
        avg_duration_seconds: 200,
        output_format: "mp4",
        max_duration_seconds: Some(6),
        supports_prompt_optimizer: true,
    },
    ModelDescriptor {
        key: "wan-2.1-i2v-480p",
        provider_id: "wavespeedai/wan-2.1-i2v-480p",
        display_name: "Wan 2.1 Image-to-Video (480p)",
        model_type: ModelType::ImageToVideo,
        cost_per_run: 0.35,
        avg_duration_seconds: 140,
        output_format: "mp4",
        max_duration_seconds: Some(5),
        supports_prompt_optimizer: false,
    },
    ModelDescriptor {
        key: "stable-video-diffusion",
        provider_id: "stability-ai/stable-video-diffusion",
        display_name: "Stable Video Diffusion",
        model_type: ModelType::ImageAnimation,
        cost_per_run: 0.08,
        avg_duration_seconds: 60,
        output_format: "mp4",
        max_duration_seconds: Some(4),
        supports_prompt_optimizer: false,
    },
];

static BUILTIN: LazyLock<ModelCatalog> = LazyLock::new(|| ModelCatalog::new(BUILTIN_MODELS.to_vec()));

/// Immutable registry of the models this process can submit to.
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    models: Vec<ModelDescriptor>,
}

impl ModelCatalog {
    pub fn new(models: Vec<ModelDescriptor>) -> Self {
        Self { models }
    }

    /// The process-wide catalog, built once on first use.
    pub fn builtin() -> &'static ModelCatalog {
        &BUILTIN
    }

    pub fn lookup_by_key(&self, key: &str) -> Result<&ModelDescriptor, FramecastError> {
        self.models.iter()
            .find(|m| m.key == key)
            .ok_or_else(|| FramecastError::UnknownModel(key.to_string()))
    }

    /// Reverse lookup used to normalize provider responses, which name the
    /// model by its provider identifier.
    pub fn lookup_by_provider_id(&self, provider_id: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.provider_id == provider_id)
    }

    pub fn list_by_type(&self, model_type: ModelType) -> Vec<&ModelDescriptor> {
        self.models.iter().filter(|m| m.model_type == model_type).collect()
    }

    pub fn all(&self) -> &[ModelDescriptor] {
        &self.models
    }

    /// Resolve the default model for a category. A configured key only wins
    /// when it names a model of that category.
    pub fn resolve_default(
        &self,
        category: ModelCategory,
        configured: Option<&str>,
    ) -> Result<&ModelDescriptor, FramecastError> {
        if let Some(key) = configured.filter(|k| !k.is_empty()) {
            match self.lookup_by_key(key) {
                Ok(model) if model.model_type.category() == category => return Ok(model),
                Ok(_) => {}
                Err(_) => tracing::warn!(model_key = %key, "Configured default model is not in the catalog"),
            }
        }

        let fallback = match category {
            ModelCategory::Text => DEFAULT_TEXT_MODEL_KEY,
            ModelCategory::Image => DEFAULT_IMAGE_MODEL_KEY,
        };
        self.lookup_by_key(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_builtin_key_resolves() {
        let catalog = ModelCatalog::builtin();
        for model in catalog.all() {
            let found = catalog.lookup_by_key(model.key).unwrap();
            assert_eq!(found.provider_id, model.provider_id);
            assert!(matches!(
                found.model_type,
                ModelType::TextToVideo | ModelType::ImageToVideo | ModelType::ImageAnimation
            ));
            assert!(found.cost_per_run >= 0.0);
        }
    }

    #[test]
    fn test_unknown_key_fails() {
        let err = ModelCatalog::builtin().lookup_by_key("does-not-exist").unwrap_err();
        assert!(matches!(err, FramecastError::UnknownModel(k) if k == "does-not-exist"));
    }

    #[test]
    fn test_keys_are_unique() {
        let catalog = ModelCatalog::builtin();
        let mut keys: Vec<_> = catalog.all().iter().map(|m| m.key).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), catalog.all().len());
    }

    #[test]
    fn test_lookup_by_provider_id() {
        let catalog = ModelCatalog::builtin();
        let model = catalog.lookup_by_provider_id("stability-ai/stable-video-diffusion").unwrap();
        assert_eq!(model.key, "stable-video-diffusion");
        assert!(catalog.lookup_by_provider_id("nobody/nothing").is_none());
    }

    #[test]
    fn test_list_by_type_preserves_insertion_order() {
        let text: Vec<_> = ModelCatalog::builtin()
            .list_by_type(ModelType::TextToVideo)
            .iter()
            .map(|m| m.key)
            .collect();
        assert_eq!(text, vec!["minimax-video-01", "wan-2.1-t2v-480p", "luma-ray"]);
    }

    #[test]
    fn test_default_constants_exist_with_matching_category() {
        let catalog = ModelCatalog::builtin();
        let text = catalog.lookup_by_key(DEFAULT_TEXT_MODEL_KEY).unwrap();
        let image = catalog.lookup_by_key(DEFAULT_IMAGE_MODEL_KEY).unwrap();
        assert_eq!(text.model_type.category(), ModelCategory::Text);
        assert_eq!(image.model_type.category(), ModelCategory::Image);
    }

    #[test]
    fn test_resolve_default_uses_configured_key_for_matching_category() {
        let catalog = ModelCatalog::builtin();
        let model = catalog.resolve_default(ModelCategory::Text, Some("luma-ray")).unwrap();
        assert_eq!(model.key, "luma-ray");
    }

    #[test]
    fn test_resolve_default_ignores_configured_key_of_other_category() {
        let catalog = ModelCatalog::builtin();
        let model = catalog.resolve_default(ModelCategory::Image, Some("luma-ray")).unwrap();
        assert_eq!(model.key, DEFAULT_IMAGE_MODEL_KEY);
    }

    #[test]
    fn test_resolve_default_falls_back_when_unset_or_unknown() {
        let catalog = ModelCatalog::builtin();
        assert_eq!(catalog.resolve_default(ModelCategory::Text, None).unwrap().key, DEFAULT_TEXT_MODEL_KEY);
        assert_eq!(catalog.resolve_default(ModelCategory::Text, Some("")).unwrap().key, DEFAULT_TEXT_MODEL_KEY);
        assert_eq!(catalog.resolve_default(ModelCategory::Text, Some("gone")).unwrap().key, DEFAULT_TEXT_MODEL_KEY);
    }
}
