use thiserror::Error;

#[derive(Debug, Error)]
pub enum FramecastError {
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Model not found at provider: {0}")]
    ModelNotFound(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Provider error ({status}): {body}")]
    ProviderError { status: u16, body: String },

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Timed out after {waited_ms}ms waiting for job {job_id}")]
    Timeout { job_id: String, waited_ms: u64 },

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Job canceled: {0}")]
    Canceled(String),

    #[error("Empty result: {0}")]
    EmptyResult(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
