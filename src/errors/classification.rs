use super::types::FramecastError;

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    pub retryable: bool,
}

impl FramecastError {
    /// Classify this error to determine its type and whether a caller may
    /// safely retry the whole operation.
    pub fn classify(&self) -> ErrorClassification {
        let (error_type, retryable) = match self {
            FramecastError::TransportError(_) => ("TransportError", true),
            FramecastError::ProviderError { status: 429, .. } => ("RateLimitError", true),
            FramecastError::ProviderError { status, .. } => ("ProviderError", *status >= 500),
            FramecastError::Database(_) => ("DatabaseError", true),
            FramecastError::Io(_) => ("IoError", true),

            // The remote job may still finish and bill.
            FramecastError::Timeout { .. } => ("TimeoutError", false),

            FramecastError::ConfigurationMissing(_) => ("ConfigurationMissingError", false),
            FramecastError::UnknownModel(_) => ("UnknownModelError", false),
            FramecastError::ModelNotFound(_) => ("ModelNotFoundError", false),
            FramecastError::ValidationFailed(_) => ("ValidationError", false),
            FramecastError::GenerationFailed(_) => ("GenerationFailedError", false),
            FramecastError::Canceled(_) => ("CanceledError", false),
            FramecastError::EmptyResult(_) => ("EmptyResultError", false),
            FramecastError::UnsupportedOperation(_) => ("UnsupportedOperationError", false),
            FramecastError::Config(_) => ("ConfigError", false),
            FramecastError::Json(_) => ("JsonError", false),
            FramecastError::Yaml(_) => ("YamlError", false),
            FramecastError::Internal(_) => ("InternalError", false),
        };
        ErrorClassification { error_type, retryable }
    }
}
