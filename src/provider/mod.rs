pub mod api;
pub mod catalog;
pub mod input;
pub mod replicate;
pub mod types;

pub use api::PredictionApi;
pub use catalog::ModelCatalog;
pub use input::{JobInput, RawInput};
pub use replicate::ReplicateClient;
pub use types::{
    JobMetrics, JobOutput, JobRecord, JobRequest, JobStatus, ModelCategory, ModelDescriptor,
    ModelType, WebhookEvent,
};
