pub mod orchestrator;
pub mod stage;

pub use orchestrator::{GenerateOptions, GenerationResult, Orchestrator};
pub use stage::Stage;
