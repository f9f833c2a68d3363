//! Job orchestration for hosted generative video models: a static model
//! catalog, cached provider settings, submission, polling, result
//! extraction, and one usage ledger entry per generation call.

pub mod clock;
pub mod config;
pub mod db;
pub mod errors;
pub mod jobs;
pub mod pipeline;
pub mod provider;
pub mod usage;

#[cfg(test)]
mod test_support;

pub use errors::FramecastError;
pub use pipeline::{GenerateOptions, GenerationResult, Orchestrator};
