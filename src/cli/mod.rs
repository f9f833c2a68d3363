pub mod commands;
pub mod context;
pub mod generate;
pub mod jobs;
pub mod models;
pub mod progress;
pub mod settings;
pub mod usage;

pub use commands::{Cli, Commands};
