pub mod credentials;
pub mod parser;
pub mod provider;
pub mod schema;
pub mod types;

pub use types::*;
pub use parser::parse_config;
pub use provider::{ConfigProvider, SettingsStore};
