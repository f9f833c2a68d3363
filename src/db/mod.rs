pub mod connection;
pub mod schema;
pub mod settings;
pub mod usage;

pub use connection::Database;
