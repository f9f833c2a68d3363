use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::errors::FramecastError;
use super::schema::CREATE_TABLES;

/// SQLite handle backing the settings and usage stores. Clones share one
/// connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create the database file, then apply the schema.
    pub fn new(path: &str) -> Result<Self, FramecastError> {
        let path = Path::new(path);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }

        let conn = Connection::open(path).map_err(db_error("open database"))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(db_error("enable WAL"))?;
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(db_error("set busy timeout"))?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self, FramecastError> {
        let conn = Connection::open_in_memory().map_err(db_error("open in-memory database"))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, FramecastError> {
        conn.execute_batch(CREATE_TABLES).map_err(db_error("create tables"))?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>, FramecastError> {
        self.conn.lock()
            .map_err(|_| FramecastError::Database("connection lock poisoned".into()))
    }
}

pub(crate) fn db_error(action: &'static str) -> impl Fn(rusqlite::Error) -> FramecastError {
    move |e| FramecastError::Database(format!("Failed to {}: {}", action, e))
}
