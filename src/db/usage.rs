use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::FramecastError;
use crate::usage::{UsageEntry, UsageLedger, UsageSummary};
use super::connection::db_error;
use super::Database;

impl Database {
    pub fn insert_usage(&self, entry: &UsageEntry) -> Result<(), FramecastError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO usage_entries (id, user_id, subject_type, request_kind, model_id, provider, cost_usd, response_time_ms, success, error_message, metadata, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            rusqlite::params![
                entry.id.to_string(),
                entry.user_id,
                entry.subject_type,
                entry.request_kind,
                entry.model_id,
                entry.provider,
                entry.cost_usd,
                i64::try_from(entry.response_time_ms).unwrap_or(i64::MAX),
                entry.success,
                entry.error_message,
                entry.metadata.to_string(),
                entry.created_at.to_rfc3339(),
            ],
        ).map_err(db_error("insert usage entry"))?;
        Ok(())
    }

    /// Most recent entries first.
    pub fn list_usage(&self, limit: usize, user_id: Option<&str>) -> Result<Vec<UsageEntry>, FramecastError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, subject_type, request_kind, model_id, provider, cost_usd, response_time_ms, success, error_message, metadata, created_at FROM usage_entries WHERE (?1 IS NULL OR user_id = ?1) ORDER BY created_at DESC LIMIT ?2"
        ).map_err(db_error("prepare usage query"))?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(rusqlite::params![user_id, limit], |row: &rusqlite::Row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, f64>(6)?,
                row.get::<_, i64>(7)?,
                row.get::<_, bool>(8)?,
                row.get::<_, Option<String>>(9)?,
                row.get::<_, String>(10)?,
                row.get::<_, String>(11)?,
            ))
        }).map_err(db_error("query usage entries"))?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, user_id, subject_type, request_kind, model_id, provider, cost_usd, response_time_ms, success, error_message, metadata, created_at) =
                row.map_err(db_error("read usage row"))?;
            entries.push(UsageEntry {
                id: id.parse()
                    .map_err(|e| FramecastError::Database(format!("Invalid usage id '{}': {}", id, e)))?,
                user_id,
                subject_type,
                request_kind,
                model_id,
                provider,
                cost_usd,
                response_time_ms: u64::try_from(response_time_ms).unwrap_or(0),
                success,
                error_message,
                metadata: serde_json::from_str(&metadata)?,
                created_at: DateTime::parse_from_rfc3339(&created_at)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| FramecastError::Database(format!("Invalid timestamp '{}': {}", created_at, e)))?,
            });
        }
        Ok(entries)
    }

    pub fn usage_summary(&self, user_id: Option<&str>) -> Result<UsageSummary, FramecastError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(success), 0), COALESCE(SUM(cost_usd), 0.0) FROM usage_entries WHERE (?1 IS NULL OR user_id = ?1)",
            rusqlite::params![user_id],
            |row: &rusqlite::Row| {
                let total: i64 = row.get(0)?;
                let successes: i64 = row.get(1)?;
                let cost: f64 = row.get(2)?;
                Ok(UsageSummary {
                    total_calls: total as u64,
                    successful_calls: successes as u64,
                    failed_calls: (total - successes) as u64,
                    total_cost_usd: cost,
                })
            },
        ).map_err(db_error("summarize usage"))
    }
}

#[async_trait]
impl UsageLedger for Database {
    async fn append(&self, entry: &UsageEntry) -> Result<(), FramecastError> {
        self.insert_usage(entry)
    }
}
