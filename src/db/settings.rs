use std::collections::BTreeMap;

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};

use crate::config::{ProviderSettings, SettingsStore};
use crate::errors::FramecastError;
use super::connection::db_error;
use super::Database;

pub const KEY_API_KEY: &str = "provider.api_key";
pub const KEY_ENABLED: &str = "provider.enabled";
pub const KEY_DEFAULT_MODEL: &str = "provider.default_model";
pub const KEY_WEBHOOK_SECRET: &str = "provider.webhook_secret";

pub const PROVIDER_KEYS: &[&str] = &[KEY_API_KEY, KEY_ENABLED, KEY_DEFAULT_MODEL, KEY_WEBHOOK_SECRET];

impl Database {
    pub fn get_setting(&self, key: &str) -> Result<Option<String>, FramecastError> {
        self.lock()?
            .query_row("SELECT value FROM settings WHERE key = ?1", params![key], |row| row.get(0))
            .optional()
            .map_err(db_error("read setting"))
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<(), FramecastError> {
        self.lock()?
            .execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(db_error("store setting"))?;
        Ok(())
    }

    /// Returns whether a row was removed.
    pub fn delete_setting(&self, key: &str) -> Result<bool, FramecastError> {
        let removed = self.lock()?
            .execute("DELETE FROM settings WHERE key = ?1", params![key])
            .map_err(db_error("delete setting"))?;
        Ok(removed > 0)
    }

    pub fn get_all_settings(&self) -> Result<BTreeMap<String, String>, FramecastError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT key, value FROM settings")
            .map_err(db_error("list settings"))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .map_err(db_error("list settings"))?;
        rows.collect::<Result<BTreeMap<_, _>, _>>().map_err(db_error("read settings row"))
    }

    pub fn provider_settings(&self) -> Result<ProviderSettings, FramecastError> {
        Ok(ProviderSettings {
            api_key: self.get_setting(KEY_API_KEY)?,
            enabled: self.get_setting(KEY_ENABLED)?.as_deref().map(parse_flag).unwrap_or(false),
            default_model_key: self.get_setting(KEY_DEFAULT_MODEL)?,
            webhook_secret: self.get_setting(KEY_WEBHOOK_SECRET)?,
        })
    }
}

#[async_trait]
impl SettingsStore for Database {
    async fn read_settings(&self) -> Result<ProviderSettings, FramecastError> {
        self.provider_settings()
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on")
}
