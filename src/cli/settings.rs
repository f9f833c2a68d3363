use framecast::config::credentials::mask_secret;
use framecast::db::settings::{KEY_API_KEY, KEY_DEFAULT_MODEL, KEY_ENABLED, KEY_WEBHOOK_SECRET, PROVIDER_KEYS};
use framecast::errors::FramecastError;
use framecast::provider::ModelCatalog;
use tracing::info;

use super::commands::{ContextArgs, SettingsAction, SettingsArgs};
use super::context::AppContext;

pub async fn handle_settings(context: &ContextArgs, args: SettingsArgs) -> Result<(), FramecastError> {
    let ctx = AppContext::load(context).await?;

    match args.action {
        SettingsAction::Show => {
            let stored = ctx.db.get_all_settings()?;
            for key in PROVIDER_KEYS {
                let value = match stored.get(*key) {
                    Some(v) if is_secret(key) => mask_secret(v),
                    Some(v) => v.clone(),
                    None => "(unset)".to_string(),
                };
                println!("{:<26} {}", key, value);
            }
            let effective = ctx.provider_config.get_config().await?;
            println!("{:<26} {}", "effective.enabled", effective.is_enabled());
        }
        SettingsAction::Set { key, value } => {
            validate_setting(&key, &value)?;
            ctx.db.set_setting(&key, value.trim())?;
            info!(key = %key, "Setting stored");
            println!("Set {}", key);
        }
        SettingsAction::Unset { key } => {
            ensure_known_key(&key)?;
            if ctx.db.delete_setting(&key)? {
                println!("Removed {}", key);
            } else {
                println!("{} was not set", key);
            }
        }
    }
    Ok(())
}

fn is_secret(key: &str) -> bool {
    key == KEY_API_KEY || key == KEY_WEBHOOK_SECRET
}

fn ensure_known_key(key: &str) -> Result<(), FramecastError> {
    if PROVIDER_KEYS.contains(&key) {
        Ok(())
    } else {
        Err(FramecastError::ValidationFailed(format!(
            "unknown setting '{}', expected one of: {}",
            key,
            PROVIDER_KEYS.join(", ")
        )))
    }
}

fn validate_setting(key: &str, value: &str) -> Result<(), FramecastError> {
    ensure_known_key(key)?;
    let value = value.trim();
    match key {
        KEY_ENABLED => match value.to_ascii_lowercase().as_str() {
            "true" | "false" | "1" | "0" | "yes" | "no" | "on" | "off" => Ok(()),
            _ => Err(FramecastError::ValidationFailed(format!("{} expects a boolean, got '{}'", key, value))),
        },
        KEY_DEFAULT_MODEL => ModelCatalog::builtin().lookup_by_key(value).map(|_| ()),
        _ if value.is_empty() => Err(FramecastError::ValidationFailed(format!("{} cannot be empty", key))),
        _ => Ok(()),
    }
}
