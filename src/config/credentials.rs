use tracing::debug;

/// Environment variable consulted when no API key is stored in settings.
pub const API_TOKEN_ENV: &str = "REPLICATE_API_TOKEN";

/// Resolve a credential value. If the value starts with '$', treat it as an
/// environment variable reference and resolve from the environment.
pub fn resolve_credential(value: &str) -> String {
    if let Some(var_name) = value.strip_prefix('$') {
        match std::env::var(var_name) {
            Ok(resolved) => {
                debug!(var = %var_name, "Resolved credential from environment");
                resolved
            }
            Err(_) => {
                debug!(var = %var_name, "Environment variable not set, using literal");
                value.to_string()
            }
        }
    } else {
        value.to_string()
    }
}

/// Pick the effective API key: the stored value (resolved) when present,
/// otherwise the process-level token, otherwise empty.
pub fn merge_api_key(stored: Option<&str>) -> String {
    let stored = stored.map(str::trim).filter(|v| !v.is_empty()).map(resolve_credential);
    match stored {
        Some(key) if !key.starts_with('$') => key,
        _ => match std::env::var(API_TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => {
                debug!(var = API_TOKEN_ENV, "Using API key from environment fallback");
                token.trim().to_string()
            }
            _ => String::new(),
        },
    }
}

/// Redact sensitive values in a string. Replaces known credential patterns
/// with [REDACTED].
pub fn redact_credentials(text: &str, secrets: &[&str]) -> String {
    let mut result = text.to_string();
    for secret in secrets {
        if !secret.is_empty() && secret.len() >= 4 {
            result = result.replace(secret, "[REDACTED]");
        }
    }
    result
}

/// Mask a secret for display, keeping a short prefix for recognition.
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "(not set)".to_string();
    }
    let prefix: String = secret.chars().take(4).collect();
    format!("{}…[REDACTED]", prefix)
}
