use std::path::Path;
use crate::errors::FramecastError;
use super::types::AppConfig;
use super::schema::CONFIG_SCHEMA;
use tracing::warn;

pub async fn parse_config(path: &Path) -> Result<AppConfig, FramecastError> {
    if !path.exists() {
        return Err(FramecastError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > 1_048_576 {
        return Err(FramecastError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    parse_config_str(&content)
}

pub fn parse_config_str(content: &str) -> Result<AppConfig, FramecastError> {
    // An empty file is a valid, all-defaults config.
    if content.trim().is_empty() {
        return Ok(AppConfig::default());
    }

    let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;

    // JSON Schema validation
    validate_schema(&yaml)?;

    // Parse into typed config
    let config: AppConfig = serde_yaml::from_value(yaml)?;

    // Semantic conflict detection
    validate_conflicts(&config)?;

    Ok(config)
}

/// Validate config against the JSON schema for structural correctness.
fn validate_schema(yaml: &serde_yaml::Value) -> Result<(), FramecastError> {
    // Convert YAML value to JSON for schema validation
    let json_str = serde_json::to_string(yaml)
        .map_err(|e| FramecastError::Config(format!("Config conversion error: {}", e)))?;
    let json_value: serde_json::Value = serde_json::from_str(&json_str)
        .map_err(|e| FramecastError::Config(format!("Config conversion error: {}", e)))?;

    let compiled = jsonschema::JSONSchema::compile(&CONFIG_SCHEMA)
        .map_err(|e| FramecastError::Config(format!("Schema compilation error: {}", e)))?;

    let result = compiled.validate(&json_value);
    if let Err(errors) = result {
        // Advisory only: unknown keys and odd values are reported, the typed
        // parse below decides what is fatal.
        for e in errors {
            warn!(validation_error = %format!("{} at {}", e, e.instance_path), "Config schema warning");
        }
    }

    Ok(())
}

/// Detect semantic conflicts in the parsed configuration.
fn validate_conflicts(config: &AppConfig) -> Result<(), FramecastError> {
    if config.poll_interval_ms() == 0 {
        return Err(FramecastError::Config("polling.poll_interval_ms must be greater than zero".into()));
    }
    if config.max_wait_ms() == 0 {
        return Err(FramecastError::Config("polling.max_wait_ms must be greater than zero".into()));
    }
    if config.poll_interval_ms() > config.max_wait_ms() {
        return Err(FramecastError::Config(format!(
            "polling.poll_interval_ms ({}) exceeds polling.max_wait_ms ({})",
            config.poll_interval_ms(),
            config.max_wait_ms()
        )));
    }
    if config.request_timeout_secs() == 0 {
        return Err(FramecastError::Config("provider.request_timeout_secs must be greater than zero".into()));
    }

    let base_url = config.base_url();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(FramecastError::Config(format!("provider.base_url must be an http(s) URL, got '{}'", base_url)));
    }
    if base_url.starts_with("http://") {
        warn!(base_url = %base_url, "Provider base URL is not using TLS");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config_str("").unwrap();
        assert_eq!(config.poll_interval_ms(), 3_000);
    }

    #[test]
    fn test_full_config_parses() {
        let yaml = r#"
provider:
  base_url: https://api.replicate.com/v1
  request_timeout_secs: 20
polling:
  max_wait_ms: 120000
  poll_interval_ms: 2000
cache:
  ttl_secs: 60
database:
  path: /tmp/framecast.db
"#;
        let config = parse_config_str(yaml).unwrap();
        assert_eq!(config.request_timeout_secs(), 20);
        assert_eq!(config.max_wait_ms(), 120_000);
        assert_eq!(config.cache_ttl_secs(), 60);
        assert_eq!(config.database_path(), "/tmp/framecast.db");
    }

    #[test]
    fn test_interval_longer_than_wait_rejected() {
        let yaml = "polling:\n  max_wait_ms: 1000\n  poll_interval_ms: 5000\n";
        assert!(matches!(parse_config_str(yaml), Err(FramecastError::Config(_))));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let yaml = "polling:\n  poll_interval_ms: 0\n";
        assert!(parse_config_str(yaml).is_err());
    }

    #[test]
    fn test_non_http_base_url_rejected() {
        let yaml = "provider:\n  base_url: ftp://example.com\n";
        assert!(matches!(parse_config_str(yaml), Err(FramecastError::Config(msg)) if msg.contains("base_url")));
    }

    #[test]
    fn test_malformed_yaml_is_error() {
        assert!(matches!(parse_config_str("polling: [unclosed"), Err(FramecastError::Yaml(_))));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = parse_config(Path::new("/nonexistent/framecast.yaml")).await.unwrap_err();
        assert!(matches!(err, FramecastError::Config(msg) if msg.contains("not found")));
    }

    #[tokio::test]
    async fn test_parse_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("framecast.yaml");
        std::fs::write(&path, "cache:\n  ttl_secs: 10\n").unwrap();
        let config = parse_config(&path).await.unwrap();
        assert_eq!(config.cache_ttl_secs(), 10);
    }
}
