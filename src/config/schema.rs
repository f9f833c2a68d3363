use serde_json::{json, Value};
use std::sync::LazyLock;

pub static CONFIG_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "properties": {
            "provider": {
                "type": "object",
                "properties": {
                    "base_url": { "type": "string", "format": "uri" },
                    "request_timeout_secs": { "type": "integer", "minimum": 1 }
                },
                "additionalProperties": false
            },
            "polling": {
                "type": "object",
                "properties": {
                    "max_wait_ms": { "type": "integer", "minimum": 1 },
                    "poll_interval_ms": { "type": "integer", "minimum": 1 }
                },
                "additionalProperties": false
            },
            "cache": {
                "type": "object",
                "properties": {
                    "ttl_secs": { "type": "integer", "minimum": 0 }
                },
                "additionalProperties": false
            },
            "database": {
                "type": "object",
                "properties": {
                    "path": { "type": "string", "minLength": 1 }
                },
                "additionalProperties": false
            }
        },
        "additionalProperties": false
    })
});
