use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row of the usage/cost ledger. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UsageEntry {
    pub id: Uuid,
    pub user_id: Option<String>,
    pub subject_type: String,
    pub request_kind: String,
    pub model_id: String,
    pub provider: String,
    pub cost_usd: f64,
    pub response_time_ms: u64,
    pub success: bool,
    pub error_message: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Fields shared by the success and failure shapes of an entry.
#[derive(Debug, Clone)]
pub struct UsageContext {
    pub user_id: Option<String>,
    pub subject_type: String,
    pub request_kind: String,
    pub model_id: String,
    pub provider: String,
}

impl UsageEntry {
    pub fn success(ctx: UsageContext, cost_usd: f64, response_time_ms: u64, metadata: serde_json::Value) -> Self {
        Self::build(ctx, cost_usd.max(0.0), response_time_ms, true, None, metadata)
    }

    /// Failed calls are never billed locally.
    pub fn failure(ctx: UsageContext, error_message: String, response_time_ms: u64, metadata: serde_json::Value) -> Self {
        Self::build(ctx, 0.0, response_time_ms, false, Some(error_message), metadata)
    }

    fn build(
        ctx: UsageContext,
        cost_usd: f64,
        response_time_ms: u64,
        success: bool,
        error_message: Option<String>,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: ctx.user_id,
            subject_type: ctx.subject_type,
            request_kind: ctx.request_kind,
            model_id: ctx.model_id,
            provider: ctx.provider,
            cost_usd,
            response_time_ms,
            success,
            error_message,
            metadata,
            created_at: Utc::now(),
        }
    }
}

/// Aggregate view over the ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UsageSummary {
    pub total_calls: u64,
    pub successful_calls: u64,
    pub failed_calls: u64,
    pub total_cost_usd: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> UsageContext {
        UsageContext {
            user_id: Some("u-1".into()),
            subject_type: "user".into(),
            request_kind: "text_to_video".into(),
            model_id: "minimax/video-01".into(),
            provider: "replicate".into(),
        }
    }

    #[test]
    fn test_success_entry_carries_cost() {
        let entry = UsageEntry::success(ctx(), 0.25, 1200, json!({"stage": "complete"}));
        assert!(entry.success);
        assert_eq!(entry.cost_usd, 0.25);
        assert!(entry.error_message.is_none());
    }

    #[test]
    fn test_failure_entry_is_free_and_explained() {
        let entry = UsageEntry::failure(ctx(), "submit: Validation failed: bad".into(), 80, json!({}));
        assert!(!entry.success);
        assert_eq!(entry.cost_usd, 0.0);
        assert_eq!(entry.error_message.as_deref(), Some("submit: Validation failed: bad"));
    }

    #[test]
    fn test_entries_get_distinct_ids() {
        let a = UsageEntry::success(ctx(), 0.1, 1, json!({}));
        let b = UsageEntry::success(ctx(), 0.1, 1, json!({}));
        assert_ne!(a.id, b.id);
    }
}
