use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::errors::FramecastError;
use super::entry::UsageEntry;

/// Write side of the external usage ledger.
#[async_trait]
pub trait UsageLedger: Send + Sync {
    async fn append(&self, entry: &UsageEntry) -> Result<(), FramecastError>;
}

/// Appends ledger rows on behalf of the orchestration facades. A ledger
/// failure is logged and dropped so it cannot replace the caller's outcome.
pub struct UsageRecorder {
    ledger: Arc<dyn UsageLedger>,
}

impl UsageRecorder {
    pub fn new(ledger: Arc<dyn UsageLedger>) -> Self {
        Self { ledger }
    }

    pub async fn record(&self, entry: UsageEntry) {
        match self.ledger.append(&entry).await {
            Ok(()) => debug!(
                entry_id = %entry.id,
                model = %entry.model_id,
                success = entry.success,
                cost_usd = entry.cost_usd,
                "Usage recorded"
            ),
            Err(e) => warn!(
                entry_id = %entry.id,
                model = %entry.model_id,
                success = entry.success,
                error = %e,
                "Failed to append usage entry"
            ),
        }
    }
}
