pub mod entry;
pub mod recorder;

pub use entry::{UsageContext, UsageEntry, UsageSummary};
pub use recorder::{UsageLedger, UsageRecorder};
