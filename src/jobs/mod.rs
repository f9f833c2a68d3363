pub mod extract;
pub mod poller;
pub mod submitter;

pub use extract::{extract_from_record, extract_primary_url};
pub use poller::{CancelOutcome, JobPoller, NoopObserver, PollObserver, PollOptions};
pub use submitter::{JobSubmitter, SubmitOptions};
