use std::sync::Mutex;
use std::time::{Duration, Instant};

use console::style;
use framecast::jobs::PollObserver;
use framecast::provider::JobStatus;
use indicatif::{ProgressBar, ProgressStyle};

/// Spinner shown while a generation job is polled.
pub struct JobProgress {
    bar: ProgressBar,
    started: Instant,
    last_status: Mutex<Option<JobStatus>>,
}

impl JobProgress {
    pub fn new(model_key: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar.set_message(format!("Submitting to {}...", model_key));
        bar.enable_steady_tick(Duration::from_millis(120));

        Self { bar, started: Instant::now(), last_status: Mutex::new(None) }
    }

    pub fn finish_success(&self, url: &str) {
        self.bar.finish_with_message(format!(
            "{} Done in {} {}",
            style("✓").green(),
            format_elapsed(self.started.elapsed().as_millis() as u64),
            url,
        ));
    }

    pub fn finish_failure(&self, error: &str) {
        self.bar.abandon_with_message(format!("{} {}", style("✗").red(), error));
    }
}

impl PollObserver for JobProgress {
    fn on_status(&self, job_id: &str, attempt: u64, status: JobStatus) {
        if let Ok(mut last) = self.last_status.lock() {
            if *last != Some(status) {
                self.bar.println(format!("  {} {}", style(job_id).dim(), status_label(status)));
                *last = Some(status);
            }
        }
        self.bar.set_message(format!(
            "{} | {} | poll #{}",
            status_label(status),
            format_elapsed(self.started.elapsed().as_millis() as u64),
            attempt,
        ));
    }
}

pub fn status_label(status: JobStatus) -> String {
    match status {
        JobStatus::Starting => style("starting").yellow().to_string(),
        JobStatus::Processing => style("processing").cyan().to_string(),
        JobStatus::Succeeded => style("succeeded").green().to_string(),
        JobStatus::Failed => style("failed").red().to_string(),
        JobStatus::Canceled => style("canceled").dim().to_string(),
    }
}

fn format_elapsed(ms: u64) -> String {
    let secs = ms / 1000;
    let mins = secs / 60;
    let remaining_secs = secs % 60;
    if mins > 0 {
        format!("{}m{}s", mins, remaining_secs)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(4_500), "4s");
        assert_eq!(format_elapsed(125_000), "2m5s");
    }

    #[test]
    fn test_observer_tracks_status_changes() {
        let progress = JobProgress::new("luma-ray");
        progress.bar.set_draw_target(indicatif::ProgressDrawTarget::hidden());
        progress.on_status("p1", 1, JobStatus::Starting);
        progress.on_status("p1", 2, JobStatus::Processing);
        assert_eq!(*progress.last_status.lock().unwrap(), Some(JobStatus::Processing));
    }
}
