use console::style;
use framecast::errors::FramecastError;
use framecast::jobs::{extract_primary_url, CancelOutcome};
use tracing::info;

use super::commands::{ContextArgs, JobArgs};
use super::context::AppContext;
use super::progress::status_label;

pub async fn handle_status(context: &ContextArgs, args: JobArgs) -> Result<(), FramecastError> {
    let ctx = AppContext::load(context).await?;
    info!(job_id = %args.job_id, "Querying job status");
    let record = ctx.poller().fetch(&args.job_id).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    println!("Job:     {}", record.id);
    println!("Status:  {}", status_label(record.status));
    println!("Created: {}", record.created_at.to_rfc3339());
    if let Some(completed) = record.completed_at {
        println!("Done:    {}", completed.to_rfc3339());
    }
    if let Some(predict) = record.metrics.as_ref().and_then(|m| m.predict_time_seconds) {
        println!("Compute: {:.1}s", predict);
    }
    if let Some(output) = &record.output {
        match extract_primary_url(output) {
            Ok(url) => println!("Output:  {}", url),
            Err(e) => println!("Output:  {}", style(e).dim()),
        }
    }
    if let Some(error) = &record.error_message {
        println!("Error:   {}", style(error).red());
    }
    Ok(())
}

pub async fn handle_cancel(context: &ContextArgs, args: JobArgs) -> Result<(), FramecastError> {
    let ctx = AppContext::load(context).await?;
    info!(job_id = %args.job_id, "Canceling job");
    let outcome = ctx.poller().cancel(&args.job_id).await?;

    if args.json {
        let value = match outcome {
            CancelOutcome::Requested => serde_json::json!({ "job_id": args.job_id, "canceled": true }),
            CancelOutcome::AlreadyTerminal(status) => {
                serde_json::json!({ "job_id": args.job_id, "canceled": false, "status": status })
            }
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    match outcome {
        CancelOutcome::Requested => println!("Cancellation requested for job {}", args.job_id),
        CancelOutcome::AlreadyTerminal(status) => {
            println!("Job {} already finished ({})", args.job_id, status_label(status))
        }
    }
    Ok(())
}
