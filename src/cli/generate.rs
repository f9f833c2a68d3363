use std::sync::Arc;
use std::time::Duration;

use framecast::errors::{with_retry, FramecastError, RetryPolicy};
use framecast::jobs::{PollObserver, PollOptions};
use framecast::pipeline::{GenerateOptions, GenerationResult};
use framecast::provider::WebhookEvent;
use tracing::info;

use super::commands::{ContextArgs, GenerateArgs, ImageArgs, TextArgs};
use super::context::AppContext;
use super::progress::JobProgress;

pub async fn handle_text(context: &ContextArgs, args: TextArgs, quiet: bool) -> Result<(), FramecastError> {
    let ctx = AppContext::load(context).await?;
    let options = build_options(&ctx, &args.generate)?;
    let progress = progress_for(&args.generate, quiet);
    let orchestrator = ctx.orchestrator(progress.clone().map(|p| p as Arc<dyn PollObserver>));

    info!(model = ?options.model_key, "Generating from text");
    let policy = retry_policy(&args.generate);
    let (orchestrator, options, prompt) = (&orchestrator, &options, args.prompt.as_str());
    let result = with_retry("generate_from_text", &policy, move || {
        orchestrator.generate_from_text(prompt, options)
    })
    .await;

    report(result, progress.as_deref(), args.generate.json)
}

pub async fn handle_image(context: &ContextArgs, args: ImageArgs, quiet: bool) -> Result<(), FramecastError> {
    let ctx = AppContext::load(context).await?;
    let options = build_options(&ctx, &args.generate)?;
    let progress = progress_for(&args.generate, quiet);
    let orchestrator = ctx.orchestrator(progress.clone().map(|p| p as Arc<dyn PollObserver>));

    info!(model = ?options.model_key, image_url = %args.image_url, "Generating from image");
    let policy = retry_policy(&args.generate);
    let (orchestrator, options) = (&orchestrator, &options);
    let (image_url, prompt) = (args.image_url.as_str(), args.prompt.as_deref());
    let result = with_retry("generate_from_image", &policy, move || {
        orchestrator.generate_from_image(image_url, prompt, options)
    })
    .await;

    report(result, progress.as_deref(), args.generate.json)
}

fn build_options(ctx: &AppContext, args: &GenerateArgs) -> Result<GenerateOptions, FramecastError> {
    let mut poll = PollOptions::from_config(&ctx.config);
    if let Some(ms) = args.max_wait_ms {
        poll.max_wait = Duration::from_millis(ms);
    }
    if let Some(ms) = args.interval_ms {
        poll.poll_interval = Duration::from_millis(ms);
    }
    if poll.max_wait.is_zero() || poll.poll_interval.is_zero() {
        return Err(FramecastError::ValidationFailed(
            "--max-wait-ms and --interval-ms must be greater than zero".into(),
        ));
    }

    Ok(GenerateOptions {
        model_key: args.model.clone(),
        user_id: args.user.clone(),
        subject_type: None,
        prompt_optimizer: args.optimize_prompt,
        webhook_url: args.webhook.clone(),
        webhook_events_filter: args.webhook_events.as_deref().map(parse_webhook_events).transpose()?,
        poll,
        metadata: serde_json::Map::from_iter([("source".to_string(), serde_json::json!("cli"))]),
    })
}

fn parse_webhook_events(value: &str) -> Result<Vec<WebhookEvent>, FramecastError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            WebhookEvent::parse(s)
                .ok_or_else(|| FramecastError::ValidationFailed(format!("unknown webhook event: {}", s)))
        })
        .collect()
}

fn retry_policy(args: &GenerateArgs) -> RetryPolicy {
    RetryPolicy { max_retries: args.retries, ..Default::default() }
}

fn progress_for(args: &GenerateArgs, quiet: bool) -> Option<Arc<JobProgress>> {
    if quiet || args.json {
        return None;
    }
    let label = args.model.as_deref().unwrap_or("default model");
    Some(Arc::new(JobProgress::new(label)))
}

fn report(
    result: Result<GenerationResult, FramecastError>,
    progress: Option<&JobProgress>,
    json: bool,
) -> Result<(), FramecastError> {
    let result = match result {
        Ok(result) => result,
        Err(e) => {
            if let Some(progress) = progress {
                progress.finish_failure(&e.to_string());
            }
            return Err(e);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }
    match progress {
        Some(progress) => {
            progress.finish_success(&result.result_url);
            println!("Model: {} | Job: {} | Cost: ${:.2}", result.model_key, result.job.id, result.cost_usd);
        }
        None => println!("{}", result.result_url),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_webhook_events() {
        let events = parse_webhook_events("start, completed").unwrap();
        assert_eq!(events, vec![WebhookEvent::Start, WebhookEvent::Completed]);
    }

    #[test]
    fn test_parse_webhook_events_rejects_unknown() {
        let err = parse_webhook_events("start,finished").unwrap_err();
        assert!(matches!(err, FramecastError::ValidationFailed(msg) if msg.contains("finished")));
    }
}
