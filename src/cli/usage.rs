use console::style;
use framecast::errors::FramecastError;

use super::commands::{ContextArgs, UsageArgs};
use super::context::AppContext;

pub async fn handle_usage(context: &ContextArgs, args: UsageArgs) -> Result<(), FramecastError> {
    let ctx = AppContext::load(context).await?;
    let summary = ctx.db.usage_summary(args.user.as_deref())?;
    let entries = ctx.db.list_usage(args.limit, args.user.as_deref())?;

    if args.json {
        let value = serde_json::json!({ "summary": summary, "entries": entries });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!(
        "Calls: {} ({} ok, {} failed) | Total cost: ${:.2}",
        summary.total_calls, summary.successful_calls, summary.failed_calls, summary.total_cost_usd,
    );
    if entries.is_empty() {
        return Ok(());
    }

    println!();
    for entry in &entries {
        let marker = if entry.success { style("✓").green() } else { style("✗").red() };
        println!(
            "{} {} {:<38} {:<16} ${:.2} {:>7}ms",
            marker,
            entry.created_at.format("%Y-%m-%d %H:%M:%S"),
            entry.model_id,
            entry.request_kind,
            entry.cost_usd,
            entry.response_time_ms,
        );
        if let Some(message) = &entry.error_message {
            println!("    {}", style(message).dim());
        }
    }
    Ok(())
}
