mod cli;

use clap::Parser;
use framecast::config;
use framecast::errors::FramecastError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(!cli.no_color)
            .with_writer(std::io::stderr)
            .init();
    }
    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let context = cli.context.clone();
    let quiet = cli.quiet;
    let result = match cli.command {
        cli::Commands::Text(args) => cli::generate::handle_text(&context, args, quiet).await,
        cli::Commands::Image(args) => cli::generate::handle_image(&context, args, quiet).await,
        cli::Commands::Status(args) => cli::jobs::handle_status(&context, args).await,
        cli::Commands::Cancel(args) => cli::jobs::handle_cancel(&context, args).await,
        cli::Commands::Models(args) => cli::models::handle_models(args),
        cli::Commands::Usage(args) => cli::usage::handle_usage(&context, args).await,
        cli::Commands::Settings(args) => cli::settings::handle_settings(&context, args).await,
        cli::Commands::Validate(args) => handle_validate(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(exit_code(&e));
    }
}

fn exit_code(error: &FramecastError) -> i32 {
    match error {
        FramecastError::ConfigurationMissing(_)
        | FramecastError::Config(_)
        | FramecastError::Yaml(_) => 2,
        FramecastError::ValidationFailed(_)
        | FramecastError::UnknownModel(_)
        | FramecastError::UnsupportedOperation(_) => 3,
        FramecastError::ProviderError { .. }
        | FramecastError::TransportError(_)
        | FramecastError::ModelNotFound(_) => 4,
        FramecastError::Timeout { .. }
        | FramecastError::GenerationFailed(_)
        | FramecastError::Canceled(_)
        | FramecastError::EmptyResult(_) => 5,
        _ => 1,
    }
}

async fn handle_validate(args: cli::commands::ValidateArgs) -> Result<(), FramecastError> {
    let path = std::path::PathBuf::from(&args.config);
    let parsed = config::parse_config(&path).await?;
    println!("Configuration is valid: {}", args.config);
    println!(
        "  base_url={} max_wait_ms={} poll_interval_ms={} cache_ttl_secs={}",
        parsed.base_url(),
        parsed.max_wait_ms(),
        parsed.poll_interval_ms(),
        parsed.cache_ttl_secs(),
    );
    Ok(())
}
