use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "framecast",
    version,
    long_version = concat!(
        env!("CARGO_PKG_VERSION"), " (", env!("FRAMECAST_GIT_HASH"), " ", env!("FRAMECAST_BUILD_DATE"), ")"
    ),
    about = "Generate video through a hosted model provider"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub context: ContextArgs,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a video from a text prompt
    Text(TextArgs),
    /// Generate a video from an image
    Image(ImageArgs),
    /// Show the current state of a job
    Status(JobArgs),
    /// Ask the provider to cancel a job
    Cancel(JobArgs),
    /// List catalog models
    Models(ModelsArgs),
    /// Show recorded usage and cost
    Usage(UsageArgs),
    /// Inspect or change stored provider settings
    Settings(SettingsArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

#[derive(Args, Clone, Default)]
pub struct ContextArgs {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// SQLite database path (overrides the config file)
    #[arg(long, global = true)]
    pub db: Option<String>,
}

#[derive(Args, Clone)]
pub struct GenerateArgs {
    /// Catalog model key (defaults to the configured model)
    #[arg(short, long)]
    pub model: Option<String>,

    /// User id recorded with the usage entry
    #[arg(long)]
    pub user: Option<String>,

    /// Let the provider rewrite the prompt when the model supports it
    #[arg(long)]
    pub optimize_prompt: bool,

    /// Webhook URL the provider should notify
    #[arg(long)]
    pub webhook: Option<String>,

    /// Comma-separated webhook events: start, output, logs, completed
    #[arg(long, requires = "webhook")]
    pub webhook_events: Option<String>,

    /// Give up waiting after this many milliseconds
    #[arg(long)]
    pub max_wait_ms: Option<u64>,

    /// Delay between status checks in milliseconds
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Retry transient failures this many times
    #[arg(long, default_value = "0")]
    pub retries: u32,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone)]
pub struct TextArgs {
    /// Text prompt
    pub prompt: String,

    #[command(flatten)]
    pub generate: GenerateArgs,
}

#[derive(Args, Clone)]
pub struct ImageArgs {
    /// URL of the source image
    pub image_url: String,

    /// Optional prompt for image-to-video models
    #[arg(short, long)]
    pub prompt: Option<String>,

    #[command(flatten)]
    pub generate: GenerateArgs,
}

#[derive(Args, Clone)]
pub struct JobArgs {
    /// Provider job id
    pub job_id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone)]
pub struct ModelsArgs {
    /// Only list one type: text_to_video, image_to_video, image_animation
    #[arg(long = "type")]
    pub model_type: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone)]
pub struct UsageArgs {
    /// Only entries for this user
    #[arg(long)]
    pub user: Option<String>,

    /// Number of recent entries to show
    #[arg(short, long, default_value = "20")]
    pub limit: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub action: SettingsAction,
}

#[derive(Subcommand, Clone)]
pub enum SettingsAction {
    /// Print stored settings with secrets masked
    Show,
    /// Store a setting
    Set {
        /// One of provider.api_key, provider.enabled, provider.default_model, provider.webhook_secret
        key: String,
        value: String,
    },
    /// Remove a stored setting
    Unset { key: String },
}

#[derive(Args, Clone)]
pub struct ValidateArgs {
    /// Config file to validate
    pub config: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_command() {
        let cli = Cli::try_parse_from([
            "framecast", "text", "a red fox", "--model", "luma-ray", "--max-wait-ms", "5000", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Text(args) => {
                assert_eq!(args.prompt, "a red fox");
                assert_eq!(args.generate.model.as_deref(), Some("luma-ray"));
                assert_eq!(args.generate.max_wait_ms, Some(5000));
                assert_eq!(args.generate.retries, 0);
            }
            _ => panic!("expected text command"),
        }
    }

    #[test]
    fn test_webhook_events_require_webhook() {
        let result = Cli::try_parse_from(["framecast", "text", "x", "--webhook-events", "completed"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_db_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["framecast", "usage", "--db", "/tmp/u.db", "--limit", "5"]).unwrap();
        assert_eq!(cli.context.db.as_deref(), Some("/tmp/u.db"));
        match cli.command {
            Commands::Usage(args) => assert_eq!(args.limit, 5),
            _ => panic!("expected usage command"),
        }
    }

    #[test]
    fn test_settings_set() {
        let cli = Cli::try_parse_from(["framecast", "settings", "set", "provider.enabled", "true"]).unwrap();
        match cli.command {
            Commands::Settings(SettingsArgs { action: SettingsAction::Set { key, value } }) => {
                assert_eq!(key, "provider.enabled");
                assert_eq!(value, "true");
            }
            _ => panic!("expected settings set"),
        }
    }
}
