//! Leave bot server binary.
//!
//! Start the server with:
//! ```bash
//! TELEGRAM_BOT_TOKEN=xxx GOOGLE_AI_API_KEY=yyy cargo run -p leave-api
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use leave_api::{serve, ApiConfig, AppState};
use leave_core::{config, GeminiClient, Settings};
use leave_persistence::{FileStore, LeaveRepository, PostgrestStore};
use leave_telegram::{TelegramClient, TelegramError};
use tracing_subscriber::EnvFilter;

/// Leave bot - Telegram leave requests into the leave system
#[derive(Parser, Debug)]
#[command(name = "leave-bot")]
#[command(about = "Telegram webhook and REST API for leave requests")]
struct Args {
    /// Host to bind to
    #[arg(long, env = "LEAVEBOT_HOST", default_value = leave_api::config::DEFAULT_HOST)]
    host: String,

    /// Port to bind to
    #[arg(short, long, env = "LEAVEBOT_PORT", default_value_t = leave_api::config::DEFAULT_PORT)]
    port: u16,

    /// Directory for the JSON-file store (ignored when Supabase is configured)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Environment files first so that clap's env fallbacks see them.
    config::load_env_files();
    let args = Args::parse();

    let filter = match args.verbose {
        0 => "leave_api=info,leave_telegram=info,leave_core=info,leave_persistence=info,tower_http=warn",
        1 => "leave_api=debug,leave_telegram=debug,leave_core=debug,leave_persistence=debug,tower_http=info",
        2 => "leave_api=trace,leave_telegram=trace,leave_core=trace,leave_persistence=trace,tower_http=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::from_env();

    let token = settings
        .telegram
        .bot_token
        .clone()
        .ok_or(TelegramError::NoToken)?;
    let sender = TelegramClient::new(token, &settings.telegram.api_url)?;

    let repo: Arc<dyn LeaveRepository> = match &settings.supabase {
        Some(supabase) => {
            tracing::info!(url = %supabase.url, "Using Supabase storage");
            Arc::new(PostgrestStore::new(&supabase.url, &supabase.service_role_key))
        }
        None => {
            let dir = match args.data_dir {
                Some(dir) => {
                    std::fs::create_dir_all(&dir)?;
                    dir
                }
                None => config::ensure_data_dir()?,
            };
            tracing::info!(path = %dir.display(), "Using file storage");
            Arc::new(FileStore::new(dir))
        }
    };

    let model = GeminiClient::from_settings(&settings.gemini);
    if !model.is_available() {
        tracing::warn!("GOOGLE_AI_API_KEY not set; every message will be answered as not understood");
    }

    let api_config = ApiConfig::new(args.host, args.port);
    let state = AppState::assemble(
        api_config.clone(),
        repo,
        Arc::new(model),
        Arc::new(sender),
        settings.pipeline,
        settings.telegram.bot_username.clone(),
        settings.telegram.locale,
    );

    tracing::info!(
        min_confidence = settings.pipeline.min_confidence,
        reject_relative_dates = settings.pipeline.reject_relative_dates,
        locale = %settings.telegram.locale,
        "Starting leave bot"
    );
    serve(api_config, state).await?;
    Ok(())
}
