mod config;

use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use config::Config;
use liveness::HealthFlags;
use media::{ScratchDir, VoiceBridge, YtDlp};
use ::telegram::{telegram, AppContext, SystemStatus};
use teloxide::prelude::*;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Handler dependencies built from the startup results
fn app_context(
    config: &Config,
    extractor: YtDlp,
    voice: VoiceBridge,
    voice_available: bool,
    started_at: DateTime<Utc>,
) -> AppContext {
    AppContext {
        extractor: Arc::new(extractor),
        voice: Arc::new(voice),
        scratch: ScratchDir::new(&config.download_dir),
        status: SystemStatus {
            voice_available,
            started_at,
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    let _ = dotenv::dotenv();

    init_tracing();

    let config = Config::from_env().context("Invalid configuration")?;
    tracing::info!(?config, "Configuration loaded");
    let started_at = Utc::now();

    let bot = Bot::new(&config.bot_token);

    // Playback needs the bridge; everything else keeps working without it
    let voice = VoiceBridge::new(&config.voice_bridge_bin, config.bridge_credentials());
    let voice_available = match voice.start().await {
        Ok(version) => {
            tracing::info!("Voice bridge ready ({})", version);
            true
        }
        Err(e) => {
            tracing::error!("Voice calls unavailable: {}", e);
            false
        }
    };

    let extractor = YtDlp::new(&config.ytdlp_bin);
    match extractor.version().await {
        Ok(version) => tracing::info!("yt-dlp {}", version),
        Err(e) => tracing::warn!("yt-dlp is not usable yet: {}", e),
    }

    liveness::spawn_background("0.0.0.0", config.port, HealthFlags { voice_available })
        .context("Failed to start liveness thread")?;

    if let Err(e) = telegram::set_bot_commands(&bot).await {
        tracing::warn!("Failed to register bot commands: {}", e);
    }

    let ctx = app_context(&config, extractor, voice, voice_available, started_at);

    tracing::info!(voice_available, "Bot started");

    Dispatcher::builder(bot, telegram::schema())
        .dependencies(dptree::deps![ctx])
        .default_handler(|_| async {})
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    tracing::info!("Bot stopped");
    Ok(())
}
