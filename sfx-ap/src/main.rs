//! SFX Audio Player (sfx-ap) - Console entry point
//!
//! Runs the voice pool and cue dispatcher against virtual output channels
//! and reads commands from stdin. Cues raised with `play`/`music` travel
//! through the cue channels exactly as gameplay events would.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use sfx_ap::audio::{ParameterMixer, VirtualChannelFactory};
use sfx_ap::config::PlayerConfig;
use sfx_ap::console::{Command, Console, Outcome, HELP};
use sfx_ap::cue_channel::{MUSIC_CHANNEL, SFX_CHANNEL};
use sfx_ap::logging;
use sfx_ap::{AudioManager, CueChannel, VoicePool};
use sfx_common::events::EventBus;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Command-line arguments for sfx-ap
#[derive(Parser, Debug)]
#[command(name = "sfx-ap")]
#[command(about = "Sound-effect voice pool and cue dispatcher")]
#[command(version)]
struct Args {
    /// Config file (overrides SFX_CONFIG and the platform default)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Voices to create at startup (overrides [pool] initial_size)
    #[arg(short, long)]
    pool_size: Option<usize>,

    /// Print every SfxEvent as a JSON line
    #[arg(short, long)]
    events: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_handle = logging::init();
    let config = PlayerConfig::load(args.config.as_deref())
        .context("Failed to load configuration")?;
    log_handle
        .apply(&config.settings.logging)
        .context("Failed to apply logging configuration")?;

    info!("Starting SFX Audio Player");
    match &config.source {
        Some(path) => info!("Configuration: {}", path.display()),
        None => info!("Configuration: compiled defaults"),
    }

    let settings = &config.settings;
    let pool_size = args.pool_size.unwrap_or(settings.pool.initial_size);
    let capacity = settings.pool.effective_capacity().max(pool_size);

    let event_bus = EventBus::new(settings.event_bus_capacity);
    let pool = Arc::new(VoicePool::new(
        Arc::new(VirtualChannelFactory::new()),
        capacity,
        event_bus.clone(),
    ));
    let mixer = Arc::new(ParameterMixer::with_default_groups());

    let mut manager = AudioManager::new(pool, mixer, event_bus.clone());
    manager.init(pool_size, &settings.volume);

    let sfx = CueChannel::new(SFX_CHANNEL);
    let music = CueChannel::new(MUSIC_CHANNEL);
    manager.subscribe(&sfx);
    manager.subscribe(&music);

    if args.events {
        tokio::spawn(print_events(event_bus.subscribe()));
    }

    let console = Console::new(manager.handle(), config.library.clone(), sfx, music);
    let shutdown = CancellationToken::new();
    let dispatcher = tokio::spawn(manager.run(shutdown.clone()));

    println!("{}", HELP);

    tokio::select! {
        result = read_commands(&console) => result?,
        _ = shutdown_signal() => {}
    }

    shutdown.cancel();
    let manager = dispatcher.await.context("Dispatcher task failed")?;
    let pool = manager.status().pool;
    info!(
        "Shutdown complete ({} voices created, capacity {})",
        pool.total, pool.capacity
    );
    Ok(())
}

/// Read and execute console commands until `quit` or end of input
async fn read_commands(console: &Console) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match console.execute(command).await {
            Ok(Outcome::Reply(text)) => println!("{}", text),
            Ok(Outcome::Quit) => break,
            Err(e) => println!("error: {}", e),
        }
    }

    Ok(())
}

/// Print events as JSON lines for `--events`
async fn print_events(mut rx: broadcast::Receiver<sfx_common::events::SfxEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => println!("{}", json),
                Err(e) => warn!("Failed to serialize event: {}", e),
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Event printer lagged, {} events skipped", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
