//! Tracing setup for the console binary
//!
//! The subscriber is installed before configuration is read so that
//! config loading can already log. The configured level and log file are
//! applied afterwards through reload handles.

use crate::error::{Error, Result};
use sfx_common::config::LoggingConfig;
use std::sync::Mutex;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Layer, Registry};

type FileLayer = Option<Box<dyn Layer<Registry> + Send + Sync>>;
type FileSlot = reload::Layer<FileLayer, Registry>;

/// Applies `[logging]` to the already installed subscriber
pub struct LogHandle {
    filter: reload::Handle<EnvFilter, Layered<FileSlot, Registry>>,
    file: reload::Handle<FileLayer, Registry>,
    /// RUST_LOG was set; it wins over the configured level
    from_env: bool,
}

/// Install the global subscriber at the default level
///
/// Uses RUST_LOG when set. Panics if a global subscriber already exists.
pub fn init() -> LogHandle {
    let env_filter = EnvFilter::try_from_default_env().ok();
    let from_env = env_filter.is_some();
    let filter = env_filter.unwrap_or_else(|| level_filter(&LoggingConfig::default().level));

    let no_file: FileLayer = None;
    let (file_slot, file) = reload::Layer::new(no_file);
    let (filter_slot, filter) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(file_slot)
        .with(filter_slot)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    LogHandle {
        filter,
        file,
        from_env,
    }
}

impl LogHandle {
    /// Switch to the configured level and start writing the log file, if any
    pub fn apply(&self, logging: &LoggingConfig) -> Result<()> {
        if !self.from_env {
            self.filter
                .reload(level_filter(&logging.level))
                .map_err(|e| Error::Config(format!("Failed to apply log level: {}", e)))?;
        }

        if let Some(path) = &logging.file {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    Error::Config(format!("Failed to open log file {}: {}", path.display(), e))
                })?;
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .boxed();
            self.file
                .reload(Some(layer))
                .map_err(|e| Error::Config(format!("Failed to attach log file: {}", e)))?;
        }

        Ok(())
    }
}

fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!("sfx_ap={level},sfx_common={level}"))
}
