//! Error types for sfx-ap
//!
//! Defines module-specific error types using thiserror for clear error propagation.

use thiserror::Error;

/// Main error type for sfx-ap
#[derive(Error, Debug)]
pub enum Error {
    /// Errors bubbled up from sfx-common (config loading)
    #[error(transparent)]
    Common(#[from] sfx_common::Error),

    /// Configuration file or cue library errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Playback channel rejected an operation
    #[error("Playback channel error: {0}")]
    Channel(String),

    /// Voice or sequence errors
    #[error("Playback error: {0}")]
    Playback(String),

    /// Pool partition errors (double return, foreign voice)
    #[error("Voice pool error: {0}")]
    Pool(String),

    /// Mixer has no exposed parameter with this name
    #[error("Mixer parameter not found: {0}")]
    MixerParameterNotFound(String),

    /// Resource not found (cue, handle)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request (console commands, clip data)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Dispatcher is no longer running
    #[error("Dispatcher stopped")]
    DispatcherStopped,
}

/// Convenience Result type using sfx-ap Error
pub type Result<T> = std::result::Result<T, Error>;
