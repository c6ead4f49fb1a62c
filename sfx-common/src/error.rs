//! Common error types for the SFX crates

use thiserror::Error;

/// Common result type for SFX operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the SFX crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
