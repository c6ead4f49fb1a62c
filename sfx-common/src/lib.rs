//! # SFX Common Library
//!
//! Shared code for the sound-emitter services including:
//! - Error type used across crates
//! - Bootstrap configuration loading (TOML)
//! - Event types (SfxEvent enum) and the EventBus
//! - Mixer volume conversions between UI sliders and decibels

pub mod config;
pub mod error;
pub mod events;
pub mod volume;

pub use error::{Error, Result};
pub use volume::{mixer_value_to_normalized, normalized_to_mixer_value};
