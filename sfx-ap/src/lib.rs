//! # SFX Audio Player Library (sfx-ap)
//!
//! Voice pool and cue dispatcher for game sound effects and music.
//!
//! **Purpose:** Keep a bounded pool of reusable voices, play queued clips
//! on them with cancellable, pause-aware sequences, and dispatch cues
//! raised on in-process cue channels.
//!
//! **Architecture:** `playback` (Voice, VoicePool) is driven by the
//! single-task `manager::AudioManager`; audio output sits behind the
//! `audio::PlaybackChannel` trait.

pub mod audio;
pub mod config;
pub mod console;
pub mod cue;
pub mod cue_channel;
pub mod error;
pub mod logging;
pub mod manager;
pub mod playback;

pub use cue::{AudioCue, CueHandle};
pub use cue_channel::{CueChannel, CueRequest};
pub use error::{Error, Result};
pub use manager::{AudioManager, ManagerHandle, ManagerStatus};
pub use playback::{PlaybackRequest, Voice, VoiceId, VoicePool};
