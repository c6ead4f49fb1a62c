//! Voice-related types shared by events and the player

use serde::{Deserialize, Serialize};

/// Voice lifecycle state
///
/// `Idle → Playing → Finishing → Idle` for one-shot clips; looping clips
/// stay `Playing`. `Cancelled` is a short side transition back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceState {
    Idle,
    Playing,
    Finishing,
    Cancelled,
}

impl VoiceState {
    /// True while a sequence owns the voice
    pub fn is_active(&self) -> bool {
        matches!(self, VoiceState::Playing | VoiceState::Finishing)
    }
}

impl std::fmt::Display for VoiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoiceState::Idle => write!(f, "idle"),
            VoiceState::Playing => write!(f, "playing"),
            VoiceState::Finishing => write!(f, "finishing"),
            VoiceState::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Why a clip of a cue was not played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Every voice in the pool was checked out
    PoolExhausted,
    /// The voice refused the request (no runtime, shutdown)
    Rejected,
}
