//! Playback requests queued on a voice

use crate::audio::{AudioClip, AudioConfiguration, Position};
use std::sync::Arc;
use std::time::Duration;

/// One clip to play on a voice
///
/// Immutable once built; the voice takes ownership on enqueue.
#[derive(Debug, Clone)]
pub struct PlaybackRequest {
    clip: AudioClip,
    configuration: Arc<AudioConfiguration>,
    looping: bool,
    position: Position,
}

impl PlaybackRequest {
    pub fn new(
        clip: AudioClip,
        configuration: Arc<AudioConfiguration>,
        looping: bool,
        position: Position,
    ) -> Self {
        Self {
            clip,
            configuration,
            looping,
            position,
        }
    }

    /// One-shot request with default configuration at the origin
    pub fn one_shot(clip: AudioClip) -> Self {
        Self::new(clip, Arc::default(), false, Position::ORIGIN)
    }

    /// Looping request with default configuration at the origin
    pub fn looping(clip: AudioClip) -> Self {
        Self::new(clip, Arc::default(), true, Position::ORIGIN)
    }

    pub fn clip(&self) -> &AudioClip {
        &self.clip
    }

    pub fn configuration(&self) -> &AudioConfiguration {
        &self.configuration
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// How long the sequence waits before advancing past this request
    pub fn duration(&self) -> Duration {
        self.clip.duration()
    }
}
