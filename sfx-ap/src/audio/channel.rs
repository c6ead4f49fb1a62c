//! Playback channel abstraction
//!
//! A channel is the audio-output primitive a voice drives: it is
//! configured with one clip at a time and then started, stopped, paused
//! or resumed. Channels are shared between a voice handle and its
//! sequence task, so every method takes `&self`.

use crate::audio::clip::AudioClip;
use crate::audio::settings::{AudioConfiguration, Position};
use crate::error::Result;
use crate::playback::VoiceId;
use std::sync::Arc;

/// Audio output primitive driven by a voice
pub trait PlaybackChannel: Send + Sync {
    /// Load a clip and its settings; stops anything currently playing
    fn configure(
        &self,
        clip: &AudioClip,
        looping: bool,
        position: Position,
        configuration: &AudioConfiguration,
    ) -> Result<()>;

    /// Start the configured clip from the beginning
    fn play(&self) -> Result<()>;

    /// Hard stop; the playhead is discarded
    fn stop(&self);

    /// Suspend output, keeping the playhead
    fn pause(&self);

    /// Continue output from the paused playhead
    fn resume(&self);

    /// True while audio is being produced
    fn is_playing(&self) -> bool;
}

/// Creates channels for new voices
pub trait ChannelFactory: Send + Sync {
    fn create(&self, voice_id: VoiceId) -> Arc<dyn PlaybackChannel>;
}

