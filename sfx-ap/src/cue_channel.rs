//! In-process cue channels
//!
//! Gameplay code raises cues on a named channel; the audio manager
//! subscribes and plays them. Built on a tokio broadcast channel, so a
//! slow subscriber lags rather than blocking the sender.

use crate::audio::{AudioConfiguration, Position};
use crate::cue::AudioCue;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// Default channel for sound effects
pub const SFX_CHANNEL: &str = "sfx";

/// Default channel for music
pub const MUSIC_CHANNEL: &str = "music";

const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// "Play this cue" event carried by a cue channel
#[derive(Debug, Clone)]
pub struct CueRequest {
    pub cue: Arc<AudioCue>,
    pub configuration: Arc<AudioConfiguration>,
    pub position: Position,
}

impl CueRequest {
    pub fn new(cue: Arc<AudioCue>, configuration: Arc<AudioConfiguration>, position: Position) -> Self {
        Self {
            cue,
            configuration,
            position,
        }
    }
}

/// Named publish/subscribe channel for cue requests
#[derive(Debug, Clone)]
pub struct CueChannel {
    name: Arc<str>,
    tx: broadcast::Sender<CueRequest>,
}

impl CueChannel {
    pub fn new(name: &str) -> Self {
        Self::with_capacity(name, DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(name: &str, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            name: Arc::from(name),
            tx,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Publish a cue; returns how many subscribers received it
    pub fn raise(
        &self,
        cue: Arc<AudioCue>,
        configuration: Arc<AudioConfiguration>,
        position: Position,
    ) -> usize {
        let cue_name = cue.name().to_string();
        match self.tx.send(CueRequest::new(cue, configuration, position)) {
            Ok(receivers) => receivers,
            Err(_) => {
                debug!(channel = %self.name, cue = %cue_name, "Cue raised with no subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CueRequest> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioClip;
    use std::time::Duration;

    fn cue() -> Arc<AudioCue> {
        Arc::new(AudioCue::single(
            "click",
            AudioClip::new("click", Duration::from_millis(80)),
            false,
        ))
    }

    #[test]
    fn test_raise_without_subscribers() {
        let channel = CueChannel::new(SFX_CHANNEL);
        assert_eq!(channel.raise(cue(), Arc::default(), Position::ORIGIN), 0);
    }

    #[tokio::test]
    async fn test_subscribers_receive_cue() {
        let channel = CueChannel::new(MUSIC_CHANNEL);
        let mut rx = channel.subscribe();
        assert_eq!(channel.subscriber_count(), 1);

        let position = Position::new(1.0, 2.0, 3.0);
        assert_eq!(channel.raise(cue(), Arc::default(), position), 1);

        let request = rx.recv().await.unwrap();
        assert_eq!(request.cue.name(), "click");
        assert_eq!(request.position, position);
    }
}
