//! In-process playback channel
//!
//! Tracks transport state against the tokio clock without producing any
//! sound, and records the operations it receives. Used by the console
//! binary as its output device and by tests to observe what a voice did.
//! Only the most recent `HISTORY_LIMIT` operations are kept.

use crate::audio::channel::{ChannelFactory, PlaybackChannel};
use crate::audio::clip::AudioClip;
use crate::audio::settings::{AudioConfiguration, Position};
use crate::error::{Error, Result};
use crate::playback::VoiceId;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Operations retained per channel
pub const HISTORY_LIMIT: usize = 256;

/// Operation received by a virtual channel
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelOp {
    Configure {
        clip: String,
        looping: bool,
        position: Position,
    },
    Play {
        clip: String,
    },
    Stop,
    Pause,
    Resume,
}

#[derive(Debug, Clone, Copy)]
enum Transport {
    Stopped,
    Playing { since: Instant, offset: Duration },
    Paused { offset: Duration },
}

#[derive(Debug)]
struct ChannelState {
    clip: Option<AudioClip>,
    looping: bool,
    position: Position,
    configuration: AudioConfiguration,
    transport: Transport,
    history: VecDeque<ChannelOp>,
}

impl ChannelState {
    fn record(&mut self, op: ChannelOp) {
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(op);
    }
}

/// Silent channel that keeps time and an operation log
#[derive(Debug)]
pub struct VirtualChannel {
    voice_id: VoiceId,
    state: Mutex<ChannelState>,
}

impl VirtualChannel {
    pub fn new(voice_id: VoiceId) -> Self {
        Self {
            voice_id,
            state: Mutex::new(ChannelState {
                clip: None,
                looping: false,
                position: Position::ORIGIN,
                configuration: AudioConfiguration::default(),
                transport: Transport::Stopped,
                history: VecDeque::with_capacity(HISTORY_LIMIT),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, ChannelState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Retained operations, oldest first
    pub fn history(&self) -> Vec<ChannelOp> {
        self.state().history.iter().cloned().collect()
    }

    /// Names of the clips started within the retained history, in order
    pub fn played_clips(&self) -> Vec<String> {
        self.state()
            .history
            .iter()
            .filter_map(|op| match op {
                ChannelOp::Play { clip } => Some(clip.clone()),
                _ => None,
            })
            .collect()
    }

    /// Currently configured clip
    pub fn clip(&self) -> Option<AudioClip> {
        self.state().clip.clone()
    }

    pub fn position(&self) -> Position {
        self.state().position
    }

    pub fn configuration(&self) -> AudioConfiguration {
        self.state().configuration.clone()
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.state().transport, Transport::Paused { .. })
    }
}

impl PlaybackChannel for VirtualChannel {
    fn configure(
        &self,
        clip: &AudioClip,
        looping: bool,
        position: Position,
        configuration: &AudioConfiguration,
    ) -> Result<()> {
        let mut state = self.state();
        state.clip = Some(clip.clone());
        state.looping = looping;
        state.position = position;
        state.configuration = configuration.validated();
        state.transport = Transport::Stopped;
        state.record(ChannelOp::Configure {
            clip: clip.name().to_string(),
            looping,
            position,
        });
        trace!(voice_id = self.voice_id, clip = clip.name(), "Channel configured");
        Ok(())
    }

    fn play(&self) -> Result<()> {
        let mut state = self.state();
        let clip_name = match &state.clip {
            Some(clip) => clip.name().to_string(),
            None => {
                return Err(Error::Channel(format!(
                    "Channel {} has no clip configured",
                    self.voice_id
                )))
            }
        };
        state.transport = Transport::Playing {
            since: Instant::now(),
            offset: Duration::ZERO,
        };
        debug!(voice_id = self.voice_id, clip = %clip_name, looping = state.looping, "Channel playing");
        state.record(ChannelOp::Play { clip: clip_name });
        Ok(())
    }

    fn stop(&self) {
        let mut state = self.state();
        state.transport = Transport::Stopped;
        state.record(ChannelOp::Stop);
    }

    fn pause(&self) {
        let mut state = self.state();
        if let Transport::Playing { since, offset } = state.transport {
            state.transport = Transport::Paused {
                offset: offset + since.elapsed(),
            };
        }
        state.record(ChannelOp::Pause);
    }

    fn resume(&self) {
        let mut state = self.state();
        if let Transport::Paused { offset } = state.transport {
            state.transport = Transport::Playing {
                since: Instant::now(),
                offset,
            };
        }
        state.record(ChannelOp::Resume);
    }

    fn is_playing(&self) -> bool {
        let state = self.state();
        match (state.transport, &state.clip) {
            (Transport::Playing { since, offset }, Some(clip)) => {
                state.looping || offset + since.elapsed() < clip.duration()
            }
            _ => false,
        }
    }
}

/// Factory handing out virtual channels and keeping them for inspection
#[derive(Debug, Default)]
pub struct VirtualChannelFactory {
    channels: Mutex<Vec<Arc<VirtualChannel>>>,
}

impl VirtualChannelFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Channel created for a voice, if any
    pub fn channel(&self, voice_id: VoiceId) -> Option<Arc<VirtualChannel>> {
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|channel| channel.voice_id == voice_id)
            .cloned()
    }

    /// Number of channels created so far
    pub fn created(&self) -> usize {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl ChannelFactory for VirtualChannelFactory {
    fn create(&self, voice_id: VoiceId) -> Arc<dyn PlaybackChannel> {
        let channel = Arc::new(VirtualChannel::new(voice_id));
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&channel));
        channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(seconds: u64) -> AudioClip {
        AudioClip::new("test", Duration::from_secs(seconds))
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_shot_stops_playing_after_duration() {
        let channel = VirtualChannel::new(0);
        channel
            .configure(&clip(2), false, Position::ORIGIN, &AudioConfiguration::default())
            .unwrap();
        channel.play().unwrap();
        assert!(channel.is_playing());

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert!(channel.is_playing());

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(!channel.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_looping_keeps_playing() {
        let channel = VirtualChannel::new(0);
        channel
            .configure(&clip(1), true, Position::ORIGIN, &AudioConfiguration::default())
            .unwrap();
        channel.play().unwrap();

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(channel.is_playing());

        channel.stop();
        assert!(!channel.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_freezes_remaining_time() {
        let channel = VirtualChannel::new(0);
        channel
            .configure(&clip(5), false, Position::ORIGIN, &AudioConfiguration::default())
            .unwrap();
        channel.play().unwrap();

        tokio::time::sleep(Duration::from_secs(1)).await;
        channel.pause();
        assert!(channel.is_paused());
        assert!(!channel.is_playing());

        tokio::time::sleep(Duration::from_secs(10)).await;
        channel.resume();
        assert!(channel.is_playing());

        // 4 of the 5 seconds remain after the resume
        tokio::time::sleep(Duration::from_millis(3999)).await;
        assert!(channel.is_playing());
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(!channel.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_is_bounded() {
        let channel = VirtualChannel::new(3);
        for i in 0..HISTORY_LIMIT {
            let clip = AudioClip::new(format!("c{}", i), Duration::from_secs(1));
            channel
                .configure(&clip, false, Position::ORIGIN, &AudioConfiguration::default())
                .unwrap();
            channel.play().unwrap();
        }

        let history = channel.history();
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(
            history.last(),
            Some(&ChannelOp::Play {
                clip: format!("c{}", HISTORY_LIMIT - 1)
            })
        );

        // Two ops per clip, so only the newer half of the clips remain
        let played = channel.played_clips();
        assert_eq!(played.len(), HISTORY_LIMIT / 2);
        assert_eq!(played[0], format!("c{}", HISTORY_LIMIT / 2));
    }

    #[test]
    fn test_play_without_clip_fails() {
        let channel = VirtualChannel::new(7);
        assert!(matches!(channel.play(), Err(Error::Channel(_))));
    }

    #[test]
    fn test_factory_keeps_channels() {
        let factory = VirtualChannelFactory::new();
        let _a = factory.create(0);
        let _b = factory.create(1);
        assert_eq!(factory.created(), 2);
        assert!(factory.channel(1).is_some());
        assert!(factory.channel(2).is_none());
    }
}
