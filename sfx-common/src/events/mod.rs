//! Event types for the SFX event system
//!
//! Provides shared event definitions and the EventBus used by the player.

mod voice_types;

pub use voice_types::{DropReason, VoiceState};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

/// SFX event types
///
/// Events are broadcast via EventBus and can be serialized as JSON lines
/// for observers (the console binary prints them with `--events`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SfxEvent {
    /// A voice started playing a clip
    VoiceStarted {
        voice_id: usize,
        clip: String,
        looping: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A one-shot clip reached the end of its duration
    VoiceFinished {
        voice_id: usize,
        clip: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A voice sequence was cancelled
    VoiceCancelled {
        voice_id: usize,
        /// Clip that was interrupted, if any was playing
        clip: Option<String>,
        /// Queued requests abandoned by the cancellation
        abandoned: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A clip of a cue was dropped instead of played
    CueDropped {
        cue: String,
        clip: String,
        reason: DropReason,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A mixer group volume was changed
    GroupVolumeChanged {
        parameter: String,
        /// Normalized value (0.0-1.0)
        normalized: f32,
        /// Value written to the mixer (dB)
        mixer_value: f32,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Global pause applied to every in-use voice
    PlaybackPaused {
        voices: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Global pause lifted
    PlaybackResumed {
        voices: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl SfxEvent {
    /// Event name as used in the serialized `type` tag
    pub fn event_type(&self) -> &'static str {
        match self {
            SfxEvent::VoiceStarted { .. } => "VoiceStarted",
            SfxEvent::VoiceFinished { .. } => "VoiceFinished",
            SfxEvent::VoiceCancelled { .. } => "VoiceCancelled",
            SfxEvent::CueDropped { .. } => "CueDropped",
            SfxEvent::GroupVolumeChanged { .. } => "GroupVolumeChanged",
            SfxEvent::PlaybackPaused { .. } => "PlaybackPaused",
            SfxEvent::PlaybackResumed { .. } => "PlaybackResumed",
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus
///
/// Uses `tokio::broadcast` internally:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use sfx_common::events::{EventBus, SfxEvent};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(SfxEvent::PlaybackPaused {
///     voices: 2,
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(matches!(rx.try_recv(), Ok(SfxEvent::PlaybackPaused { voices: 2, .. })));
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SfxEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<SfxEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    #[allow(clippy::result_large_err)]
    pub fn emit(&self, event: SfxEvent) -> Result<usize, broadcast::error::SendError<SfxEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: SfxEvent) {
        if let Err(broadcast::error::SendError(event)) = self.emit(event) {
            trace!(event_type = event.event_type(), "Event emitted without subscribers");
        }
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_EVENT_BUS_CAPACITY)
    }
}
