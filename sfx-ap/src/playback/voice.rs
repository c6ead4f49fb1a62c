//! Voice: one reusable playback unit with a queued, cancellable sequence
//!
//! A voice wraps a single playback channel. Requests are appended to a
//! FIFO; the first request on an idle voice starts a sequence task that
//! plays them one by one:
//!
//! ```text
//! Idle ──enqueue──▶ Playing ──clip elapsed──▶ Finishing ──queue empty──▶ Idle
//!                    │   ▲                        │
//!                    │   └──────next request──────┘
//!                    └──cancel──▶ Cancelled ──task unwinds──▶ Idle
//! ```
//!
//! Looping clips stay in `Playing` until `cancel()` (abandons the whole
//! sequence) or `stop()` (ends the loop and lets the sequence continue).
//!
//! Each sequence runs under its own cancellation token and generation
//! number. Cancelling bumps the generation immediately, so a sequence
//! task that wakes up late can never touch state owned by a newer one.

use crate::audio::{AudioClip, PlaybackChannel};
use crate::error::{Error, Result};
use crate::playback::request::PlaybackRequest;
use crate::playback::wait::{hold_loop, wait_for_clip, HoldOutcome, WaitOutcome};
use sfx_common::events::{EventBus, SfxEvent, VoiceState};
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::{watch, Notify};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// Identifier of a voice within its pool
pub type VoiceId = usize;

/// Handle returned by `on_finished`, used to remove the callback again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type FinishedCallback = Arc<dyn Fn(&Voice) + Send + Sync>;

/// Cheaply clonable handle to a voice
#[derive(Clone)]
pub struct Voice {
    inner: Arc<VoiceInner>,
}

struct VoiceInner {
    id: VoiceId,
    channel: Arc<dyn PlaybackChannel>,
    sequence: Mutex<SequenceState>,
    /// Global pause flag observed by the timed wait
    paused: watch::Sender<bool>,
    /// Wakes a sequence holding a looping clip
    loop_release: Notify,
    event_bus: EventBus,
}

struct SequenceState {
    queue: VecDeque<PlaybackRequest>,
    cancel_token: CancellationToken,
    generation: u64,
    /// A sequence task owns the voice
    active: bool,
    state: VoiceState,
    current: Option<PlaybackRequest>,
    listeners: Vec<(ListenerId, FinishedCallback)>,
    next_listener: u64,
}

impl Voice {
    pub fn new(id: VoiceId, channel: Arc<dyn PlaybackChannel>, event_bus: EventBus) -> Self {
        let (paused, _) = watch::channel(false);
        Self {
            inner: Arc::new(VoiceInner {
                id,
                channel,
                sequence: Mutex::new(SequenceState {
                    queue: VecDeque::new(),
                    cancel_token: CancellationToken::new(),
                    generation: 0,
                    active: false,
                    state: VoiceState::Idle,
                    current: None,
                    listeners: Vec::new(),
                    next_listener: 0,
                }),
                paused,
                loop_release: Notify::new(),
                event_bus,
            }),
        }
    }

    pub fn id(&self) -> VoiceId {
        self.inner.id
    }

    /// True if both handles refer to the same voice
    pub fn ptr_eq(&self, other: &Voice) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn sequence(&self) -> MutexGuard<'_, SequenceState> {
        self.inner
            .sequence
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a request to the FIFO
    ///
    /// On an idle voice this replaces the cancellation token and spawns a
    /// new sequence task; returns `Ok(true)` in that case. While a sequence
    /// is running the request is only appended (`Ok(false)`), it never
    /// preempts the clip currently playing.
    ///
    /// Fails if a sequence must be started outside a tokio runtime.
    pub fn enqueue(&self, request: PlaybackRequest) -> Result<bool> {
        let (runtime, generation, token) = {
            let mut sequence = self.sequence();
            sequence.queue.push_back(request);

            if sequence.active {
                debug!(
                    voice_id = self.id(),
                    queued = sequence.queue.len(),
                    "Appended request to running sequence"
                );
                return Ok(false);
            }

            let runtime = match Handle::try_current() {
                Ok(runtime) => runtime,
                Err(_) => {
                    sequence.queue.pop_back();
                    return Err(Error::Playback(format!(
                        "Voice {} cannot start a sequence outside a tokio runtime",
                        self.id()
                    )));
                }
            };

            // Invalidate anything still watching a stale token
            sequence.cancel_token.cancel();
            sequence.cancel_token = CancellationToken::new();
            sequence.generation += 1;
            sequence.active = true;
            sequence.state = VoiceState::Playing;
            (runtime, sequence.generation, sequence.cancel_token.clone())
        };

        self.inner.paused.send_replace(false);

        let voice = self.clone();
        fire_and_forget(&runtime, self.id(), async move {
            voice.run_sequence(generation, token).await
        });
        Ok(true)
    }

    /// Cancel the running sequence
    ///
    /// Output stops immediately, queued requests are abandoned and no
    /// "finished" callback fires for the interrupted clip. No-op on an
    /// idle voice.
    pub fn cancel(&self) {
        let cancelled = {
            let mut sequence = self.sequence();
            sequence.cancel_token.cancel();

            if sequence.active {
                let abandoned = sequence.queue.len();
                sequence.queue.clear();
                let interrupted = sequence.current.take();
                sequence.active = false;
                sequence.generation += 1;
                sequence.state = VoiceState::Cancelled;
                // Under the lock, so a sequence task can never start the
                // channel again after this point
                self.inner.channel.stop();
                Some((interrupted, abandoned))
            } else {
                None
            }
        };

        if let Some((interrupted, abandoned)) = cancelled {
            let clip = interrupted.map(|request| request.clip().name().to_string());
            debug!(voice_id = self.id(), ?clip, abandoned, "Sequence cancelled");
            self.inner.event_bus.emit_lossy(SfxEvent::VoiceCancelled {
                voice_id: self.id(),
                clip,
                abandoned,
                timestamp: chrono::Utc::now(),
            });
        }
    }

    /// Hard stop of audio output
    ///
    /// A looping clip is released and the sequence moves on to the next
    /// queued request without firing "finished" for the loop.
    pub fn stop(&self) {
        self.inner.channel.stop();
        self.inner.loop_release.notify_waiters();
    }

    /// Suspend output; the queue, token and remaining clip time are kept
    pub fn pause(&self) {
        self.inner.channel.pause();
        self.inner.paused.send_replace(true);
    }

    /// Continue output after `pause`
    pub fn resume(&self) {
        self.inner.paused.send_replace(false);
        self.inner.channel.resume();
    }

    /// True while a sequence owns the voice or the channel is producing audio
    pub fn is_in_use(&self) -> bool {
        let active = self.sequence().active;
        active || self.inner.channel.is_playing()
    }

    /// True if the clip currently playing loops
    pub fn is_looping(&self) -> bool {
        self.sequence()
            .current
            .as_ref()
            .map_or(false, PlaybackRequest::is_looping)
    }

    pub fn is_paused(&self) -> bool {
        *self.inner.paused.borrow()
    }

    pub fn state(&self) -> VoiceState {
        self.sequence().state
    }

    /// Requests waiting behind the current one
    pub fn queued_len(&self) -> usize {
        self.sequence().queue.len()
    }

    /// Clip currently owned by the sequence
    pub fn current_clip(&self) -> Option<AudioClip> {
        self.sequence()
            .current
            .as_ref()
            .map(|request| request.clip().clone())
    }

    /// Register a callback fired each time a one-shot clip finishes
    pub fn on_finished<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&Voice) + Send + Sync + 'static,
    {
        let mut sequence = self.sequence();
        let id = ListenerId(sequence.next_listener);
        sequence.next_listener += 1;
        sequence.listeners.push((id, Arc::new(callback)));
        id
    }

    /// Remove a finished callback; false if it was not registered
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut sequence = self.sequence();
        let before = sequence.listeners.len();
        sequence.listeners.retain(|(listener, _)| *listener != id);
        sequence.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.sequence().listeners.len()
    }

    async fn run_sequence(&self, generation: u64, token: CancellationToken) -> Result<()> {
        let _guard = SequenceGuard {
            voice: self,
            generation,
        };
        let mut paused = self.inner.paused.subscribe();
        debug!(voice_id = self.id(), generation, "Sequence started");

        while let Some(request) = self.next_request(generation, &token) {
            if request.is_looping() {
                let released = self.inner.loop_release.notified();
                tokio::pin!(released);
                released.as_mut().enable();

                if !self.start(generation, &token, &request)? {
                    break;
                }
                match hold_loop(&token, released).await {
                    HoldOutcome::Released => {
                        debug!(voice_id = self.id(), clip = request.clip().name(), "Loop released");
                    }
                    HoldOutcome::Cancelled => break,
                }
            } else {
                if !self.start(generation, &token, &request)? {
                    break;
                }
                match wait_for_clip(request.duration(), &token, &mut paused).await {
                    WaitOutcome::Elapsed => {
                        if !self.finish(generation, &token, &request) {
                            break;
                        }
                    }
                    WaitOutcome::Cancelled => break,
                }
            }
        }

        Ok(())
    }

    /// Pop the next request, or mark the sequence drained
    fn next_request(&self, generation: u64, token: &CancellationToken) -> Option<PlaybackRequest> {
        let mut sequence = self.sequence();
        if sequence.generation != generation || token.is_cancelled() {
            return None;
        }

        match sequence.queue.pop_front() {
            Some(request) => {
                sequence.state = VoiceState::Playing;
                sequence.current = Some(request.clone());
                Some(request)
            }
            None => {
                sequence.active = false;
                sequence.state = VoiceState::Idle;
                sequence.current = None;
                debug!(voice_id = self.id(), generation, "Sequence drained");
                None
            }
        }
    }

    /// Configure and start the channel; false if the sequence was cancelled
    ///
    /// Holds the voice lock across both channel calls. `cancel` stops the
    /// channel under the same lock, so it either sees the clip playing or
    /// the clip never starts.
    fn start(
        &self,
        generation: u64,
        token: &CancellationToken,
        request: &PlaybackRequest,
    ) -> Result<bool> {
        {
            let sequence = self.sequence();
            if token.is_cancelled() || sequence.generation != generation {
                return Ok(false);
            }
            self.inner.channel.configure(
                request.clip(),
                request.is_looping(),
                request.position(),
                request.configuration(),
            )?;
            self.inner.channel.play()?;
        }

        debug!(
            voice_id = self.id(),
            clip = request.clip().name(),
            looping = request.is_looping(),
            "Voice started clip"
        );
        self.inner.event_bus.emit_lossy(SfxEvent::VoiceStarted {
            voice_id: self.id(),
            clip: request.clip().name().to_string(),
            looping: request.is_looping(),
            timestamp: chrono::Utc::now(),
        });
        Ok(true)
    }

    /// Fire "finished" unless a cancel got in first
    fn finish(&self, generation: u64, token: &CancellationToken, request: &PlaybackRequest) -> bool {
        let listeners: Vec<FinishedCallback> = {
            let mut sequence = self.sequence();
            if token.is_cancelled() || sequence.generation != generation {
                return false;
            }
            sequence.state = VoiceState::Finishing;
            sequence
                .listeners
                .iter()
                .map(|(_, callback)| Arc::clone(callback))
                .collect()
        };

        debug!(voice_id = self.id(), clip = request.clip().name(), "Voice finished clip");
        self.inner.event_bus.emit_lossy(SfxEvent::VoiceFinished {
            voice_id: self.id(),
            clip: request.clip().name().to_string(),
            timestamp: chrono::Utc::now(),
        });

        for callback in listeners {
            callback(self);
        }
        true
    }
}

impl fmt::Debug for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sequence = self.sequence();
        f.debug_struct("Voice")
            .field("id", &self.inner.id)
            .field("state", &sequence.state)
            .field("generation", &sequence.generation)
            .field("queued", &sequence.queue.len())
            .finish()
    }
}

/// Restores a consistent voice when a sequence task exits
///
/// Normal exits have already released the voice. An error or panic leaves
/// it marked active; the guard clears the queue and stops output then.
struct SequenceGuard<'a> {
    voice: &'a Voice,
    generation: u64,
}

impl Drop for SequenceGuard<'_> {
    fn drop(&mut self) {
        let mut sequence = self.voice.sequence();
        if sequence.active && sequence.generation == self.generation {
            sequence.active = false;
            sequence.queue.clear();
            sequence.current = None;
            sequence.state = VoiceState::Idle;
            self.voice.inner.channel.stop();
        } else if !sequence.active && sequence.state == VoiceState::Cancelled {
            sequence.state = VoiceState::Idle;
        }
    }
}

/// Run a playback task detached, logging any error it returns
fn fire_and_forget<F>(runtime: &Handle, voice_id: VoiceId, task: F)
where
    F: Future<Output = Result<()>> + Send + 'static,
{
    runtime.spawn(async move {
        if let Err(e) = task.await {
            error!("Unhandled error in playback task of voice {}: {}", voice_id, e);
        }
    });
}
