//! Audio manager: the single dispatcher that owns the voice pool
//!
//! Cues arrive from subscribed cue channels or from a `ManagerHandle`.
//! For every clip the manager checks a voice out of the pool, enqueues
//! the request and, for one-shot clips, listens for "finished". Finished
//! notifications come back over a channel and are handled on the
//! dispatcher, so only the dispatcher ever returns voices to the pool.
//!
//! The manager also owns the mixer group volumes and the global pause.

use crate::audio::mixer::{MASTER_VOLUME, MUSIC_VOLUME, SFX_VOLUME};
use crate::audio::{AudioConfiguration, AudioMixer, Position};
use crate::cue::{AudioCue, CueHandle};
use crate::cue_channel::{CueChannel, CueRequest};
use crate::error::{Error, Result};
use crate::playback::{ListenerId, PlaybackRequest, PoolStatus, Voice, VoiceId, VoicePool};
use serde::Serialize;
use sfx_common::config::VolumeConfig;
use sfx_common::events::{DropReason, EventBus, SfxEvent};
use sfx_common::{mixer_value_to_normalized, normalized_to_mixer_value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{StreamExt, StreamMap};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const CONTROL_CHANNEL_CAPACITY: usize = 32;

/// "Voice finished" as seen by the dispatcher
///
/// The ticket identifies the listener registration, so a late notice for
/// a voice that has since been reused is ignored.
#[derive(Debug, Clone, Copy)]
struct FinishedNotice {
    voice_id: VoiceId,
    ticket: u64,
}

/// Snapshot of the manager
#[derive(Debug, Clone, Serialize)]
pub struct ManagerStatus {
    pub pool: PoolStatus,
    pub active_cues: usize,
    pub subscriptions: Vec<String>,
    pub paused: bool,
}

/// Requests sent to a running dispatcher
#[derive(Debug)]
pub enum ControlMessage {
    PlayCue {
        cue: Arc<AudioCue>,
        configuration: Arc<AudioConfiguration>,
        position: Position,
        reply: oneshot::Sender<CueHandle>,
    },
    StopCue {
        id: Uuid,
        reply: oneshot::Sender<bool>,
    },
    StopAll {
        reply: oneshot::Sender<usize>,
    },
    PauseAll {
        reply: oneshot::Sender<usize>,
    },
    ResumeAll {
        reply: oneshot::Sender<usize>,
    },
    SetGroupVolume {
        parameter: String,
        normalized: f32,
        reply: oneshot::Sender<bool>,
    },
    GetGroupVolume {
        parameter: String,
        reply: oneshot::Sender<f32>,
    },
    Subscribe {
        channel: CueChannel,
        reply: oneshot::Sender<bool>,
    },
    Unsubscribe {
        name: String,
        reply: oneshot::Sender<bool>,
    },
    ActiveCues {
        reply: oneshot::Sender<Vec<CueHandle>>,
    },
    Status {
        reply: oneshot::Sender<ManagerStatus>,
    },
}

pub struct AudioManager {
    pool: Arc<VoicePool>,
    mixer: Arc<dyn AudioMixer>,
    event_bus: EventBus,

    finished_tx: mpsc::UnboundedSender<FinishedNotice>,
    finished_rx: mpsc::UnboundedReceiver<FinishedNotice>,
    control_tx: mpsc::Sender<ControlMessage>,
    control_rx: mpsc::Receiver<ControlMessage>,
    subscriptions: StreamMap<String, BroadcastStream<CueRequest>>,

    /// Finished listener registered on each checked-out one-shot voice
    listeners: HashMap<VoiceId, (ListenerId, u64)>,
    next_ticket: u64,
    voice_cues: HashMap<VoiceId, Uuid>,
    active_cues: HashMap<Uuid, CueHandle>,
    paused: bool,
}

impl AudioManager {
    pub fn new(pool: Arc<VoicePool>, mixer: Arc<dyn AudioMixer>, event_bus: EventBus) -> Self {
        let (finished_tx, finished_rx) = mpsc::unbounded_channel();
        let (control_tx, control_rx) = mpsc::channel(CONTROL_CHANNEL_CAPACITY);
        Self {
            pool,
            mixer,
            event_bus,
            finished_tx,
            finished_rx,
            control_tx,
            control_rx,
            subscriptions: StreamMap::new(),
            listeners: HashMap::new(),
            next_ticket: 0,
            voice_cues: HashMap::new(),
            active_cues: HashMap::new(),
            paused: false,
        }
    }

    /// Prewarm the pool and push the configured group volumes
    pub fn init(&mut self, pool_size: usize, volumes: &VolumeConfig) {
        self.pool.prewarm(pool_size);
        self.on_config_changed(volumes);
        info!(
            "Audio manager initialized: {} voices, capacity {}",
            self.pool.status().total,
            self.pool.capacity()
        );
    }

    /// Re-apply master, music and SFX volumes to the mixer
    pub fn on_config_changed(&self, volumes: &VolumeConfig) {
        let volumes = volumes.clamped();
        self.set_group_volume(MASTER_VOLUME, volumes.master);
        self.set_group_volume(MUSIC_VOLUME, volumes.music);
        self.set_group_volume(SFX_VOLUME, volumes.sfx);
    }

    /// Set a group volume from a normalized 0.0-1.0 value
    ///
    /// Returns false (and logs) if the mixer has no such parameter.
    pub fn set_group_volume(&self, parameter: &str, normalized: f32) -> bool {
        let mixer_value = normalized_to_mixer_value(normalized);
        if !self.mixer.set_float(parameter, mixer_value) {
            let err = Error::MixerParameterNotFound(parameter.to_string());
            error!("Failed to set group volume: {}", err);
            return false;
        }

        debug!(parameter, normalized, mixer_value, "Group volume set");
        self.event_bus.emit_lossy(SfxEvent::GroupVolumeChanged {
            parameter: parameter.to_string(),
            normalized,
            mixer_value,
            timestamp: chrono::Utc::now(),
        });
        true
    }

    /// Current group volume as a normalized value; 0.0 if the parameter is missing
    pub fn get_group_volume(&self, parameter: &str) -> f32 {
        match self.mixer.get_float(parameter) {
            Some(mixer_value) => mixer_value_to_normalized(mixer_value),
            None => {
                let err = Error::MixerParameterNotFound(parameter.to_string());
                error!("Failed to read group volume: {}", err);
                0.0
            }
        }
    }

    pub fn pool(&self) -> &Arc<VoicePool> {
        &self.pool
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Handle for talking to the dispatcher once `run` owns the manager
    pub fn handle(&self) -> ManagerHandle {
        ManagerHandle {
            tx: self.control_tx.clone(),
        }
    }

    /// Play every clip of a cue on its own voice
    ///
    /// Clips that find no idle voice are dropped. The returned handle
    /// lists the voices that actually started.
    pub fn play_cue(
        &mut self,
        cue: &AudioCue,
        configuration: Arc<AudioConfiguration>,
        position: Position,
    ) -> CueHandle {
        let mut voices = Vec::with_capacity(cue.clips().len());

        for clip in cue.clips() {
            let voice = match self.pool.request() {
                Some(voice) => voice,
                None => {
                    debug!(cue = cue.name(), clip = clip.name(), "Pool exhausted, clip dropped");
                    self.emit_dropped(cue, clip.name(), DropReason::PoolExhausted);
                    continue;
                }
            };

            if !cue.is_looping() {
                self.watch_finished(&voice);
            }

            let request = PlaybackRequest::new(
                clip.clone(),
                Arc::clone(&configuration),
                cue.is_looping(),
                position,
            );
            if let Err(e) = voice.enqueue(request) {
                warn!("Voice {} rejected clip '{}': {}", voice.id(), clip.name(), e);
                self.release(&voice);
                self.emit_dropped(cue, clip.name(), DropReason::Rejected);
                continue;
            }

            voices.push(voice.id());
        }

        let handle = CueHandle::new(cue.name(), voices);
        if !handle.is_empty() {
            for voice_id in &handle.voices {
                self.voice_cues.insert(*voice_id, handle.id);
            }
            self.active_cues.insert(handle.id, handle.clone());
            debug!(cue = cue.name(), handle = %handle.id, voices = ?handle.voices, "Cue playing");
        }
        handle
    }

    fn emit_dropped(&self, cue: &AudioCue, clip: &str, reason: DropReason) {
        self.event_bus.emit_lossy(SfxEvent::CueDropped {
            cue: cue.name().to_string(),
            clip: clip.to_string(),
            reason,
            timestamp: chrono::Utc::now(),
        });
    }

    fn watch_finished(&mut self, voice: &Voice) {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        let voice_id = voice.id();
        let tx = self.finished_tx.clone();

        let listener = voice.on_finished(move |_| {
            // Dispatcher gone means nobody is left to return the voice
            let _ = tx.send(FinishedNotice { voice_id, ticket });
        });

        if let Some((stale, _)) = self.listeners.insert(voice_id, (listener, ticket)) {
            voice.remove_listener(stale);
        }
    }

    fn handle_finished(&mut self, notice: FinishedNotice) {
        match self.listeners.get(&notice.voice_id) {
            Some((_, ticket)) if *ticket == notice.ticket => {}
            _ => {
                debug!(voice_id = notice.voice_id, "Ignoring stale finished notice");
                return;
            }
        }

        match self.pool.get(notice.voice_id) {
            Some(voice) => self.release(&voice),
            None => warn!("Finished notice for unknown voice {}", notice.voice_id),
        }
    }

    /// Handle every finished notice already queued, without waiting
    ///
    /// `run` does this continuously; hosts driving the manager by hand
    /// call it from their own update loop.
    pub fn process_finished(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(notice) = self.finished_rx.try_recv() {
            self.handle_finished(notice);
            handled += 1;
        }
        handled
    }

    /// Stop a voice and give it back to the pool
    fn release(&mut self, voice: &Voice) {
        let voice_id = voice.id();
        if let Some((listener, _)) = self.listeners.remove(&voice_id) {
            voice.remove_listener(listener);
        }

        voice.stop();
        if let Err(e) = self.pool.return_voice(voice) {
            warn!("Failed to return voice {}: {}", voice_id, e);
        }

        if let Some(cue_id) = self.voice_cues.remove(&voice_id) {
            if let Some(handle) = self.active_cues.get_mut(&cue_id) {
                handle.voices.retain(|id| *id != voice_id);
                if handle.voices.is_empty() {
                    self.active_cues.remove(&cue_id);
                }
            }
        }
    }

    /// Cancel every voice still playing for a cue
    pub fn stop_cue(&mut self, handle: &CueHandle) -> bool {
        self.stop_cue_by_id(handle.id)
    }

    fn stop_cue_by_id(&mut self, id: Uuid) -> bool {
        let handle = match self.active_cues.remove(&id) {
            Some(handle) => handle,
            None => {
                debug!(handle = %id, "Cue already finished");
                return false;
            }
        };

        for voice_id in &handle.voices {
            if let Some(voice) = self.pool.get(*voice_id) {
                voice.cancel();
                self.release(&voice);
            }
        }
        debug!(cue = %handle.cue, handle = %id, "Cue stopped");
        true
    }

    /// Stop every active cue; returns how many were stopped
    pub fn stop_all(&mut self) -> usize {
        let ids: Vec<Uuid> = self.active_cues.keys().copied().collect();
        ids.into_iter().filter(|id| self.stop_cue_by_id(*id)).count()
    }

    pub fn active_cues(&self) -> Vec<CueHandle> {
        self.active_cues.values().cloned().collect()
    }

    /// Pause every checked-out voice; returns how many were paused
    pub fn pause_all(&mut self) -> usize {
        let voices = self.pool.in_use_voices();
        for voice in &voices {
            voice.pause();
        }
        self.paused = true;
        info!("Paused {} voices", voices.len());
        self.event_bus.emit_lossy(SfxEvent::PlaybackPaused {
            voices: voices.len(),
            timestamp: chrono::Utc::now(),
        });
        voices.len()
    }

    pub fn resume_all(&mut self) -> usize {
        let voices = self.pool.in_use_voices();
        for voice in &voices {
            voice.resume();
        }
        self.paused = false;
        info!("Resumed {} voices", voices.len());
        self.event_bus.emit_lossy(SfxEvent::PlaybackResumed {
            voices: voices.len(),
            timestamp: chrono::Utc::now(),
        });
        voices.len()
    }

    /// Start dispatching cues raised on `channel`
    ///
    /// Returns false if a channel with the same name is already subscribed.
    pub fn subscribe(&mut self, channel: &CueChannel) -> bool {
        if self.subscriptions.contains_key(channel.name()) {
            warn!("Already subscribed to cue channel '{}'", channel.name());
            return false;
        }
        self.subscriptions
            .insert(channel.name().to_string(), BroadcastStream::new(channel.subscribe()));
        info!("Subscribed to cue channel '{}'", channel.name());
        true
    }

    pub fn unsubscribe(&mut self, name: &str) -> bool {
        let removed = self.subscriptions.remove(name).is_some();
        if removed {
            info!("Unsubscribed from cue channel '{}'", name);
        }
        removed
    }

    pub fn status(&self) -> ManagerStatus {
        let mut subscriptions: Vec<String> = self.subscriptions.keys().cloned().collect();
        subscriptions.sort();
        ManagerStatus {
            pool: self.pool.status(),
            active_cues: self.active_cues.len(),
            subscriptions,
            paused: self.paused,
        }
    }

    fn handle_cue_event(
        &mut self,
        channel: String,
        item: std::result::Result<CueRequest, BroadcastStreamRecvError>,
    ) {
        match item {
            Ok(request) => {
                debug!(channel = %channel, cue = request.cue.name(), "Cue received");
                self.play_cue(&request.cue, request.configuration, request.position);
            }
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!("Cue channel '{}' lagged, {} cues skipped", channel, skipped);
            }
        }
    }

    fn handle_control(&mut self, message: ControlMessage) {
        // A dropped reply receiver only means the caller stopped waiting
        match message {
            ControlMessage::PlayCue {
                cue,
                configuration,
                position,
                reply,
            } => {
                let handle = self.play_cue(&cue, configuration, position);
                let _ = reply.send(handle);
            }
            ControlMessage::StopCue { id, reply } => {
                let _ = reply.send(self.stop_cue_by_id(id));
            }
            ControlMessage::StopAll { reply } => {
                let _ = reply.send(self.stop_all());
            }
            ControlMessage::PauseAll { reply } => {
                let _ = reply.send(self.pause_all());
            }
            ControlMessage::ResumeAll { reply } => {
                let _ = reply.send(self.resume_all());
            }
            ControlMessage::SetGroupVolume {
                parameter,
                normalized,
                reply,
            } => {
                let _ = reply.send(self.set_group_volume(&parameter, normalized));
            }
            ControlMessage::GetGroupVolume { parameter, reply } => {
                let _ = reply.send(self.get_group_volume(&parameter));
            }
            ControlMessage::Subscribe { channel, reply } => {
                let _ = reply.send(self.subscribe(&channel));
            }
            ControlMessage::Unsubscribe { name, reply } => {
                let _ = reply.send(self.unsubscribe(&name));
            }
            ControlMessage::ActiveCues { reply } => {
                let _ = reply.send(self.active_cues());
            }
            ControlMessage::Status { reply } => {
                let _ = reply.send(self.status());
            }
        }
    }

    /// Dispatcher loop
    ///
    /// Runs until `shutdown` is cancelled, then stops every active cue,
    /// rejects pending control messages and hands the manager back.
    pub async fn run(mut self, shutdown: CancellationToken) -> Self {
        info!(
            "Audio manager dispatcher started ({} cue channels)",
            self.subscriptions.len()
        );

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => break,

                Some(notice) = self.finished_rx.recv() => {
                    self.handle_finished(notice);
                }

                Some(message) = self.control_rx.recv() => {
                    self.handle_control(message);
                }

                Some((channel, item)) = self.subscriptions.next(), if !self.subscriptions.is_empty() => {
                    self.handle_cue_event(channel, item);
                }
            }
        }

        self.control_rx.close();
        while self.control_rx.try_recv().is_ok() {}

        let stopped = self.stop_all();
        info!("Audio manager dispatcher stopped ({} cues cut off)", stopped);
        self
    }
}

/// Cloneable handle to a running dispatcher
#[derive(Debug, Clone)]
pub struct ManagerHandle {
    tx: mpsc::Sender<ControlMessage>,
}

impl ManagerHandle {
    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> ControlMessage) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| Error::DispatcherStopped)?;
        response.await.map_err(|_| Error::DispatcherStopped)
    }

    pub async fn play_cue(
        &self,
        cue: Arc<AudioCue>,
        configuration: Arc<AudioConfiguration>,
        position: Position,
    ) -> Result<CueHandle> {
        self.request(|reply| ControlMessage::PlayCue {
            cue,
            configuration,
            position,
            reply,
        })
        .await
    }

    pub async fn stop_cue(&self, handle: &CueHandle) -> Result<bool> {
        let id = handle.id;
        self.request(|reply| ControlMessage::StopCue { id, reply }).await
    }

    pub async fn stop_all(&self) -> Result<usize> {
        self.request(|reply| ControlMessage::StopAll { reply }).await
    }

    pub async fn pause_all(&self) -> Result<usize> {
        self.request(|reply| ControlMessage::PauseAll { reply }).await
    }

    pub async fn resume_all(&self) -> Result<usize> {
        self.request(|reply| ControlMessage::ResumeAll { reply }).await
    }

    pub async fn set_group_volume(&self, parameter: &str, normalized: f32) -> Result<bool> {
        let parameter = parameter.to_string();
        self.request(|reply| ControlMessage::SetGroupVolume {
            parameter,
            normalized,
            reply,
        })
        .await
    }

    pub async fn get_group_volume(&self, parameter: &str) -> Result<f32> {
        let parameter = parameter.to_string();
        self.request(|reply| ControlMessage::GetGroupVolume { parameter, reply })
            .await
    }

    pub async fn subscribe(&self, channel: CueChannel) -> Result<bool> {
        self.request(|reply| ControlMessage::Subscribe { channel, reply })
            .await
    }

    pub async fn unsubscribe(&self, name: &str) -> Result<bool> {
        let name = name.to_string();
        self.request(|reply| ControlMessage::Unsubscribe { name, reply })
            .await
    }

    pub async fn active_cues(&self) -> Result<Vec<CueHandle>> {
        self.request(|reply| ControlMessage::ActiveCues { reply }).await
    }

    pub async fn status(&self) -> Result<ManagerStatus> {
        self.request(|reply| ControlMessage::Status { reply }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioClip, ParameterMixer, VirtualChannelFactory};
    use std::time::Duration;
    use tokio::time::sleep;

    struct Fixture {
        manager: AudioManager,
        factory: Arc<VirtualChannelFactory>,
        mixer: Arc<ParameterMixer>,
    }

    fn fixture(capacity: usize) -> Fixture {
        let factory = Arc::new(VirtualChannelFactory::new());
        let mixer = Arc::new(ParameterMixer::with_default_groups());
        let event_bus = EventBus::new(64);
        let pool = Arc::new(VoicePool::new(factory.clone(), capacity, event_bus.clone()));
        let manager = AudioManager::new(pool, mixer.clone(), event_bus);
        Fixture {
            manager,
            factory,
            mixer,
        }
    }

    fn cue(name: &str, clips: &[(&str, u64)], looping: bool) -> AudioCue {
        let clips = clips
            .iter()
            .map(|(clip, millis)| AudioClip::new(*clip, Duration::from_millis(*millis)))
            .collect();
        AudioCue::new(name, clips, looping).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_voice_returns_to_pool() {
        let mut fx = fixture(2);
        let handle = fx.manager.play_cue(
            &cue("click", &[("click", 500)], false),
            Arc::default(),
            Position::ORIGIN,
        );
        assert_eq!(handle.voices, vec![0]);
        assert_eq!(fx.manager.pool().status().in_use, 1);

        sleep(Duration::from_millis(600)).await;
        assert_eq!(fx.manager.process_finished(), 1);

        assert_eq!(fx.manager.pool().status().in_use, 0);
        assert!(fx.manager.active_cues().is_empty());
        let voice = fx.manager.pool().get(0).unwrap();
        assert_eq!(voice.listener_count(), 0);
        let channel = fx.factory.channel(0).unwrap();
        assert_eq!(channel.history().last(), Some(&crate::audio::ChannelOp::Stop));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overflow_is_dropped() {
        let mut fx = fixture(1);
        let mut events = fx.manager.event_bus().subscribe();

        let handle = fx.manager.play_cue(
            &cue("burst", &[("a", 100), ("b", 100), ("c", 100)], false),
            Arc::default(),
            Position::ORIGIN,
        );
        assert_eq!(handle.voices.len(), 1);

        let mut dropped = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let SfxEvent::CueDropped { clip, reason, .. } = event {
                assert_eq!(reason, DropReason::PoolExhausted);
                dropped.push(clip);
            }
        }
        assert_eq!(dropped, vec!["b", "c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cue_frees_looping_voices() {
        let mut fx = fixture(4);
        let handle = fx.manager.play_cue(
            &cue("ambience", &[("wind", 2000), ("birds", 3000)], true),
            Arc::default(),
            Position::ORIGIN,
        );
        assert_eq!(handle.voices.len(), 2);

        sleep(Duration::from_secs(30)).await;
        assert_eq!(fx.manager.process_finished(), 0);
        assert_eq!(fx.manager.pool().status().in_use, 2);

        assert!(fx.manager.stop_cue(&handle));
        assert_eq!(fx.manager.pool().status().in_use, 0);
        sleep(Duration::from_millis(10)).await;
        for id in &handle.voices {
            assert!(!fx.manager.pool().get(*id).unwrap().is_in_use());
        }

        assert!(!fx.manager.stop_cue(&handle));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_all_holds_voices() {
        let mut fx = fixture(2);
        fx.manager.play_cue(
            &cue("line", &[("line", 1000)], false),
            Arc::default(),
            Position::ORIGIN,
        );

        sleep(Duration::from_millis(500)).await;
        assert_eq!(fx.manager.pause_all(), 1);
        assert!(fx.manager.status().paused);

        sleep(Duration::from_secs(5)).await;
        assert_eq!(fx.manager.process_finished(), 0);

        assert_eq!(fx.manager.resume_all(), 1);
        sleep(Duration::from_millis(600)).await;
        assert_eq!(fx.manager.process_finished(), 1);
        assert_eq!(fx.manager.pool().status().in_use, 0);
    }

    #[test]
    fn test_missing_mixer_parameter_is_noop() {
        let factory = Arc::new(VirtualChannelFactory::new());
        let mixer = Arc::new(ParameterMixer::with_parameters([(MASTER_VOLUME, 0.0)]));
        let event_bus = EventBus::new(8);
        let pool = Arc::new(VoicePool::new(factory, 1, event_bus.clone()));
        let manager = AudioManager::new(pool, mixer.clone(), event_bus);

        assert!(!manager.set_group_volume(MUSIC_VOLUME, 0.5));
        assert_eq!(manager.get_group_volume("Nope"), 0.0);
        assert_eq!(mixer.parameter_names(), vec![MASTER_VOLUME]);

        assert!(manager.set_group_volume(MASTER_VOLUME, 0.5));
        assert_eq!(mixer.get_float(MASTER_VOLUME), Some(-40.0));
        assert_eq!(manager.get_group_volume(MASTER_VOLUME), 0.5);
    }

    #[test]
    fn test_init_applies_volumes() {
        let mut fx = fixture(4);
        let volumes = VolumeConfig {
            master: 0.5,
            music: 1.0,
            sfx: 0.0,
        };
        fx.manager.init(3, &volumes);

        assert_eq!(fx.manager.pool().status().total, 3);
        assert_eq!(fx.mixer.get_float(MASTER_VOLUME), Some(-40.0));
        assert_eq!(fx.mixer.get_float(MUSIC_VOLUME), Some(0.0));
        assert_eq!(fx.mixer.get_float(SFX_VOLUME), Some(-80.0));
    }

    #[test]
    fn test_subscriptions_are_unique_by_name() {
        let mut fx = fixture(1);
        let sfx = CueChannel::new("sfx");
        assert!(fx.manager.subscribe(&sfx));
        assert!(!fx.manager.subscribe(&sfx));
        assert_eq!(fx.manager.status().subscriptions, vec!["sfx"]);

        assert!(fx.manager.unsubscribe("sfx"));
        assert!(!fx.manager.unsubscribe("sfx"));
    }
}
