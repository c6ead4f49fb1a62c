//! Dispatcher integration tests
//!
//! Runs `AudioManager::run` as a task and drives it the way the binary
//! does: cues raised on cue channels, control through a `ManagerHandle`.
//! All tests use the paused tokio clock.

use sfx_ap::audio::{
    AudioClip, AudioConfiguration, MixerGroup, ParameterMixer, PlaybackChannel, Position,
    VirtualChannelFactory,
};
use sfx_ap::cue_channel::{MUSIC_CHANNEL, SFX_CHANNEL};
use sfx_ap::{AudioCue, AudioManager, CueChannel, Error, ManagerHandle, VoicePool};
use sfx_common::config::VolumeConfig;
use sfx_common::events::{DropReason, EventBus, SfxEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

struct Rig {
    handle: ManagerHandle,
    sfx: CueChannel,
    music: CueChannel,
    factory: Arc<VirtualChannelFactory>,
    events: broadcast::Receiver<SfxEvent>,
    shutdown: CancellationToken,
    dispatcher: JoinHandle<AudioManager>,
}

impl Rig {
    fn start(capacity: usize) -> Self {
        let factory = Arc::new(VirtualChannelFactory::new());
        let event_bus = EventBus::new(256);
        let events = event_bus.subscribe();
        let pool = Arc::new(VoicePool::new(factory.clone(), capacity, event_bus.clone()));
        let mixer = Arc::new(ParameterMixer::with_default_groups());

        let mut manager = AudioManager::new(pool, mixer, event_bus);
        manager.init(capacity, &VolumeConfig::default());

        let sfx = CueChannel::new(SFX_CHANNEL);
        let music = CueChannel::new(MUSIC_CHANNEL);
        assert!(manager.subscribe(&sfx));
        assert!(manager.subscribe(&music));

        let handle = manager.handle();
        let shutdown = CancellationToken::new();
        let dispatcher = tokio::spawn(manager.run(shutdown.clone()));

        Self {
            handle,
            sfx,
            music,
            factory,
            events,
            shutdown,
            dispatcher,
        }
    }

    async fn stop(self) -> AudioManager {
        self.shutdown.cancel();
        self.dispatcher.await.unwrap()
    }

    fn drain_events(&mut self) -> Vec<SfxEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

fn cue(name: &str, clips: &[(&str, u64)], looping: bool) -> Arc<AudioCue> {
    let clips = clips
        .iter()
        .map(|(clip, millis)| AudioClip::new(*clip, Duration::from_millis(*millis)))
        .collect();
    Arc::new(AudioCue::new(name, clips, looping).unwrap())
}

#[tokio::test(start_paused = true)]
async fn test_raised_cue_plays_and_voice_returns() {
    let rig = Rig::start(2);

    let receivers = rig.sfx.raise(
        cue("click", &[("click", 500)], false),
        Arc::default(),
        Position::ORIGIN,
    );
    assert_eq!(receivers, 1);

    sleep(Duration::from_millis(100)).await;
    let status = rig.handle.status().await.unwrap();
    assert_eq!(status.pool.in_use, 1);
    assert_eq!(status.active_cues, 1);

    sleep(Duration::from_millis(500)).await;
    let status = rig.handle.status().await.unwrap();
    assert_eq!(status.pool.in_use, 0);
    assert_eq!(status.active_cues, 0);

    let channel = rig.factory.channel(0).unwrap();
    assert_eq!(channel.played_clips(), vec!["click"]);

    rig.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_multi_clip_cue_uses_one_voice_per_clip() {
    let rig = Rig::start(4);

    let handle = rig
        .handle
        .play_cue(
            cue("explosion", &[("boom", 1200), ("debris", 2500)], false),
            Arc::default(),
            Position::new(4.0, 0.0, 1.0),
        )
        .await
        .unwrap();
    assert_eq!(handle.voices.len(), 2);

    sleep(Duration::from_millis(1300)).await;
    let status = rig.handle.status().await.unwrap();
    assert_eq!(status.pool.in_use, 1);
    assert_eq!(status.active_cues, 1);

    sleep(Duration::from_millis(1300)).await;
    let status = rig.handle.status().await.unwrap();
    assert_eq!(status.pool.in_use, 0);
    assert_eq!(status.active_cues, 0);

    for voice_id in &handle.voices {
        let channel = rig.factory.channel(*voice_id).unwrap();
        assert_eq!(channel.position(), Position::new(4.0, 0.0, 1.0));
    }

    rig.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_overflow_cue_is_dropped() {
    let mut rig = Rig::start(1);

    rig.sfx
        .raise(cue("a", &[("a", 1000)], false), Arc::default(), Position::ORIGIN);
    rig.sfx
        .raise(cue("b", &[("b", 1000)], false), Arc::default(), Position::ORIGIN);
    sleep(Duration::from_millis(10)).await;

    let dropped: Vec<(String, DropReason)> = rig
        .drain_events()
        .into_iter()
        .filter_map(|event| match event {
            SfxEvent::CueDropped { cue, reason, .. } => Some((cue, reason)),
            _ => None,
        })
        .collect();
    assert_eq!(dropped, vec![("b".to_string(), DropReason::PoolExhausted)]);

    rig.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_music_channel_carries_music_configuration() {
    let rig = Rig::start(2);

    rig.music.raise(
        cue("theme", &[("theme", 90_000)], true),
        Arc::new(AudioConfiguration::music()),
        Position::ORIGIN,
    );
    sleep(Duration::from_secs(120)).await;

    let channel = rig.factory.channel(0).unwrap();
    assert_eq!(channel.configuration().group, MixerGroup::Music);
    assert!(channel.is_playing());
    assert_eq!(rig.handle.status().await.unwrap().pool.in_use, 1);

    let manager = rig.stop().await;
    assert_eq!(manager.status().pool.in_use, 0);
    assert!(manager.active_cues().is_empty());
    assert!(!channel.is_playing());
}

#[tokio::test(start_paused = true)]
async fn test_stop_cue_through_handle() {
    let rig = Rig::start(2);

    let handle = rig
        .handle
        .play_cue(
            cue("ambience", &[("wind", 2000)], true),
            Arc::default(),
            Position::ORIGIN,
        )
        .await
        .unwrap();

    sleep(Duration::from_secs(10)).await;
    assert_eq!(rig.handle.active_cues().await.unwrap().len(), 1);

    assert!(rig.handle.stop_cue(&handle).await.unwrap());
    assert!(!rig.handle.stop_cue(&handle).await.unwrap());
    assert_eq!(rig.handle.status().await.unwrap().pool.in_use, 0);

    rig.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_pause_all_through_handle() {
    let mut rig = Rig::start(2);

    rig.handle
        .play_cue(cue("line", &[("line", 1000)], false), Arc::default(), Position::ORIGIN)
        .await
        .unwrap();
    sleep(Duration::from_millis(500)).await;

    assert_eq!(rig.handle.pause_all().await.unwrap(), 1);
    sleep(Duration::from_secs(10)).await;
    assert_eq!(rig.handle.status().await.unwrap().pool.in_use, 1);

    assert_eq!(rig.handle.resume_all().await.unwrap(), 1);
    sleep(Duration::from_millis(600)).await;
    assert_eq!(rig.handle.status().await.unwrap().pool.in_use, 0);

    let kinds: Vec<&str> = rig
        .drain_events()
        .iter()
        .map(SfxEvent::event_type)
        .filter(|kind| kind.starts_with("Playback") || kind.starts_with("Voice"))
        .collect();
    assert_eq!(
        kinds,
        vec!["VoiceStarted", "PlaybackPaused", "PlaybackResumed", "VoiceFinished"]
    );

    rig.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_unsubscribe_stops_dispatch() {
    let rig = Rig::start(2);

    assert!(rig.handle.unsubscribe(SFX_CHANNEL).await.unwrap());
    let receivers = rig.sfx.raise(
        cue("click", &[("click", 100)], false),
        Arc::default(),
        Position::ORIGIN,
    );
    assert_eq!(receivers, 0);

    assert!(rig.handle.subscribe(rig.sfx.clone()).await.unwrap());
    assert_eq!(
        rig.handle.status().await.unwrap().subscriptions,
        vec![MUSIC_CHANNEL, SFX_CHANNEL]
    );

    rig.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_volume_through_handle() {
    let rig = Rig::start(1);

    assert!(rig.handle.set_group_volume("SFXVolume", 0.25).await.unwrap());
    assert_eq!(rig.handle.get_group_volume("SFXVolume").await.unwrap(), 0.25);

    assert!(!rig.handle.set_group_volume("VoiceVolume", 0.5).await.unwrap());
    assert_eq!(rig.handle.get_group_volume("VoiceVolume").await.unwrap(), 0.0);

    rig.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_handle_fails_after_shutdown() {
    let rig = Rig::start(1);
    let handle = rig.handle.clone();

    let manager = rig.stop().await;
    assert!(matches!(handle.status().await, Err(Error::DispatcherStopped)));

    drop(manager);
    assert!(matches!(handle.pause_all().await, Err(Error::DispatcherStopped)));
}
