//! Bounded pool of reusable voices
//!
//! Voices are created lazily (or eagerly via `prewarm`) up to a fixed
//! capacity and never destroyed. Each voice is either idle or checked
//! out; `request` and `return_voice` move it between the two sets.

use crate::audio::ChannelFactory;
use crate::error::{Error, Result};
use crate::playback::voice::{Voice, VoiceId};
use serde::Serialize;
use sfx_common::events::EventBus;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Snapshot of pool occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStatus {
    pub capacity: usize,
    /// Voices created so far
    pub total: usize,
    pub idle: usize,
    pub in_use: usize,
}

struct PoolState {
    voices: Vec<Voice>,
    /// Stack of idle voice ids; the top is handed out next
    idle: Vec<VoiceId>,
    in_use: BTreeSet<VoiceId>,
    prewarmed: bool,
}

pub struct VoicePool {
    factory: Arc<dyn ChannelFactory>,
    capacity: usize,
    event_bus: EventBus,
    state: Mutex<PoolState>,
}

impl VoicePool {
    pub fn new(factory: Arc<dyn ChannelFactory>, capacity: usize, event_bus: EventBus) -> Self {
        Self {
            factory,
            capacity,
            event_bus,
            state: Mutex::new(PoolState {
                voices: Vec::with_capacity(capacity),
                idle: Vec::with_capacity(capacity),
                in_use: BTreeSet::new(),
                prewarmed: false,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Eagerly create `count` idle voices, clamped to capacity
    ///
    /// Only the first call has an effect.
    pub fn prewarm(&self, count: usize) {
        let mut state = self.state();
        if state.prewarmed {
            warn!("Voice pool already prewarmed, ignoring prewarm({})", count);
            return;
        }
        state.prewarmed = true;

        let target = count.min(self.capacity);
        if target < count {
            warn!(
                "Prewarm of {} voices clamped to pool capacity {}",
                count, self.capacity
            );
        }

        let first_new = state.voices.len();
        while state.voices.len() < target {
            let voice = self.create_voice(state.voices.len());
            state.voices.push(voice);
        }

        // Lowest ids on top of the stack
        for id in (first_new..state.voices.len()).rev() {
            state.idle.push(id);
        }

        info!(
            "Voice pool prewarmed: {} voices (capacity {})",
            state.voices.len(),
            self.capacity
        );
    }

    fn create_voice(&self, id: VoiceId) -> Voice {
        debug!(voice_id = id, "Creating voice");
        Voice::new(id, self.factory.create(id), self.event_bus.clone())
    }

    /// Check out an idle voice
    ///
    /// Grows the pool while below capacity; `None` once every voice is
    /// checked out.
    pub fn request(&self) -> Option<Voice> {
        let mut state = self.state();

        let id = match state.idle.pop() {
            Some(id) => id,
            None if state.voices.len() < self.capacity => {
                let id = state.voices.len();
                let voice = self.create_voice(id);
                state.voices.push(voice);
                id
            }
            None => {
                debug!(
                    "Voice pool exhausted ({} of {} in use)",
                    state.in_use.len(),
                    self.capacity
                );
                return None;
            }
        };

        state.in_use.insert(id);
        debug!(voice_id = id, in_use = state.in_use.len(), "Voice checked out");
        state.voices.get(id).cloned()
    }

    /// Give a checked-out voice back to the pool
    pub fn return_voice(&self, voice: &Voice) -> Result<()> {
        let mut state = self.state();
        let id = voice.id();

        let owned = state
            .voices
            .get(id)
            .map_or(false, |pooled| pooled.ptr_eq(voice));
        if !owned {
            return Err(Error::Pool(format!(
                "Voice {} does not belong to this pool",
                id
            )));
        }

        if !state.in_use.remove(&id) {
            return Err(Error::Pool(format!("Voice {} is not checked out", id)));
        }

        state.idle.push(id);
        debug!(voice_id = id, in_use = state.in_use.len(), "Voice returned");
        Ok(())
    }

    /// Voice by id, whether idle or checked out
    pub fn get(&self, id: VoiceId) -> Option<Voice> {
        self.state().voices.get(id).cloned()
    }

    /// Checked-out voices in id order
    pub fn in_use_voices(&self) -> Vec<Voice> {
        let state = self.state();
        state
            .in_use
            .iter()
            .filter_map(|id| state.voices.get(*id).cloned())
            .collect()
    }

    pub fn status(&self) -> PoolStatus {
        let state = self.state();
        PoolStatus {
            capacity: self.capacity,
            total: state.voices.len(),
            idle: state.idle.len(),
            in_use: state.in_use.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::VirtualChannelFactory;

    fn pool(capacity: usize) -> VoicePool {
        VoicePool::new(
            Arc::new(VirtualChannelFactory::new()),
            capacity,
            EventBus::new(16),
        )
    }

    #[test]
    fn test_hands_out_distinct_voices_until_exhausted() {
        let pool = pool(3);
        pool.prewarm(3);

        let voices: Vec<Voice> = (0..3).map(|_| pool.request().unwrap()).collect();
        let mut ids: Vec<VoiceId> = voices.iter().map(Voice::id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 2]);

        assert!(pool.request().is_none());
        assert_eq!(
            pool.status(),
            PoolStatus {
                capacity: 3,
                total: 3,
                idle: 0,
                in_use: 3
            }
        );
    }

    #[test]
    fn test_prewarmed_voices_are_handed_out_lowest_first() {
        let pool = pool(4);
        pool.prewarm(4);
        assert_eq!(pool.request().unwrap().id(), 0);
        assert_eq!(pool.request().unwrap().id(), 1);
    }

    #[test]
    fn test_returned_voice_is_reused() {
        let pool = pool(1);
        let first = pool.request().unwrap();
        assert!(pool.request().is_none());

        pool.return_voice(&first).unwrap();
        let second = pool.request().unwrap();
        assert!(first.ptr_eq(&second));
        assert_eq!(pool.status().total, 1);
    }

    #[test]
    fn test_double_return_is_rejected() {
        let pool = pool(2);
        let voice = pool.request().unwrap();
        pool.return_voice(&voice).unwrap();

        let result = pool.return_voice(&voice);
        assert!(matches!(result, Err(Error::Pool(_))));

        let status = pool.status();
        assert_eq!(status.idle, 1);
        assert_eq!(status.in_use, 0);
    }

    #[test]
    fn test_foreign_voice_is_rejected() {
        let pool_a = pool(2);
        let pool_b = pool(2);
        let stranger = pool_b.request().unwrap();
        let _own = pool_a.request().unwrap();

        // Same id, different pool
        assert!(matches!(pool_a.return_voice(&stranger), Err(Error::Pool(_))));
        let in_use: Vec<VoiceId> = pool_a.in_use_voices().iter().map(Voice::id).collect();
        assert_eq!(in_use, vec![0]);
        assert_eq!(pool_a.status().in_use, 1);
    }

    #[test]
    fn test_prewarm_is_clamped_and_runs_once() {
        let pool = pool(2);
        pool.prewarm(5);
        assert_eq!(pool.status().total, 2);
        assert_eq!(pool.status().idle, 2);

        pool.prewarm(1);
        assert_eq!(pool.status().idle, 2);
    }

    #[test]
    fn test_lazy_growth_stops_at_capacity() {
        let pool = pool(2);
        assert_eq!(pool.status().total, 0);

        let _a = pool.request().unwrap();
        let _b = pool.request().unwrap();
        assert!(pool.request().is_none());
        assert_eq!(pool.status().total, 2);
    }

    #[test]
    fn test_in_use_voices_in_id_order() {
        let pool = pool(3);
        pool.prewarm(3);
        let a = pool.request().unwrap();
        let b = pool.request().unwrap();
        let _c = pool.request().unwrap();
        pool.return_voice(&b).unwrap();

        let ids: Vec<VoiceId> = pool.in_use_voices().iter().map(Voice::id).collect();
        assert_eq!(ids, vec![0, 2]);
        assert!(pool.get(a.id()).unwrap().ptr_eq(&a));
        assert!(pool.get(9).is_none());
    }
}
