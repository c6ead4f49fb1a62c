//! Voice playback: requests, the per-voice sequence and the voice pool

pub mod request;
pub mod voice;
pub mod voice_pool;
mod wait;

pub use request::PlaybackRequest;
pub use voice::{ListenerId, Voice, VoiceId};
pub use voice_pool::{PoolStatus, VoicePool};
