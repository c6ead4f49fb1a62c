//! Audio primitives: clips, channel settings, output channels and the mixer

pub mod channel;
pub mod clip;
pub mod mixer;
pub mod settings;
pub mod virtual_channel;

pub use channel::{ChannelFactory, PlaybackChannel};
pub use clip::AudioClip;
pub use mixer::{AudioMixer, ParameterMixer};
pub use settings::{AudioConfiguration, MixerGroup, Position};
pub use virtual_channel::{ChannelOp, VirtualChannel, VirtualChannelFactory};
