//! Playback configuration applied to a channel before each clip
//!
//! Mirrors the knobs a game audio source exposes: gain, pitch, panning,
//! 3D attenuation and the mixer group the output is routed to. Presets are
//! deserialized from the cue library TOML; every field has a default.

use crate::audio::mixer::{MASTER_VOLUME, MUSIC_VOLUME, SFX_VOLUME};
use serde::{Deserialize, Serialize};

/// Position in 3D space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub const ORIGIN: Position = Position {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Position) -> f32 {
        let (dx, dy, dz) = (self.x - other.x, self.y - other.y, self.z - other.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Mixer group the channel output is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MixerGroup {
    Master,
    Music,
    #[default]
    Sfx,
}

impl MixerGroup {
    /// Exposed mixer parameter controlling this group's volume
    pub fn volume_parameter(&self) -> &'static str {
        match self {
            MixerGroup::Master => MASTER_VOLUME,
            MixerGroup::Music => MUSIC_VOLUME,
            MixerGroup::Sfx => SFX_VOLUME,
        }
    }
}

/// Distance attenuation curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RolloffMode {
    #[default]
    Logarithmic,
    Linear,
}

/// Settings applied to a playback channel for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfiguration {
    pub group: MixerGroup,
    pub mute: bool,
    pub bypass_effects: bool,
    /// 0 = highest priority, 255 = lowest
    pub priority: u8,
    pub volume: f32,
    pub pitch: f32,
    /// -1.0 (left) to 1.0 (right)
    pub stereo_pan: f32,
    /// 0.0 = fully 2D, 1.0 = fully 3D
    pub spatial_blend: f32,
    pub reverb_zone_mix: f32,
    pub doppler_level: f32,
    /// Spread angle in degrees for 3D sounds
    pub spread: f32,
    pub rolloff: RolloffMode,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for AudioConfiguration {
    fn default() -> Self {
        Self {
            group: MixerGroup::Sfx,
            mute: false,
            bypass_effects: false,
            priority: 128,
            volume: 1.0,
            pitch: 1.0,
            stereo_pan: 0.0,
            spatial_blend: 0.0,
            reverb_zone_mix: 1.0,
            doppler_level: 1.0,
            spread: 0.0,
            rolloff: RolloffMode::Logarithmic,
            min_distance: 0.1,
            max_distance: 50.0,
        }
    }
}

impl AudioConfiguration {
    /// Default configuration routed to the music group
    pub fn music() -> Self {
        Self {
            group: MixerGroup::Music,
            priority: 0,
            ..Self::default()
        }
    }

    /// Copy with every field clamped into its legal range
    pub fn validated(&self) -> Self {
        let min_distance = finite_or(self.min_distance, 0.1).max(0.0);
        Self {
            volume: finite_or(self.volume, 1.0).clamp(0.0, 1.0),
            pitch: finite_or(self.pitch, 1.0).clamp(-3.0, 3.0),
            stereo_pan: finite_or(self.stereo_pan, 0.0).clamp(-1.0, 1.0),
            spatial_blend: finite_or(self.spatial_blend, 0.0).clamp(0.0, 1.0),
            reverb_zone_mix: finite_or(self.reverb_zone_mix, 1.0).clamp(0.0, 1.1),
            doppler_level: finite_or(self.doppler_level, 1.0).clamp(0.0, 5.0),
            spread: finite_or(self.spread, 0.0).clamp(0.0, 360.0),
            min_distance,
            max_distance: finite_or(self.max_distance, 50.0).max(min_distance),
            ..self.clone()
        }
    }

    /// Gain actually applied to the output (0.0 when muted)
    pub fn effective_volume(&self) -> f32 {
        if self.mute {
            0.0
        } else {
            self.volume
        }
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}
