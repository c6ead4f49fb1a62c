//! Mixer with named, exposed group parameters
//!
//! Parameters are plain floats in decibels. Conversions from UI slider
//! values live in `sfx_common::volume`.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Exposed parameter for the master group volume
pub const MASTER_VOLUME: &str = "MasterVolume";

/// Exposed parameter for the music group volume
pub const MUSIC_VOLUME: &str = "MusicVolume";

/// Exposed parameter for the SFX group volume
pub const SFX_VOLUME: &str = "SFXVolume";

/// Mixer that exposes named float parameters
pub trait AudioMixer: Send + Sync {
    /// Set an exposed parameter; returns false if no such parameter exists
    fn set_float(&self, name: &str, value: f32) -> bool;

    /// Read an exposed parameter; `None` if no such parameter exists
    fn get_float(&self, name: &str) -> Option<f32>;
}

/// In-process mixer holding a fixed set of exposed parameters
#[derive(Debug, Default)]
pub struct ParameterMixer {
    parameters: RwLock<HashMap<String, f32>>,
}

impl ParameterMixer {
    /// Mixer exposing the given parameters with their initial values
    pub fn with_parameters<I, S>(parameters: I) -> Self
    where
        I: IntoIterator<Item = (S, f32)>,
        S: Into<String>,
    {
        Self {
            parameters: RwLock::new(
                parameters
                    .into_iter()
                    .map(|(name, value)| (name.into(), value))
                    .collect(),
            ),
        }
    }

    /// Mixer exposing master, music and SFX volumes at 0 dB
    pub fn with_default_groups() -> Self {
        Self::with_parameters([(MASTER_VOLUME, 0.0), (MUSIC_VOLUME, 0.0), (SFX_VOLUME, 0.0)])
    }

    /// Exposed parameter names, sorted
    pub fn parameter_names(&self) -> Vec<String> {
        let parameters = self.parameters.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = parameters.keys().cloned().collect();
        names.sort();
        names
    }
}

impl AudioMixer for ParameterMixer {
    fn set_float(&self, name: &str, value: f32) -> bool {
        let mut parameters = self.parameters.write().unwrap_or_else(PoisonError::into_inner);
        match parameters.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    fn get_float(&self, name: &str) -> Option<f32> {
        let parameters = self.parameters.read().unwrap_or_else(PoisonError::into_inner);
        parameters.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_groups_start_at_unity() {
        let mixer = ParameterMixer::with_default_groups();
        assert_eq!(mixer.get_float(MASTER_VOLUME), Some(0.0));
        assert_eq!(mixer.get_float(MUSIC_VOLUME), Some(0.0));
        assert_eq!(mixer.get_float(SFX_VOLUME), Some(0.0));
        assert_eq!(
            mixer.parameter_names(),
            vec!["MasterVolume", "MusicVolume", "SFXVolume"]
        );
    }

    #[test]
    fn test_unknown_parameter_is_rejected() {
        let mixer = ParameterMixer::with_default_groups();
        assert!(!mixer.set_float("VoiceVolume", -10.0));
        assert_eq!(mixer.get_float("VoiceVolume"), None);
    }

    #[test]
    fn test_set_and_get() {
        let mixer = ParameterMixer::with_default_groups();
        assert!(mixer.set_float(SFX_VOLUME, -12.5));
        assert_eq!(mixer.get_float(SFX_VOLUME), Some(-12.5));
    }
}
