//! Audio cues and the handles returned when one is played

use crate::audio::AudioClip;
use crate::error::{Error, Result};
use crate::playback::VoiceId;
use serde::Serialize;
use uuid::Uuid;

/// Named, ordered set of clips dispatched together
///
/// Each clip gets its own voice when the cue is played.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioCue {
    name: String,
    clips: Vec<AudioClip>,
    looping: bool,
}

impl AudioCue {
    /// Build a cue; at least one clip is required
    pub fn new(name: impl Into<String>, clips: Vec<AudioClip>, looping: bool) -> Result<Self> {
        let name = name.into();
        if clips.is_empty() {
            return Err(Error::BadRequest(format!("Cue '{}' has no clips", name)));
        }
        Ok(Self {
            name,
            clips,
            looping,
        })
    }

    /// One-clip cue
    pub fn single(name: impl Into<String>, clip: AudioClip, looping: bool) -> Self {
        Self {
            name: name.into(),
            clips: vec![clip],
            looping,
        }
    }

    /// Append another clip
    pub fn with_clip(mut self, clip: AudioClip) -> Self {
        self.clips.push(clip);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn clips(&self) -> &[AudioClip] {
        &self.clips
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }
}

/// Voices activated by one `play_cue` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CueHandle {
    pub id: Uuid,
    pub cue: String,
    pub voices: Vec<VoiceId>,
}

impl CueHandle {
    pub(crate) fn new(cue: &str, voices: Vec<VoiceId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            cue: cue.to_string(),
            voices,
        }
    }

    /// True when every clip of the cue was dropped
    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cue_requires_clips() {
        let result = AudioCue::new("empty", Vec::new(), false);
        assert!(matches!(result, Err(Error::BadRequest(_))));
    }

    #[test]
    fn test_cue_keeps_clip_order() {
        let cue = AudioCue::new(
            "impact",
            vec![
                AudioClip::new("thud", Duration::from_millis(300)),
                AudioClip::new("debris", Duration::from_millis(900)),
            ],
            false,
        )
        .unwrap();

        let names: Vec<&str> = cue.clips().iter().map(AudioClip::name).collect();
        assert_eq!(names, vec!["thud", "debris"]);
        assert!(!cue.is_looping());
    }

    #[test]
    fn test_handles_are_unique() {
        let a = CueHandle::new("click", vec![0]);
        let b = CueHandle::new("click", vec![0]);
        assert_ne!(a.id, b.id);
        assert!(CueHandle::new("click", Vec::new()).is_empty());
    }
}
