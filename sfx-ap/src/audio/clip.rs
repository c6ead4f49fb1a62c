//! Audio clip handles
//!
//! A clip is an opaque, cheaply clonable handle: a name, a duration and the
//! raw sample data. The player never decodes audio; the data is carried
//! through to the playback channel untouched.

use crate::error::{Error, Result};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Sample layout of clip data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

/// Shared handle to a clip
#[derive(Clone)]
pub struct AudioClip {
    name: Arc<str>,
    duration: Duration,
    samples: Arc<[f32]>,
    format: Option<ClipFormat>,
}

impl AudioClip {
    /// Clip with a known duration and no sample data
    pub fn new(name: impl Into<String>, duration: Duration) -> Self {
        let name: String = name.into();
        Self {
            name: Arc::from(name),
            duration,
            samples: Arc::from(Vec::new()),
            format: None,
        }
    }

    /// Clip with a duration given in seconds
    ///
    /// Negative, NaN or infinite lengths are rejected.
    pub fn with_length(name: impl Into<String>, seconds: f64) -> Result<Self> {
        let name = name.into();
        let duration = Duration::try_from_secs_f64(seconds).map_err(|_| {
            Error::BadRequest(format!("Invalid length {} for clip '{}'", seconds, name))
        })?;
        Ok(Self::new(name, duration))
    }

    /// Clip backed by interleaved samples; duration is derived from the data
    pub fn from_samples(
        name: impl Into<String>,
        samples: Vec<f32>,
        sample_rate: u32,
        channels: u16,
    ) -> Result<Self> {
        let name = name.into();
        if sample_rate == 0 || channels == 0 {
            return Err(Error::BadRequest(format!(
                "Clip '{}' needs a non-zero sample rate and channel count",
                name
            )));
        }

        let frames = samples.len() / channels as usize;
        let duration = Duration::from_secs_f64(frames as f64 / sample_rate as f64);

        Ok(Self {
            name: Arc::from(name),
            duration,
            samples: Arc::from(samples),
            format: Some(ClipFormat {
                sample_rate,
                channels,
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Duration in seconds
    pub fn length(&self) -> f64 {
        self.duration.as_secs_f64()
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn format(&self) -> Option<ClipFormat> {
        self.format
    }
}

impl PartialEq for AudioClip {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.duration == other.duration
            && (Arc::ptr_eq(&self.samples, &other.samples) || self.samples == other.samples)
    }
}

impl fmt::Debug for AudioClip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioClip")
            .field("name", &self.name)
            .field("duration", &self.duration)
            .field("samples", &self.samples.len())
            .field("format", &self.format)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_from_samples() {
        // 1.5 seconds of stereo at 8 kHz
        let samples = vec![0.0; 8000 * 2 * 3 / 2];
        let clip = AudioClip::from_samples("chime", samples, 8000, 2).unwrap();
        assert_eq!(clip.duration(), Duration::from_millis(1500));
        assert_eq!(
            clip.format(),
            Some(ClipFormat {
                sample_rate: 8000,
                channels: 2
            })
        );
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        assert!(AudioClip::from_samples("broken", vec![0.0; 4], 0, 1).is_err());
        assert!(AudioClip::from_samples("broken", vec![0.0; 4], 44100, 0).is_err());
    }

    #[test]
    fn test_with_length() {
        let clip = AudioClip::with_length("door", 0.25).unwrap();
        assert_eq!(clip.duration(), Duration::from_millis(250));
        assert_eq!(clip.length(), 0.25);
        assert!(clip.samples().is_empty());
        assert!(AudioClip::with_length("door", -1.0).is_err());
        assert!(AudioClip::with_length("door", f64::NAN).is_err());
    }

    #[test]
    fn test_clones_share_data() {
        let clip = AudioClip::from_samples("hit", vec![0.5; 100], 100, 1).unwrap();
        let copy = clip.clone();
        assert_eq!(clip, copy);
        assert_eq!(copy.samples().len(), 100);
    }
}
