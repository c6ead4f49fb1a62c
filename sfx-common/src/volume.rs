//! Mixer volume conversions
//!
//! UI sliders work in a normalized [0, 1] range while mixer group
//! parameters are expressed in decibels. The mapping is linear:
//!
//! - `0.0` normalized ↔ `-80 dB` (silence)
//! - `1.0` normalized ↔ `0 dB` (unity gain)
//!
//! Values above 0 dB are not representable from the normalized side.

/// Lowest mixer value reachable from a normalized slider (dB)
pub const MIN_MIXER_DB: f32 = -80.0;

/// Highest mixer value reachable from a normalized slider (dB)
pub const MAX_MIXER_DB: f32 = 0.0;

/// Width of the decibel range covered by the normalized slider
const MIXER_DB_RANGE: f32 = MAX_MIXER_DB - MIN_MIXER_DB;

/// Convert a normalized slider value to a mixer value in dB
///
/// `mixer_value = (normalized - 1) * 80`
///
/// # Examples
///
/// ```
/// use sfx_common::volume::normalized_to_mixer_value;
///
/// assert_eq!(normalized_to_mixer_value(1.0), 0.0);
/// assert_eq!(normalized_to_mixer_value(0.0), -80.0);
/// ```
pub fn normalized_to_mixer_value(normalized: f32) -> f32 {
    (normalized - 1.0) * MIXER_DB_RANGE
}

/// Convert a mixer value in dB back to a normalized slider value
///
/// `normalized = 1 + mixer_value / 80`
pub fn mixer_value_to_normalized(mixer_value: f32) -> f32 {
    1.0 + (mixer_value / MIXER_DB_RANGE)
}
