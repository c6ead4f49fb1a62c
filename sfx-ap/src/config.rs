//! Player configuration: bootstrap settings plus the cue library
//!
//! The config file is shared with `sfx_common::config::TomlConfig`; this
//! module reads the player-only sections from the same file:
//!
//! ```toml
//! [presets.ui]
//! priority = 64
//! volume = 0.8
//!
//! [[cues]]
//! name = "click"
//! preset = "ui"
//! clips = [{ name = "click", length = 0.08 }]
//! ```
//!
//! Without a config file (or without any `[[cues]]`) the built-in library
//! is used.

use crate::audio::{AudioClip, AudioConfiguration};
use crate::cue::AudioCue;
use crate::cue_channel::{MUSIC_CHANNEL, SFX_CHANNEL};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sfx_common::config::{resolve_config_path, TomlConfig};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Cue library section of the config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CueFile {
    #[serde(default)]
    pub presets: HashMap<String, AudioConfiguration>,
    #[serde(default)]
    pub cues: Vec<CueDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CueDefinition {
    pub name: String,
    pub clips: Vec<ClipDefinition>,
    #[serde(default)]
    pub looping: bool,
    /// Name of a `[presets.<name>]` table; default configuration if absent
    #[serde(default)]
    pub preset: Option<String>,
    /// Cue channel the console raises this cue on
    #[serde(default = "default_channel")]
    pub channel: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipDefinition {
    pub name: String,
    /// Length in seconds
    pub length: f64,
}

fn default_channel() -> String {
    SFX_CHANNEL.to_string()
}

/// Cue ready to be raised
#[derive(Debug, Clone)]
pub struct LibraryCue {
    pub cue: Arc<AudioCue>,
    pub configuration: Arc<AudioConfiguration>,
    pub channel: String,
}

/// Named cues available to the player
#[derive(Debug, Clone, Default)]
pub struct CueLibrary {
    cues: BTreeMap<String, LibraryCue>,
}

impl CueLibrary {
    /// Parse the `[presets]` and `[[cues]]` sections of a config file
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CueFile = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse cue library: {}", e)))?;
        Self::from_definitions(file)
    }

    /// Validate definitions and build the library
    pub fn from_definitions(file: CueFile) -> Result<Self> {
        let presets: HashMap<String, Arc<AudioConfiguration>> = file
            .presets
            .into_iter()
            .map(|(name, configuration)| (name, Arc::new(configuration.validated())))
            .collect();

        let mut cues = BTreeMap::new();
        for definition in file.cues {
            if cues.contains_key(&definition.name) {
                return Err(Error::Config(format!("Duplicate cue '{}'", definition.name)));
            }
            if definition.channel != SFX_CHANNEL && definition.channel != MUSIC_CHANNEL {
                return Err(Error::Config(format!(
                    "Cue '{}' uses unknown channel '{}'",
                    definition.name, definition.channel
                )));
            }

            let configuration = match &definition.preset {
                Some(preset) => presets.get(preset).cloned().ok_or_else(|| {
                    Error::Config(format!(
                        "Cue '{}' uses unknown preset '{}'",
                        definition.name, preset
                    ))
                })?,
                None => Arc::default(),
            };

            let clips = definition
                .clips
                .iter()
                .map(|clip| AudioClip::with_length(clip.name.as_str(), clip.length))
                .collect::<Result<Vec<_>>>()
                .map_err(|e| Error::Config(format!("Cue '{}': {}", definition.name, e)))?;
            let cue = AudioCue::new(definition.name.as_str(), clips, definition.looping)
                .map_err(|e| Error::Config(e.to_string()))?;

            debug!(cue = %definition.name, clips = cue.clips().len(), "Loaded cue");
            cues.insert(
                definition.name,
                LibraryCue {
                    cue: Arc::new(cue),
                    configuration,
                    channel: definition.channel,
                },
            );
        }

        Ok(Self { cues })
    }

    /// Library used when the config file defines no cues
    pub fn builtin() -> Self {
        let ui = Arc::new(AudioConfiguration {
            priority: 64,
            volume: 0.8,
            ..AudioConfiguration::default()
        });
        let world = Arc::new(AudioConfiguration {
            spatial_blend: 1.0,
            ..AudioConfiguration::default()
        });
        let music = Arc::new(AudioConfiguration::music());

        let mut library = Self::default();
        library.insert_builtin("click", &[("click", 0.08)], false, &ui, SFX_CHANNEL);
        library.insert_builtin("footstep", &[("footstep", 0.3)], false, &world, SFX_CHANNEL);
        library.insert_builtin(
            "explosion",
            &[("boom", 1.2), ("debris", 2.5)],
            false,
            &world,
            SFX_CHANNEL,
        );
        library.insert_builtin("ambience", &[("wind", 12.0)], true, &world, SFX_CHANNEL);
        library.insert_builtin("theme", &[("theme", 90.0)], true, &music, MUSIC_CHANNEL);
        library
    }

    fn insert_builtin(
        &mut self,
        name: &str,
        clips: &[(&str, f64)],
        looping: bool,
        configuration: &Arc<AudioConfiguration>,
        channel: &str,
    ) {
        let mut clips = clips
            .iter()
            .map(|(clip, seconds)| AudioClip::new(*clip, Duration::from_secs_f64(*seconds)));
        let mut cue = match clips.next() {
            Some(first) => AudioCue::single(name, first, looping),
            None => return,
        };
        for clip in clips {
            cue = cue.with_clip(clip);
        }
        self.cues.insert(
            name.to_string(),
            LibraryCue {
                cue: Arc::new(cue),
                configuration: Arc::clone(configuration),
                channel: channel.to_string(),
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&LibraryCue> {
        self.cues.get(name)
    }

    /// Cue names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.cues.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }
}

/// Everything the player reads at startup
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    pub settings: TomlConfig,
    pub library: CueLibrary,
    /// File the configuration came from, if any
    pub source: Option<PathBuf>,
}

impl PlayerConfig {
    /// Resolve and load the config file
    ///
    /// A missing file falls back to compiled defaults and the built-in
    /// library; a malformed one is an error.
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let path = resolve_config_path(cli_path);

        let (settings, library, source) = match path {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
                })?;
                let settings = TomlConfig::from_toml_str(&content)?;
                let library = CueLibrary::from_toml_str(&content)?;
                info!("Loaded configuration from {}", path.display());
                (settings, library, Some(path))
            }
            other => {
                let settings = TomlConfig::load_or_default(other.as_deref())?;
                (settings, CueLibrary::default(), None)
            }
        };

        let library = if library.is_empty() {
            info!("No cues configured, using built-in cue library");
            CueLibrary::builtin()
        } else {
            library
        };

        Ok(Self {
            settings,
            library,
            source,
        })
    }
}
