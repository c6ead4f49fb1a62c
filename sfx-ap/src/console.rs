//! Console commands for the sfx-ap binary
//!
//! One command per stdin line. `play` and `music` raise cues on the cue
//! channels like gameplay code would; everything else talks to the
//! dispatcher through its `ManagerHandle`.

use crate::audio::mixer::{MASTER_VOLUME, MUSIC_VOLUME, SFX_VOLUME};
use crate::audio::{AudioConfiguration, Position};
use crate::config::CueLibrary;
use crate::cue_channel::{CueChannel, MUSIC_CHANNEL};
use crate::error::{Error, Result};
use crate::manager::ManagerHandle;
use std::str::FromStr;
use std::sync::Arc;

pub const HELP: &str = "\
Commands:
  play <cue> [x y z]      raise a cue on its channel
  music <cue>             raise a cue on the music channel
  stop [cue]              stop one cue by name, or everything
  pause | resume          pause or resume every playing voice
  volume [group] [value]  show volumes, or set master/music/sfx (0.0-1.0)
  cues                    list the cue library
  status                  show pool and dispatcher status
  help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Play { cue: String, position: Position },
    Music { cue: String },
    Stop { cue: Option<String> },
    Pause,
    Resume,
    Volume { group: Option<String>, value: Option<f32> },
    Cues,
    Status,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let verb = words
            .next()
            .ok_or_else(|| Error::BadRequest("Empty command".to_string()))?;
        let args: Vec<&str> = words.collect();

        let command = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("play", [cue]) => Command::Play {
                cue: cue.to_string(),
                position: Position::ORIGIN,
            },
            ("play", [cue, x, y, z]) => Command::Play {
                cue: cue.to_string(),
                position: Position::new(parse_f32(x)?, parse_f32(y)?, parse_f32(z)?),
            },
            ("music", [cue]) => Command::Music {
                cue: cue.to_string(),
            },
            ("stop", []) => Command::Stop { cue: None },
            ("stop", [cue]) => Command::Stop {
                cue: Some(cue.to_string()),
            },
            ("pause", []) => Command::Pause,
            ("resume", []) => Command::Resume,
            ("volume", []) => Command::Volume {
                group: None,
                value: None,
            },
            ("volume", [group]) => Command::Volume {
                group: Some(group.to_string()),
                value: None,
            },
            ("volume", [group, value]) => Command::Volume {
                group: Some(group.to_string()),
                value: Some(parse_f32(value)?),
            },
            ("cues", []) => Command::Cues,
            ("status", []) => Command::Status,
            ("help", []) | ("?", []) => Command::Help,
            ("quit", []) | ("exit", []) => Command::Quit,
            _ => {
                return Err(Error::BadRequest(format!(
                    "Unrecognized command '{}' (try 'help')",
                    line.trim()
                )))
            }
        };
        Ok(command)
    }
}

fn parse_f32(word: &str) -> Result<f32> {
    word.parse()
        .map_err(|_| Error::BadRequest(format!("'{}' is not a number", word)))
}

/// Mixer parameter for a console group name
fn group_parameter(group: &str) -> Result<&'static str> {
    match group.to_ascii_lowercase().as_str() {
        "master" => Ok(MASTER_VOLUME),
        "music" => Ok(MUSIC_VOLUME),
        "sfx" => Ok(SFX_VOLUME),
        other => Err(Error::BadRequest(format!(
            "Unknown volume group '{}' (master, music, sfx)",
            other
        ))),
    }
}

/// Result of executing a command
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Reply(String),
    Quit,
}

pub struct Console {
    handle: ManagerHandle,
    library: CueLibrary,
    sfx: CueChannel,
    music: CueChannel,
}

impl Console {
    pub fn new(handle: ManagerHandle, library: CueLibrary, sfx: CueChannel, music: CueChannel) -> Self {
        Self {
            handle,
            library,
            sfx,
            music,
        }
    }

    fn channel(&self, name: &str) -> &CueChannel {
        if name == MUSIC_CHANNEL {
            &self.music
        } else {
            &self.sfx
        }
    }

    pub async fn execute(&self, command: Command) -> Result<Outcome> {
        let reply = match command {
            Command::Play { cue, position } => {
                let entry = self
                    .library
                    .get(&cue)
                    .ok_or_else(|| Error::NotFound(format!("Cue '{}'", cue)))?;
                let channel = self.channel(&entry.channel);
                let receivers = channel.raise(
                    Arc::clone(&entry.cue),
                    Arc::clone(&entry.configuration),
                    position,
                );
                format!("Raised '{}' on {} ({} subscribers)", cue, channel.name(), receivers)
            }
            Command::Music { cue } => {
                let entry = self
                    .library
                    .get(&cue)
                    .ok_or_else(|| Error::NotFound(format!("Cue '{}'", cue)))?;
                let configuration = if entry.channel == MUSIC_CHANNEL {
                    Arc::clone(&entry.configuration)
                } else {
                    Arc::new(AudioConfiguration {
                        group: crate::audio::MixerGroup::Music,
                        ..(*entry.configuration).clone()
                    })
                };
                let receivers = self
                    .music
                    .raise(Arc::clone(&entry.cue), configuration, Position::ORIGIN);
                format!("Raised '{}' on {} ({} subscribers)", cue, self.music.name(), receivers)
            }
            Command::Stop { cue: None } => {
                let stopped = self.handle.stop_all().await?;
                format!("Stopped {} cues", stopped)
            }
            Command::Stop { cue: Some(name) } => {
                let mut stopped = 0;
                for handle in self.handle.active_cues().await? {
                    if handle.cue == name && self.handle.stop_cue(&handle).await? {
                        stopped += 1;
                    }
                }
                format!("Stopped {} instances of '{}'", stopped, name)
            }
            Command::Pause => {
                let voices = self.handle.pause_all().await?;
                format!("Paused {} voices", voices)
            }
            Command::Resume => {
                let voices = self.handle.resume_all().await?;
                format!("Resumed {} voices", voices)
            }
            Command::Volume {
                group: Some(group),
                value: Some(value),
            } => {
                let parameter = group_parameter(&group)?;
                if !(0.0..=1.0).contains(&value) {
                    return Err(Error::BadRequest(format!(
                        "Volume {} out of range 0.0-1.0",
                        value
                    )));
                }
                if !self.handle.set_group_volume(parameter, value).await? {
                    return Err(Error::MixerParameterNotFound(parameter.to_string()));
                }
                format!("{} = {:.2}", group.to_ascii_lowercase(), value)
            }
            Command::Volume {
                group: Some(group),
                value: None,
            } => {
                let parameter = group_parameter(&group)?;
                let value = self.handle.get_group_volume(parameter).await?;
                format!("{} = {:.2}", group.to_ascii_lowercase(), value)
            }
            Command::Volume { group: None, .. } => {
                let master = self.handle.get_group_volume(MASTER_VOLUME).await?;
                let music = self.handle.get_group_volume(MUSIC_VOLUME).await?;
                let sfx = self.handle.get_group_volume(SFX_VOLUME).await?;
                format!("master = {:.2}, music = {:.2}, sfx = {:.2}", master, music, sfx)
            }
            Command::Cues => self
                .library
                .names()
                .iter()
                .filter_map(|name| self.library.get(name).map(|entry| (name, entry)))
                .map(|(name, entry)| {
                    format!(
                        "{:<12} {:<6} {} clip(s){}",
                        name,
                        entry.channel,
                        entry.cue.clips().len(),
                        if entry.cue.is_looping() { ", looping" } else { "" }
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Command::Status => {
                let status = self.handle.status().await?;
                serde_json::to_string_pretty(&status)
                    .map_err(|e| Error::Playback(format!("Failed to render status: {}", e)))?
            }
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok(Outcome::Quit),
        };
        Ok(Outcome::Reply(reply))
    }
}
