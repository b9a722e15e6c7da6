//! Server configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) is valid:
//!
//! ```toml
//! listen_addr = "0.0.0.0:8000"
//! shot = "drive"
//! handedness = "left"
//! repeat_cooldown_secs = 5
//! log_level = "info"
//!
//! [coach]
//! command = ["python3", "llm_tip.py"]
//!
//! [speech]
//! command = ["espeak", "--stdout"]
//!
//! [pose]
//! command = ["python3", "pose_sidecar.py"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::analysis::{Handedness, ShotType};
use crate::coach::{
    CoachingText, CommandCoach, CommandSpeech, NoSpeech, ScriptedCoach, Services, SpeechSynth,
};
use crate::error::ServiceError;
use crate::pose::{PoseEstimator, SidecarEstimator};
use crate::session::SessionSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    /// Shot analyzed by new sessions until a client reconfigures.
    pub shot: ShotType,
    pub handedness: Handedness,
    /// Seconds before the same tip may be spoken again. 0 disables suppression.
    pub repeat_cooldown_secs: u64,
    /// Fallback log filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Generative tip backend; fed the coaching prompt, prints the tip.
    pub coach: CommandSection,
    pub speech: CommandSection,
    pub pose: CommandSection,
}

/// An external program, as an argv list. Empty means not configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandSection {
    pub command: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_owned(),
            shot: ShotType::Stance,
            handedness: Handedness::Right,
            repeat_cooldown_secs: 5,
            log_level: "info".to_owned(),
            coach: CommandSection::default(),
            speech: CommandSection::default(),
            pose: CommandSection::default(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            shot: self.shot,
            handedness: self.handedness,
            repeat_cooldown: Duration::from_secs(self.repeat_cooldown_secs),
        }
    }

    /// Instantiate the configured collaborators.
    ///
    /// Spawns the pose sidecar if one is configured.
    pub fn build_services(&self) -> Result<Services, ServiceError> {
        let coach: Arc<dyn CoachingText> = match CommandCoach::new(&self.coach.command) {
            Some(cmd) => {
                info!(command = ?self.coach.command, "coaching tips via external command");
                Arc::new(cmd)
            }
            None => Arc::new(ScriptedCoach),
        };

        let speech: Arc<dyn SpeechSynth> = match CommandSpeech::new(&self.speech.command) {
            Some(cmd) => {
                info!(command = ?self.speech.command, "speech via external command");
                Arc::new(cmd)
            }
            None => Arc::new(NoSpeech),
        };

        let pose: Option<Arc<dyn PoseEstimator>> = if self.pose.command.is_empty() {
            info!("no pose model configured; only client landmarks will be analyzed");
            None
        } else {
            let sidecar = SidecarEstimator::spawn(&self.pose.command)?;
            info!(command = ?self.pose.command, "pose model via sidecar");
            Some(Arc::new(sidecar))
        };

        Ok(Services {
            pose,
            coach,
            speech,
        })
    }
}
