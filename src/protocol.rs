//! Client message types and JSON encode/decode.
//!
//! - [`Inbound`]: messages a client sends (one video frame, client-side
//!   landmarks, or a session settings change)
//! - [`Outbound`]: messages we send back to the client
//!
//! Every message is one WebSocket text frame. Video frames are sent as bare
//! image data URLs (`data:image/jpeg;base64,...`); everything else is a JSON
//! object with a `type` tag.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::{Handedness, ShotType};
use crate::coach::CoachingMessage;
use crate::landmark::Landmark;

/// Errors from classifying or parsing an inbound client message.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid control message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unrecognized message (starts with {prefix:?})")]
    Unrecognized { prefix: String },
}

/// A message a client sends to us.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// One encoded video frame as a data URL.
    Image(String),
    /// Landmarks the client estimated itself, in MediaPipe index order.
    /// Empty when the client found no person (`[]` or `null` on the wire).
    Landmarks(Vec<Landmark>),
    /// Change the session's shot and/or handedness. `None` keeps the current value.
    Configure {
        shot: Option<ShotType>,
        handedness: Option<Handedness>,
    },
}

/// Wire shape of the JSON-tagged inbound messages.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Control {
    Landmarks {
        #[serde(default)]
        landmarks: Option<Vec<Landmark>>,
    },
    Configure {
        #[serde(default)]
        shot: Option<ShotType>,
        #[serde(default)]
        handedness: Option<Handedness>,
    },
}

impl Inbound {
    /// Classify and decode one text frame.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let trimmed = text.trim_start();
        if trimmed.starts_with("data:") {
            return Ok(Inbound::Image(trimmed.to_owned()));
        }
        if trimmed.starts_with('{') {
            return Ok(match serde_json::from_str::<Control>(trimmed)? {
                Control::Landmarks { landmarks } => Inbound::Landmarks(landmarks.unwrap_or_default()),
                Control::Configure { shot, handedness } => Inbound::Configure { shot, handedness },
            });
        }
        Err(ProtocolError::Unrecognized {
            prefix: trimmed.chars().take(16).collect(),
        })
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Inbound::Image(_) => "image",
            Inbound::Landmarks(_) => "landmarks",
            Inbound::Configure { .. } => "configure",
        }
    }
}

/// A message we send to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    /// Spoken coaching tip: display text plus base64-encoded audio.
    AudioFeedback { message: String, audio: String },
}

impl Outbound {
    pub fn audio_feedback(msg: &CoachingMessage) -> Self {
        Outbound::AudioFeedback {
            message: msg.text.clone(),
            audio: STANDARD.encode(&msg.audio),
        }
    }

    pub fn to_json(&self) -> String {
        // Only string fields; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}
