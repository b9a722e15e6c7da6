//! Shot-specific rule engine.
//!
//! - [`ShotType`]: which analyzer to run
//! - [`Handedness`] / [`Side`]: which side of the body leads the shot
//! - [`Feedback`]: one flaw or confirmation, in check order
//!
//! Every analyzer is a pure function of one [`PoseFrame`]: no state is kept
//! between calls, so the same frame always yields the same feedback and the
//! analyzers can run on any number of sessions concurrently.
//!
//! An incomplete frame aborts the whole analysis with
//! [`AnalysisError::MissingLandmark`](crate::error::AnalysisError); no
//! partial feedback is returned.

pub mod drive;
pub mod pull;
pub mod stance;

use std::fmt;
use std::str::FromStr;

use crate::error::Result;
use crate::landmark::{BodyPart, PoseFrame};

// ---------------------------------------------------------------------------
// Shot selection
// ---------------------------------------------------------------------------

/// The shot an analyzer evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ShotType {
    #[default]
    Stance,
    Drive,
    PullShot,
}

impl ShotType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stance => "stance",
            Self::Drive => "drive",
            Self::PullShot => "pull_shot",
        }
    }
}

impl fmt::Display for ShotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShotType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stance" => Ok(Self::Stance),
            "drive" => Ok(Self::Drive),
            "pull" | "pull_shot" | "pull-shot" => Ok(Self::PullShot),
            _ => Err(format!("unknown shot type: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Handedness
// ---------------------------------------------------------------------------

/// Batting handedness. A right-handed batsman leads with the left side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Handedness {
    #[default]
    Right,
    Left,
}

impl Handedness {
    /// The side facing the bowler.
    pub fn lead(self) -> Side {
        match self {
            Self::Right => Side::LEFT,
            Self::Left => Side::RIGHT,
        }
    }

    /// The side away from the bowler.
    pub fn rear(self) -> Side {
        match self {
            Self::Right => Side::RIGHT,
            Self::Left => Side::LEFT,
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Right => write!(f, "right"),
            Self::Left => write!(f, "left"),
        }
    }
}

impl FromStr for Handedness {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "right" | "rhb" => Ok(Self::Right),
            "left" | "lhb" => Ok(Self::Left),
            _ => Err(format!("unknown handedness: {s}")),
        }
    }
}

/// Limb landmarks for one side of the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Side {
    pub shoulder: BodyPart,
    pub elbow: BodyPart,
    pub wrist: BodyPart,
    pub hip: BodyPart,
    pub knee: BodyPart,
    pub ankle: BodyPart,
}

impl Side {
    pub const LEFT: Side = Side {
        shoulder: BodyPart::LeftShoulder,
        elbow: BodyPart::LeftElbow,
        wrist: BodyPart::LeftWrist,
        hip: BodyPart::LeftHip,
        knee: BodyPart::LeftKnee,
        ankle: BodyPart::LeftAnkle,
    };

    pub const RIGHT: Side = Side {
        shoulder: BodyPart::RightShoulder,
        elbow: BodyPart::RightElbow,
        wrist: BodyPart::RightWrist,
        hip: BodyPart::RightHip,
        knee: BodyPart::RightKnee,
        ankle: BodyPart::RightAnkle,
    };
}

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

/// One flaw or confirmation produced by an analyzer.
///
/// The human-readable text is [`Feedback::message`] (also the `Display`
/// output). Variants carry no severity; position in the analyzer output is
/// check order only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Feedback {
    // -- Stance --
    HeadOffCentre,
    StanceTooNarrow,
    StanceTooWide,
    LowBacklift,

    // -- Drive --
    DroppedElbow,
    StraightFrontKnee,
    HeadNotOverKnee,
    DriveGood,

    // -- Pull shot --
    LimitedRotation,
    SwingNotLevel,
    PullGood,
}

impl Feedback {
    pub fn message(self) -> &'static str {
        match self {
            Self::HeadOffCentre => "Keep your head still and centered for better balance.",
            Self::StanceTooNarrow => "Widen your stance for better stability.",
            Self::StanceTooWide => "Your stance is too wide, which may restrict movement.",
            Self::LowBacklift => "Raise your hands for a proper backlift.",
            Self::DroppedElbow => "Lead with a high elbow for a better drive.",
            Self::StraightFrontKnee => {
                "Bend your front knee more to transfer your weight into the shot."
            }
            Self::HeadNotOverKnee => {
                "Keep your head over your front knee for better balance and control."
            }
            Self::DriveGood => "Good form on the drive! High elbow and solid base.",
            Self::LimitedRotation => {
                "Rotate your shoulders and hips more to generate power in your pull shot."
            }
            Self::SwingNotLevel => "Keep your bat swing horizontal for a more effective pull shot.",
            Self::PullGood => "Excellent rotation and bat path on the pull shot!",
        }
    }

    /// `true` for confirmations of good form rather than flaws.
    pub fn is_positive(self) -> bool {
        matches!(self, Self::DriveGood | Self::PullGood)
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Run the analyzer for `shot` over one frame.
pub fn analyze(shot: ShotType, frame: &PoseFrame, handedness: Handedness) -> Result<Vec<Feedback>> {
    match shot {
        ShotType::Stance => stance::analyze(frame, handedness),
        ShotType::Drive => drive::analyze(frame, handedness),
        ShotType::PullShot => pull::analyze(frame, handedness),
    }
}

// ---------------------------------------------------------------------------
// Test fixtures
// ---------------------------------------------------------------------------
