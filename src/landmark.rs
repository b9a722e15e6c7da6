//! Body-part identifiers and the per-frame landmark table.
//!
//! Indices follow the 33-point MediaPipe pose topology, which is also the
//! order pose estimators emit landmarks in.

use std::fmt;

use crate::error::{AnalysisError, Result};
use crate::geometry::Point2D;

/// Number of landmarks in a full pose estimate.
pub const LANDMARK_COUNT: usize = 33;

/// Closed set of body-part identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BodyPart {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl BodyPart {
    /// Every body part, in index order.
    pub const ALL: [BodyPart; LANDMARK_COUNT] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_index(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEyeInner => "left eye inner",
            Self::LeftEye => "left eye",
            Self::LeftEyeOuter => "left eye outer",
            Self::RightEyeInner => "right eye inner",
            Self::RightEye => "right eye",
            Self::RightEyeOuter => "right eye outer",
            Self::LeftEar => "left ear",
            Self::RightEar => "right ear",
            Self::MouthLeft => "mouth left",
            Self::MouthRight => "mouth right",
            Self::LeftShoulder => "left shoulder",
            Self::RightShoulder => "right shoulder",
            Self::LeftElbow => "left elbow",
            Self::RightElbow => "right elbow",
            Self::LeftWrist => "left wrist",
            Self::RightWrist => "right wrist",
            Self::LeftPinky => "left pinky",
            Self::RightPinky => "right pinky",
            Self::LeftIndex => "left index",
            Self::RightIndex => "right index",
            Self::LeftThumb => "left thumb",
            Self::RightThumb => "right thumb",
            Self::LeftHip => "left hip",
            Self::RightHip => "right hip",
            Self::LeftKnee => "left knee",
            Self::RightKnee => "right knee",
            Self::LeftAnkle => "left ankle",
            Self::RightAnkle => "right ankle",
            Self::LeftHeel => "left heel",
            Self::RightHeel => "right heel",
            Self::LeftFootIndex => "left foot index",
            Self::RightFootIndex => "right foot index",
        }
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One estimated landmark.
///
/// `z` and `visibility` are carried through from the estimator but no rule
/// reads them.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub z: f32,
    #[cfg_attr(feature = "serde", serde(default = "full_visibility"))]
    pub visibility: f32,
}

#[cfg(feature = "serde")]
fn full_visibility() -> f32 {
    1.0
}

impl Landmark {
    /// Landmark at `(x, y)` with zero depth and full visibility.
    pub const fn at(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0, visibility: 1.0 }
    }

    pub fn point(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

/// All landmarks estimated for a single video frame.
///
/// Slots are optional so a partial estimate can be represented; lookups of
/// an empty slot fail with [`AnalysisError::MissingLandmark`].
#[derive(Debug, Clone, PartialEq)]
pub struct PoseFrame {
    slots: [Option<Landmark>; LANDMARK_COUNT],
}

impl Default for PoseFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl PoseFrame {
    /// An empty frame with no landmarks.
    pub fn new() -> Self {
        Self { slots: [None; LANDMARK_COUNT] }
    }

    /// Build a frame from estimator output in index order.
    ///
    /// Extra entries beyond [`LANDMARK_COUNT`] are ignored; a short slice
    /// leaves the trailing body parts empty.
    pub fn from_landmarks(landmarks: &[Landmark]) -> Self {
        let mut frame = Self::new();
        for (slot, lm) in frame.slots.iter_mut().zip(landmarks) {
            *slot = Some(*lm);
        }
        frame
    }

    /// Builder-style insert.
    pub fn with(mut self, part: BodyPart, landmark: Landmark) -> Self {
        self.set(part, landmark);
        self
    }

    pub fn set(&mut self, part: BodyPart, landmark: Landmark) {
        self.slots[part.as_index()] = Some(landmark);
    }

    pub fn remove(&mut self, part: BodyPart) -> Option<Landmark> {
        self.slots[part.as_index()].take()
    }

    pub fn contains(&self, part: BodyPart) -> bool {
        self.slots[part.as_index()].is_some()
    }

    /// Number of populated slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Full landmark record for `part`.
    pub fn landmark(&self, part: BodyPart) -> Result<&Landmark> {
        self.slots[part.as_index()]
            .as_ref()
            .ok_or(AnalysisError::MissingLandmark { part })
    }

    /// 2D position of `part`.
    pub fn point(&self, part: BodyPart) -> Result<Point2D> {
        self.landmark(part).map(Landmark::point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trip() {
        for (i, part) in BodyPart::ALL.iter().enumerate() {
            assert_eq!(part.as_index(), i);
            assert_eq!(BodyPart::from_index(i), Some(*part));
        }
        assert_eq!(BodyPart::from_index(LANDMARK_COUNT), None);
    }

    #[test]
    fn mediapipe_indices() {
        assert_eq!(BodyPart::LeftShoulder.as_index(), 11);
        assert_eq!(BodyPart::RightWrist.as_index(), 16);
        assert_eq!(BodyPart::LeftHip.as_index(), 23);
        assert_eq!(BodyPart::RightAnkle.as_index(), 28);
    }

    #[test]
    fn lookup_present_and_missing() {
        let frame = PoseFrame::new().with(BodyPart::Nose, Landmark::at(0.5, 0.2));
        assert_eq!(frame.point(BodyPart::Nose).unwrap(), Point2D::new(0.5, 0.2));
        assert_eq!(
            frame.point(BodyPart::LeftKnee),
            Err(AnalysisError::MissingLandmark { part: BodyPart::LeftKnee })
        );
    }

    #[test]
    fn from_landmarks_fills_in_order() {
        let lms: Vec<Landmark> = (0..LANDMARK_COUNT)
            .map(|i| Landmark::at(i as f32 / 100.0, 0.5))
            .collect();
        let frame = PoseFrame::from_landmarks(&lms);
        assert_eq!(frame.len(), LANDMARK_COUNT);
        assert_eq!(frame.point(BodyPart::LeftElbow).unwrap().x, 0.13);

        let partial = PoseFrame::from_landmarks(&lms[..12]);
        assert_eq!(partial.len(), 12);
        assert!(partial.contains(BodyPart::LeftShoulder));
        assert!(!partial.contains(BodyPart::RightShoulder));
    }

    #[test]
    fn remove_clears_slot() {
        let mut frame = PoseFrame::new().with(BodyPart::Nose, Landmark::at(0.5, 0.5));
        assert!(!frame.is_empty());
        assert!(frame.remove(BodyPart::Nose).is_some());
        assert!(frame.is_empty());
    }
}
