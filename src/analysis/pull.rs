//! Pull-shot analyzer.
//!
//! Rotation is estimated as the difference between the bearing of the
//! shoulder line and the bearing of the hip line, both measured from the
//! rear side to the lead side. The difference is taken on raw `atan2`
//! bearings and is not wrapped: when both lines point close to ±180° a
//! small real rotation can read as a difference near 360° (and pass), so
//! the check is only reliable away from that discontinuity.

use crate::analysis::{Feedback, Handedness};
use crate::error::Result;
use crate::geometry::bearing;
use crate::landmark::{BodyPart, PoseFrame};

/// Minimum shoulder-vs-hip bearing difference, in degrees.
pub const MIN_ROTATION_DEG: f32 = 15.0;

/// Maximum vertical gap between the wrists for a level swing (normalized).
pub const MAX_WRIST_HEIGHT_GAP: f32 = 0.1;

/// Shoulder-line bearing minus hip-line bearing, absolute, unwrapped.
pub fn rotation_difference(frame: &PoseFrame, handedness: Handedness) -> Result<f32> {
    let lead = handedness.lead();
    let rear = handedness.rear();

    let shoulders = bearing(frame.point(rear.shoulder)?, frame.point(lead.shoulder)?);
    let hips = bearing(frame.point(rear.hip)?, frame.point(lead.hip)?);
    Ok((shoulders - hips).abs())
}

/// Check body rotation and swing plane, in that order.
///
/// Never returns an empty vector: with no flaws the result is exactly
/// `[Feedback::PullGood]`.
pub fn analyze(frame: &PoseFrame, handedness: Handedness) -> Result<Vec<Feedback>> {
    let rotation = rotation_difference(frame, handedness)?;
    let left_wrist = frame.point(BodyPart::LeftWrist)?;
    let right_wrist = frame.point(BodyPart::RightWrist)?;

    let mut feedback = Vec::new();

    if rotation < MIN_ROTATION_DEG {
        feedback.push(Feedback::LimitedRotation);
    }

    if (left_wrist.y - right_wrist.y).abs() > MAX_WRIST_HEIGHT_GAP {
        feedback.push(Feedback::SwingNotLevel);
    }

    if feedback.is_empty() {
        feedback.push(Feedback::PullGood);
    }
    Ok(feedback)
}
