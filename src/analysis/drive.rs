//! Front-foot drive analyzer.

use crate::analysis::{Feedback, Handedness};
use crate::error::Result;
use crate::geometry::angle_at_vertex;
use crate::landmark::{BodyPart, PoseFrame};

/// Front-knee angle (hip–knee–ankle) above which the leg counts as straight.
pub const MAX_FRONT_KNEE_ANGLE: f32 = 160.0;

/// Maximum horizontal offset between nose and front knee (normalized).
pub const HEAD_OVER_KNEE_TOLERANCE: f32 = 0.1;

/// Check elbow height, front-knee bend, and head position, in that order.
///
/// Never returns an empty vector: with no flaws the result is exactly
/// `[Feedback::DriveGood]`.
pub fn analyze(frame: &PoseFrame, handedness: Handedness) -> Result<Vec<Feedback>> {
    let lead = handedness.lead();

    let shoulder = frame.point(lead.shoulder)?;
    let elbow = frame.point(lead.elbow)?;
    let hip = frame.point(lead.hip)?;
    let knee = frame.point(lead.knee)?;
    let ankle = frame.point(lead.ankle)?;
    let nose = frame.point(BodyPart::Nose)?;

    let mut feedback = Vec::new();

    // Elbow level with or below the shoulder (y grows downwards).
    if elbow.y >= shoulder.y {
        feedback.push(Feedback::DroppedElbow);
    }

    if angle_at_vertex(hip, knee, ankle) > MAX_FRONT_KNEE_ANGLE {
        feedback.push(Feedback::StraightFrontKnee);
    }

    if (nose.x - knee.x).abs() > HEAD_OVER_KNEE_TOLERANCE {
        feedback.push(Feedback::HeadNotOverKnee);
    }

    if feedback.is_empty() {
        feedback.push(Feedback::DriveGood);
    }
    Ok(feedback)
}
