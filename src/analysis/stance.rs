//! Guard-position analyzer: head, feet, and hands before the ball is bowled.

use crate::analysis::{Feedback, Handedness};
use crate::error::Result;
use crate::geometry::distance;
use crate::landmark::{BodyPart, PoseFrame};

/// Maximum horizontal nose offset from the shoulder midpoint (normalized).
pub const HEAD_CENTRE_TOLERANCE: f32 = 0.05;

/// Foot spread below this multiple of shoulder width is too narrow.
pub const MIN_STANCE_RATIO: f32 = 0.8;

/// Foot spread above this multiple of shoulder width is too wide.
pub const MAX_STANCE_RATIO: f32 = 1.5;

/// Check head centring, stance width, and backlift, in that order.
///
/// Returns an empty vector when the guard is sound.
pub fn analyze(frame: &PoseFrame, handedness: Handedness) -> Result<Vec<Feedback>> {
    let lead = handedness.lead();

    let nose = frame.point(BodyPart::Nose)?;
    let left_shoulder = frame.point(BodyPart::LeftShoulder)?;
    let right_shoulder = frame.point(BodyPart::RightShoulder)?;
    let left_ankle = frame.point(BodyPart::LeftAnkle)?;
    let right_ankle = frame.point(BodyPart::RightAnkle)?;
    let lead_elbow = frame.point(lead.elbow)?;
    let lead_wrist = frame.point(lead.wrist)?;

    let mut feedback = Vec::new();

    let shoulder_centre_x = (left_shoulder.x + right_shoulder.x) / 2.0;
    if (nose.x - shoulder_centre_x).abs() > HEAD_CENTRE_TOLERANCE {
        feedback.push(Feedback::HeadOffCentre);
    }

    let shoulder_width = distance(left_shoulder, right_shoulder);
    let foot_distance = distance(left_ankle, right_ankle);
    if foot_distance < shoulder_width * MIN_STANCE_RATIO {
        feedback.push(Feedback::StanceTooNarrow);
    } else if foot_distance > shoulder_width * MAX_STANCE_RATIO {
        feedback.push(Feedback::StanceTooWide);
    }

    // Image y grows downwards: a larger y means the wrist sits lower.
    if lead_wrist.y > lead_elbow.y {
        feedback.push(Feedback::LowBacklift);
    }

    Ok(feedback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::{guard, mirrored};
    use crate::error::AnalysisError;
    use crate::landmark::Landmark;

    #[test]
    fn sound_guard_has_no_feedback() {
        assert_eq!(analyze(&guard(), Handedness::Right).unwrap(), vec![]);
    }

    #[test]
    fn half_width_stance_asks_to_widen_first() {
        // Shoulders 0.2 apart, feet 0.1 apart.
        let frame = guard()
            .with(BodyPart::LeftAnkle, Landmark::at(0.45, 0.95))
            .with(BodyPart::RightAnkle, Landmark::at(0.55, 0.95));
        let feedback = analyze(&frame, Handedness::Right).unwrap();
        assert_eq!(feedback.first(), Some(&Feedback::StanceTooNarrow));
        assert_eq!(feedback[0].message(), "Widen your stance for better stability.");
    }

    #[test]
    fn very_wide_stance() {
        let frame = guard()
            .with(BodyPart::LeftAnkle, Landmark::at(0.3, 0.95))
            .with(BodyPart::RightAnkle, Landmark::at(0.7, 0.95));
        assert_eq!(
            analyze(&frame, Handedness::Right).unwrap(),
            vec![Feedback::StanceTooWide]
        );
    }

    #[test]
    fn head_off_centre() {
        let frame = guard().with(BodyPart::Nose, Landmark::at(0.58, 0.2));
        assert_eq!(
            analyze(&frame, Handedness::Right).unwrap(),
            vec![Feedback::HeadOffCentre]
        );

        // Within tolerance.
        let frame = guard().with(BodyPart::Nose, Landmark::at(0.54, 0.2));
        assert!(analyze(&frame, Handedness::Right).unwrap().is_empty());
    }

    #[test]
    fn dropped_hands() {
        let frame = guard().with(BodyPart::LeftWrist, Landmark::at(0.4, 0.5));
        assert_eq!(
            analyze(&frame, Handedness::Right).unwrap(),
            vec![Feedback::LowBacklift]
        );
        // Right wrist is the rear hand for a right-hander; not checked.
        let frame = guard().with(BodyPart::RightWrist, Landmark::at(0.6, 0.5));
        assert!(analyze(&frame, Handedness::Right).unwrap().is_empty());
    }

    #[test]
    fn left_hander_checks_right_hand() {
        let frame = guard().with(BodyPart::RightWrist, Landmark::at(0.6, 0.5));
        assert_eq!(
            analyze(&frame, Handedness::Left).unwrap(),
            vec![Feedback::LowBacklift]
        );
        let frame = mirrored(&guard().with(BodyPart::LeftWrist, Landmark::at(0.4, 0.5)));
        assert_eq!(
            analyze(&frame, Handedness::Left).unwrap(),
            vec![Feedback::LowBacklift]
        );
    }

    #[test]
    fn all_flaws_in_check_order() {
        let frame = guard()
            .with(BodyPart::Nose, Landmark::at(0.3, 0.2))
            .with(BodyPart::LeftAnkle, Landmark::at(0.48, 0.95))
            .with(BodyPart::RightAnkle, Landmark::at(0.52, 0.95))
            .with(BodyPart::LeftWrist, Landmark::at(0.4, 0.6));
        assert_eq!(
            analyze(&frame, Handedness::Right).unwrap(),
            vec![
                Feedback::HeadOffCentre,
                Feedback::StanceTooNarrow,
                Feedback::LowBacklift,
            ]
        );
    }

    #[test]
    fn missing_nose() {
        let mut frame = guard();
        frame.remove(BodyPart::Nose);
        assert_eq!(
            analyze(&frame, Handedness::Right),
            Err(AnalysisError::MissingLandmark { part: BodyPart::Nose })
        );
    }
}
