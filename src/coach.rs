//! Coaching text and speech collaborators.
//!
//! Both are traits so sessions can run against real services, the built-in
//! offline adapters below, or test stubs. Handles are shared across session
//! threads, hence the `Send + Sync` bounds.

use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::sync::Arc;

use crate::analysis::Feedback;
use crate::error::ServiceError;
use crate::pose::PoseEstimator;

/// Expanded coaching text and audio for one selected feedback item.
#[derive(Debug, Clone, PartialEq)]
pub struct CoachingMessage {
    pub source: Feedback,
    pub text: String,
    /// Encoded audio (e.g. MP3 or WAV). Empty when speech is disabled.
    pub audio: Vec<u8>,
}

/// Turns one feedback item into a longer, actionable coaching message.
pub trait CoachingText: Send + Sync {
    fn expand(&self, feedback: Feedback) -> Result<String, ServiceError>;
}

/// Turns text into encoded audio bytes.
pub trait SpeechSynth: Send + Sync {
    fn synthesize(&self, text: &str) -> Result<Vec<u8>, ServiceError>;
}

/// Prompt for generative coaching backends.
pub fn coaching_prompt(feedback: Feedback) -> String {
    format!(
        "You are a cricket coach. A batsman's form issue is: '{}'. Give a short, actionable tip.",
        feedback.message()
    )
}

/// Collaborator handles injected into every session.
#[derive(Clone)]
pub struct Services {
    /// `None` when no pose model is configured: image frames are skipped and
    /// only client-side landmarks are analyzed.
    pub pose: Option<Arc<dyn PoseEstimator>>,
    pub coach: Arc<dyn CoachingText>,
    pub speech: Arc<dyn SpeechSynth>,
}

impl Services {
    /// Offline defaults: scripted tips, no audio, no pose model.
    pub fn offline() -> Self {
        Self {
            pose: None,
            coach: Arc::new(ScriptedCoach),
            speech: Arc::new(NoSpeech),
        }
    }

    /// Run both collaborators for one selected item.
    pub fn coach(&self, feedback: Feedback) -> Result<CoachingMessage, ServiceError> {
        let text = self.coach.expand(feedback)?;
        let audio = self.speech.synthesize(&text)?;
        Ok(CoachingMessage { source: feedback, text, audio })
    }
}

// ---------------------------------------------------------------------------
// Built-in adapters
// ---------------------------------------------------------------------------

/// Fixed tip per feedback item. Deterministic and offline.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptedCoach;

impl CoachingText for ScriptedCoach {
    fn expand(&self, feedback: Feedback) -> Result<String, ServiceError> {
        let tip = match feedback {
            Feedback::HeadOffCentre => {
                "Line your nose up between your shoulders and keep your eyes level as the bowler runs in."
            }
            Feedback::StanceTooNarrow => {
                "Set your feet about shoulder-width apart so you can move forward or back quickly."
            }
            Feedback::StanceTooWide => {
                "Bring your feet in to roughly shoulder width; a huge base makes it hard to step into the ball."
            }
            Feedback::LowBacklift => {
                "Lift the bat early so your top hand is above your elbow before the ball is released."
            }
            Feedback::DroppedElbow => {
                "Point your front elbow at the ball and keep it high so the bat comes down straight."
            }
            Feedback::StraightFrontKnee => {
                "Bend that front knee and get your weight over it as you meet the ball."
            }
            Feedback::HeadNotOverKnee => {
                "Lean into the shot until your head is right above your front knee."
            }
            Feedback::DriveGood => "Lovely drive. Keep that high elbow and stable base.",
            Feedback::LimitedRotation => {
                "Turn your hips and shoulders hard towards square leg to power the pull."
            }
            Feedback::SwingNotLevel => {
                "Keep both hands at the same height so the bat travels flat through the line."
            }
            Feedback::PullGood => "Great pull. Full rotation and a flat bat path.",
        };
        Ok(tip.to_owned())
    }
}

/// Speech disabled: always returns empty audio.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSpeech;

impl SpeechSynth for NoSpeech {
    fn synthesize(&self, _text: &str) -> Result<Vec<u8>, ServiceError> {
        Ok(Vec::new())
    }
}

/// Run `program` with `input` on stdin and return its stdout.
fn run_filter(
    service: &'static str,
    program: &str,
    args: &[String],
    input: &[u8],
) -> Result<Vec<u8>, ServiceError> {
    let io_err = |e| ServiceError::io(service, e);

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(io_err)?;

    // Prompts and tips are far below the pipe buffer size, so writing the
    // whole input before reading cannot deadlock. A program that exits
    // without reading stdin is reported through its exit status below.
    if let Some(mut stdin) = child.stdin.take() {
        if let Err(e) = stdin.write_all(input) {
            if e.kind() != io::ErrorKind::BrokenPipe {
                return Err(io_err(e));
            }
        }
    }

    let output = child.wait_with_output().map_err(io_err)?;
    if !output.status.success() {
        return Err(ServiceError::Exited {
            service,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(output.stdout)
}

/// Coaching text from an external generative backend.
///
/// The program receives [`coaching_prompt`] on stdin and prints the tip on
/// stdout, e.g. a small script wrapping an LLM API.
#[derive(Debug, Clone)]
pub struct CommandCoach {
    program: String,
    args: Vec<String>,
}

impl CommandCoach {
    const SERVICE: &'static str = "coach";

    /// Build from an argv list. Returns `None` for an empty list.
    pub fn new(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self { program: program.clone(), args: args.to_vec() })
    }
}

impl CoachingText for CommandCoach {
    fn expand(&self, feedback: Feedback) -> Result<String, ServiceError> {
        let prompt = coaching_prompt(feedback);
        let stdout = run_filter(Self::SERVICE, &self.program, &self.args, prompt.as_bytes())?;
        let text = String::from_utf8(stdout)
            .map_err(|e| ServiceError::malformed(Self::SERVICE, e.to_string()))?;
        let tip = text.trim();
        if tip.is_empty() {
            return Err(ServiceError::malformed(Self::SERVICE, "empty reply"));
        }
        Ok(tip.to_owned())
    }
}

/// Speech via an external program: text on stdin, audio on stdout.
///
/// e.g. `["espeak", "--stdout"]` for WAV output.
#[derive(Debug, Clone)]
pub struct CommandSpeech {
    program: String,
    args: Vec<String>,
}

impl CommandSpeech {
    const SERVICE: &'static str = "speech";

    /// Build from an argv list. Returns `None` for an empty list.
    pub fn new(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self { program: program.clone(), args: args.to_vec() })
    }
}

impl SpeechSynth for CommandSpeech {
    fn synthesize(&self, text: &str) -> Result<Vec<u8>, ServiceError> {
        run_filter(Self::SERVICE, &self.program, &self.args, text.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Feedback; 11] = [
        Feedback::HeadOffCentre,
        Feedback::StanceTooNarrow,
        Feedback::StanceTooWide,
        Feedback::LowBacklift,
        Feedback::DroppedElbow,
        Feedback::StraightFrontKnee,
        Feedback::HeadNotOverKnee,
        Feedback::DriveGood,
        Feedback::LimitedRotation,
        Feedback::SwingNotLevel,
        Feedback::PullGood,
    ];

    #[test]
    fn prompt_quotes_feedback() {
        let prompt = coaching_prompt(Feedback::LowBacklift);
        assert!(prompt.contains("'Raise your hands for a proper backlift.'"));
        assert!(prompt.starts_with("You are a cricket coach."));
    }

    #[test]
    fn scripted_coach_covers_every_item() {
        for fb in ALL {
            let tip = ScriptedCoach.expand(fb).unwrap();
            assert!(!tip.is_empty());
            assert_ne!(tip, fb.message());
        }
    }

    #[test]
    fn offline_services() {
        let services = Services::offline();
        assert!(services.pose.is_none());
        let msg = services.coach(Feedback::StanceTooWide).unwrap();
        assert_eq!(msg.source, Feedback::StanceTooWide);
        assert!(msg.audio.is_empty());
    }

    #[test]
    fn command_speech_needs_a_program() {
        assert!(CommandSpeech::new(&[]).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn command_speech_pipes_text() {
        let speech = CommandSpeech::new(&["cat".to_owned()]).unwrap();
        assert_eq!(speech.synthesize("hands up").unwrap(), b"hands up");
    }

    #[cfg(unix)]
    #[test]
    fn command_speech_reports_failure() {
        let argv = ["sh", "-c", "cat >/dev/null; echo no voice >&2; exit 3"].map(String::from);
        let speech = CommandSpeech::new(&argv).unwrap();
        let err = speech.synthesize("x").unwrap_err();
        assert!(matches!(err, ServiceError::Exited { .. }));
        assert!(err.to_string().contains("no voice"), "{err}");
    }

    #[cfg(unix)]
    #[test]
    fn command_coach_receives_prompt() {
        // Echo back the quoted feedback so the prompt is visible in the tip.
        let argv = ["sh", "-c", "printf '  %s\n\n' \"$(cut -d\"'\" -f2)\""].map(String::from);
        let coach = CommandCoach::new(&argv).unwrap();
        assert_eq!(
            coach.expand(Feedback::LowBacklift).unwrap(),
            "Raise your hands for a proper backlift."
        );
    }

    #[cfg(unix)]
    #[test]
    fn command_coach_passes_whole_prompt() {
        let coach = CommandCoach::new(&["cat".to_owned()]).unwrap();
        assert_eq!(
            coach.expand(Feedback::PullGood).unwrap(),
            coaching_prompt(Feedback::PullGood)
        );
    }

    #[cfg(unix)]
    #[test]
    fn command_coach_rejects_blank_reply() {
        let argv = ["sh", "-c", "cat >/dev/null; echo"].map(String::from);
        let coach = CommandCoach::new(&argv).unwrap();
        assert!(matches!(
            coach.expand(Feedback::DriveGood),
            Err(ServiceError::Malformed { service: "coach", .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn command_coach_reports_failure() {
        let argv = ["sh", "-c", "cat >/dev/null; echo quota exceeded >&2; exit 1"].map(String::from);
        let err = CommandCoach::new(&argv).unwrap().expand(Feedback::DriveGood).unwrap_err();
        assert!(matches!(err, ServiceError::Exited { service: "coach", .. }));
        assert!(err.to_string().contains("quota exceeded"), "{err}");
    }

    #[test]
    fn command_coach_needs_a_program() {
        assert!(CommandCoach::new(&[]).is_none());
    }

    #[test]
    fn missing_program_is_io_error() {
        let speech = CommandSpeech::new(&["/nonexistent/batcoach-tts".to_owned()]).unwrap();
        assert!(matches!(speech.synthesize("x"), Err(ServiceError::Io { .. })));
    }
}
