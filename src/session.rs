//! Per-client session loop.
//!
//! For every inbound message: decode → estimate pose → analyze → select →
//! coach → speak → send. Frames are handled strictly in arrival order and a
//! frame's coaching round-trip finishes before the next frame is read, so a
//! reply always belongs to the frame that produced it.
//!
//! Nothing that goes wrong with a single frame ends the session; only
//! transport errors do.

use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::analysis::{self, Feedback, Handedness, ShotType};
use crate::coach::{CoachingMessage, Services};
use crate::conn::{Channel, ConnError};
use crate::decode::{self, FrameError};
use crate::error::{AnalysisError, ServiceError};
use crate::landmark::PoseFrame;
use crate::protocol::{Inbound, Outbound, ProtocolError};
use crate::select::{self, RepeatFilter};

/// Starting values for a new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub shot: ShotType,
    pub handedness: Handedness,
    /// Repeat suppression window; zero disables it.
    pub repeat_cooldown: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            shot: ShotType::Stance,
            handedness: Handedness::Right,
            repeat_cooldown: Duration::from_secs(5),
        }
    }
}

/// Why a message produced no reply.
#[derive(Debug, Error)]
pub enum FrameSkip {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("image frame received but no pose estimator is configured")]
    NoEstimator,

    #[error("no person detected")]
    NoPerson,

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Result of handling one inbound message.
#[derive(Debug)]
pub enum Outcome {
    /// A coaching message to send back.
    Coached(CoachingMessage),
    /// Shot or handedness changed.
    Configured,
    /// Analyzed; nothing worth saying.
    Quiet,
    /// Same item as last time, still within the cooldown.
    Suppressed(Feedback),
    /// The message could not be processed.
    Skipped(FrameSkip),
}

/// Counters reported when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub messages: u64,
    pub sent: u64,
    pub quiet: u64,
    pub suppressed: u64,
    pub skipped: u64,
}

/// State for one connected client.
pub struct Session {
    services: Services,
    shot: ShotType,
    handedness: Handedness,
    repeats: RepeatFilter,
    stats: SessionStats,
}

impl Session {
    pub fn new(services: Services, settings: SessionSettings) -> Self {
        Self {
            services,
            shot: settings.shot,
            handedness: settings.handedness,
            repeats: RepeatFilter::new(settings.repeat_cooldown),
            stats: SessionStats::default(),
        }
    }

    pub fn shot(&self) -> ShotType {
        self.shot
    }

    pub fn handedness(&self) -> Handedness {
        self.handedness
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Drive the session until the client disconnects.
    ///
    /// A clean disconnect returns the session counters; any other transport
    /// error is returned as-is.
    pub fn run(&mut self, channel: &mut impl Channel) -> Result<SessionStats, ConnError> {
        loop {
            let text = match channel.recv() {
                Ok(text) => text,
                Err(ConnError::Disconnected) => return Ok(self.stats),
                Err(e) => return Err(e),
            };

            match self.handle(&text) {
                Outcome::Coached(msg) => {
                    info!(feedback = ?msg.source, text = %msg.text, audio_bytes = msg.audio.len(), "sending tip");
                    channel.send(&Outbound::audio_feedback(&msg))?;
                }
                Outcome::Configured => {
                    info!(shot = %self.shot, handedness = %self.handedness, "session reconfigured");
                }
                Outcome::Quiet => {}
                Outcome::Suppressed(fb) => debug!(feedback = ?fb, "repeat suppressed"),
                Outcome::Skipped(reason) => match reason {
                    FrameSkip::NoPerson | FrameSkip::Analysis(_) => {
                        debug!(reason = %reason, "frame skipped");
                    }
                    _ => warn!(reason = %reason, "frame skipped"),
                },
            }
        }
    }

    /// Process one inbound text message.
    pub fn handle(&mut self, text: &str) -> Outcome {
        self.stats.messages += 1;
        let outcome = match self.process(text) {
            Ok(outcome) => outcome,
            Err(skip) => Outcome::Skipped(skip),
        };
        match &outcome {
            Outcome::Coached(_) => self.stats.sent += 1,
            Outcome::Quiet => self.stats.quiet += 1,
            Outcome::Suppressed(_) => self.stats.suppressed += 1,
            Outcome::Skipped(_) => self.stats.skipped += 1,
            Outcome::Configured => {}
        }
        outcome
    }

    fn process(&mut self, text: &str) -> Result<Outcome, FrameSkip> {
        let frame = match Inbound::parse(text)? {
            Inbound::Configure { shot, handedness } => {
                self.shot = shot.unwrap_or(self.shot);
                self.handedness = handedness.unwrap_or(self.handedness);
                self.repeats.reset();
                return Ok(Outcome::Configured);
            }
            Inbound::Landmarks(lms) => PoseFrame::from_landmarks(&lms),
            Inbound::Image(url) => self.estimate(&url)?,
        };
        if frame.is_empty() {
            return Err(FrameSkip::NoPerson);
        }
        self.analyze(&frame)
    }

    fn estimate(&self, url: &str) -> Result<PoseFrame, FrameSkip> {
        let pose = self.services.pose.as_ref().ok_or(FrameSkip::NoEstimator)?;
        let image = decode::decode_data_url(url)?;
        pose.estimate(&image)?.ok_or(FrameSkip::NoPerson)
    }

    fn analyze(&mut self, frame: &PoseFrame) -> Result<Outcome, FrameSkip> {
        let feedback = analysis::analyze(self.shot, frame, self.handedness)?;
        let Some(selected) = select::select(&feedback) else {
            return Ok(Outcome::Quiet);
        };
        let now = Instant::now();
        if !self.repeats.would_admit_at(selected, now) {
            return Ok(Outcome::Suppressed(selected));
        }
        // Only a delivered tip starts the cooldown; a failed dispatch leaves
        // the next frame free to try again.
        let msg = self.services.coach(selected)?;
        self.repeats.record_at(selected, now);
        Ok(Outcome::Coached(msg))
    }
}
