//! Pose-estimation collaborator.
//!
//! The model itself lives outside this crate. [`SidecarEstimator`] talks to
//! one over a child process's stdin/stdout:
//!
//! ```text
//! → {"width":W,"height":H}\n  <W*H*3 bytes of RGB8, row-major>
//! ← {"landmarks":[{"x":..,"y":..,"z":..,"visibility":..}, ...]}\n
//! ← {"landmarks":null}\n                      (no person in frame)
//! ```

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::Mutex;

use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ServiceError;
use crate::landmark::{Landmark, PoseFrame};

/// Estimates body landmarks for one decoded frame.
///
/// `Ok(None)` means no person was detected; callers skip the frame rather
/// than treating it as an incomplete pose.
pub trait PoseEstimator: Send + Sync {
    fn estimate(&self, image: &RgbImage) -> Result<Option<PoseFrame>, ServiceError>;
}

#[derive(Serialize)]
struct FrameHeader {
    width: u32,
    height: u32,
}

#[derive(Deserialize)]
struct Reply {
    landmarks: Option<Vec<Landmark>>,
}

struct Pipes {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

/// Long-lived pose-model process shared by all sessions.
///
/// Requests are serialized through a mutex; the sidecar sees one frame at a
/// time.
pub struct SidecarEstimator {
    pipes: Mutex<Pipes>,
}

impl SidecarEstimator {
    const SERVICE: &'static str = "pose";

    /// Spawn the sidecar from an argv list.
    pub fn spawn(argv: &[String]) -> Result<Self, ServiceError> {
        let (program, args) = argv
            .split_first()
            .ok_or(ServiceError::Unavailable { service: Self::SERVICE })?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| ServiceError::io(Self::SERVICE, e))?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            return Err(ServiceError::Unavailable { service: Self::SERVICE });
        };
        debug!(program = %program, pid = child.id(), "pose sidecar started");

        Ok(Self {
            pipes: Mutex::new(Pipes {
                child,
                stdin,
                stdout: BufReader::new(stdout),
            }),
        })
    }
}

impl PoseEstimator for SidecarEstimator {
    fn estimate(&self, image: &RgbImage) -> Result<Option<PoseFrame>, ServiceError> {
        let io_err = |e| ServiceError::io(Self::SERVICE, e);
        let mut pipes = self
            .pipes
            .lock()
            .map_err(|_| ServiceError::Unavailable { service: Self::SERVICE })?;

        let header = serde_json::to_string(&FrameHeader {
            width: image.width(),
            height: image.height(),
        })
        .map_err(|e| ServiceError::malformed(Self::SERVICE, e.to_string()))?;

        pipes.stdin.write_all(header.as_bytes()).map_err(io_err)?;
        pipes.stdin.write_all(b"\n").map_err(io_err)?;
        pipes.stdin.write_all(image.as_raw()).map_err(io_err)?;
        pipes.stdin.flush().map_err(io_err)?;

        let mut line = String::new();
        let n = pipes.stdout.read_line(&mut line).map_err(io_err)?;
        if n == 0 {
            return Err(match pipes.child.try_wait() {
                Ok(Some(status)) => ServiceError::Exited {
                    service: Self::SERVICE,
                    status,
                    stderr: String::new(),
                },
                _ => ServiceError::Unavailable { service: Self::SERVICE },
            });
        }

        let reply: Reply = serde_json::from_str(line.trim_end())
            .map_err(|e| ServiceError::malformed(Self::SERVICE, e.to_string()))?;
        Ok(reply.landmarks.map(|lms| PoseFrame::from_landmarks(&lms)))
    }
}

impl Drop for SidecarEstimator {
    fn drop(&mut self) {
        let pipes = match self.pipes.get_mut() {
            Ok(p) => p,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = pipes.child.kill() {
            warn!(error = %e, "failed to stop pose sidecar");
        }
        let _ = pipes.child.wait();
    }
}
