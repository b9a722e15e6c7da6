//! Cricket batting form analysis from body-pose landmarks.
//!
//! The core (always built) is a pure rule engine: [`landmark`] frames in,
//! [`analysis::Feedback`] items out. With the `server` feature (default) the
//! crate adds a WebSocket coaching server that decodes video frames, runs a
//! pose model, and speaks one tip per frame back to the client.

pub mod analysis;
pub mod error;
pub mod geometry;
pub mod landmark;
pub mod select;

#[cfg(feature = "server")]
pub mod coach;
#[cfg(feature = "server")]
pub mod config;
#[cfg(feature = "server")]
pub mod conn;
#[cfg(feature = "server")]
pub mod decode;
#[cfg(feature = "server")]
pub mod pose;
#[cfg(feature = "server")]
pub mod protocol;
#[cfg(feature = "server")]
pub mod server;
#[cfg(feature = "server")]
pub mod session;

pub use analysis::{Feedback, Handedness, ShotType, analyze};
pub use error::{AnalysisError, ServiceError};
pub use geometry::Point2D;
pub use landmark::{BodyPart, Landmark, PoseFrame};
pub use select::{RepeatFilter, select};

#[cfg(feature = "server")]
pub use config::Config;
#[cfg(feature = "server")]
pub use conn::{Channel, ConnError, Connection};
#[cfg(feature = "server")]
pub use server::Server;
#[cfg(feature = "server")]
pub use session::{Session, SessionSettings};
