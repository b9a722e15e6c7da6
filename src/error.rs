use thiserror::Error;

use crate::landmark::BodyPart;

/// Errors arising from running a shot analyzer over one pose frame.
///
/// Geometry itself never fails: coincident points are well defined, so the
/// only way an analysis can go wrong is an incomplete frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("missing landmark: {part} (index {})", part.as_index())]
    MissingLandmark { part: BodyPart },
}

/// Failure reported by an external collaborator (pose model, coaching text,
/// speech synthesis).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{service} i/o error: {source}")]
    Io {
        service: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{service} exited with {status}{}", format_stderr_suffix(stderr))]
    Exited {
        service: &'static str,
        status: std::process::ExitStatus,
        /// Captured stderr, for log context.
        stderr: String,
    },

    #[error("{service} returned malformed output: {detail}")]
    Malformed { service: &'static str, detail: String },

    #[error("{service} is unavailable")]
    Unavailable { service: &'static str },
}

// Only the process-backed adapters construct these.
#[cfg(feature = "server")]
impl ServiceError {
    pub(crate) fn io(service: &'static str, source: std::io::Error) -> Self {
        Self::Io { service, source }
    }

    pub(crate) fn malformed(service: &'static str, detail: impl Into<String>) -> Self {
        Self::Malformed { service, detail: detail.into() }
    }
}

/// Format captured stderr as a suffix like " | espeak: not found" (empty if none).
fn format_stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let limit = 120;
    let head: String = trimmed.chars().take(limit).collect();
    let ellipsis = if trimmed.chars().count() > limit { "..." } else { "" };
    format!(" | {head}{ellipsis}")
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_landmark_names_part() {
        let err = AnalysisError::MissingLandmark { part: BodyPart::Nose };
        assert_eq!(err.to_string(), "missing landmark: nose (index 0)");
    }

    #[cfg(feature = "server")]
    #[test]
    fn service_error_constructors() {
        let err = ServiceError::malformed("pose", "bad json");
        assert!(matches!(err, ServiceError::Malformed { service: "pose", .. }));
        assert_eq!(err.to_string(), "pose returned malformed output: bad json");

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        assert!(matches!(ServiceError::io("speech", io), ServiceError::Io { service: "speech", .. }));
    }

    #[test]
    fn stderr_suffix_truncates() {
        assert_eq!(format_stderr_suffix("  "), "");
        assert_eq!(format_stderr_suffix("boom\n"), " | boom");
        let long = "x".repeat(200);
        let suffix = format_stderr_suffix(&long);
        assert!(suffix.ends_with("..."));
        assert_eq!(suffix.len(), " | ".len() + 120 + 3);
    }
}
