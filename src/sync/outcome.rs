//! Per-name outcome classification.

use std::fmt;

/// Why a name ended without an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// HTTP 401.
    Unauthorized,
    /// Any status other than 200, 401 and 429.
    HttpStatus(u16),
    /// Network failure, labelled by [`FetchError::kind`](super::FetchError::kind).
    Transport(&'static str),
    /// The artifact could not be checked for or written locally.
    Io,
    /// Every attempt was answered with 429.
    RateLimitExhausted,
}

/// Final classification of one name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Fetched and written.
    Ok,
    /// Artifact was already on disk.
    Skipped,
    /// Terminal failure.
    Failed(FailureKind),
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "error:401"),
            Self::HttpStatus(status) => write!(f, "error:{status}"),
            Self::Transport(kind) => write!(f, "error:{kind}"),
            Self::Io => write!(f, "error:io"),
            Self::RateLimitExhausted => write!(f, "error:rate_limit_exhausted"),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Skipped => write!(f, "skipped"),
            Self::Failed(kind) => kind.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_labels() {
        assert_eq!(Outcome::Ok.to_string(), "ok");
        assert_eq!(Outcome::Skipped.to_string(), "skipped");
        assert_eq!(
            Outcome::Failed(FailureKind::Unauthorized).to_string(),
            "error:401"
        );
        assert_eq!(
            Outcome::Failed(FailureKind::HttpStatus(503)).to_string(),
            "error:503"
        );
        assert_eq!(
            Outcome::Failed(FailureKind::Transport("timeout")).to_string(),
            "error:timeout"
        );
        assert_eq!(Outcome::Failed(FailureKind::Io).to_string(), "error:io");
        assert_eq!(
            Outcome::Failed(FailureKind::RateLimitExhausted).to_string(),
            "error:rate_limit_exhausted"
        );
    }
}
