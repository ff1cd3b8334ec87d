//! Classification of query failures.

use std::time::Duration;

use crate::error::ProbeError;
use crate::transport::{TransportError, TransportErrorKind};

/// A failure caught while running a query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryFailure {
    /// The query context exceeded the query timeout.
    Elapsed(Duration),
    /// The transport, or a reference resolver, reported an error.
    Transport(TransportError),
}

impl From<TransportError> for QueryFailure {
    fn from(err: TransportError) -> Self {
        Self::Transport(err)
    }
}

/// How a caller should treat a failed query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The class or namespace does not exist here; skip silently.
    Ignorable,
    /// The query did not finish in time.
    TimedOut,
    /// Anything else, with the message or the error kind's name.
    Failed(String),
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ignorable => write!(f, "class or namespace not available"),
            Self::TimedOut => write!(f, "query timed out"),
            Self::Failed(msg) => write!(f, "{msg}"),
        }
    }
}

impl From<Outcome> for ProbeError {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Ignorable => ProbeError::Ignored,
            Outcome::TimedOut => ProbeError::TimedOut,
            Outcome::Failed(msg) => ProbeError::Failed(msg),
        }
    }
}

/// Maps a caught failure onto an [`Outcome`].
pub fn classify(failure: &QueryFailure) -> Outcome {
    match failure {
        QueryFailure::Elapsed(_) => Outcome::TimedOut,
        QueryFailure::Transport(err) => match err.kind() {
            TransportErrorKind::InvalidClass | TransportErrorKind::InvalidNamespace => {
                Outcome::Ignorable
            }
            TransportErrorKind::Timeout => Outcome::TimedOut,
            _ => Outcome::Failed(err.describe()),
        },
    }
}
