//! Per-probe failure taxonomy
//!
//! None of these errors is fatal to a run: the orchestrator turns every one of
//! them into an absent report entry plus a diagnostic log record.

use std::time::Duration;
use thiserror::Error;

/// Why a single probe (or one attempt of it) produced no value
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProbeError {
    /// One attempt failed; tolerated by the sample collector
    #[error("sample failed: {0}")]
    SampleFailure(String),

    /// Not enough successful samples to derive the statistic
    #[error("insufficient samples: need at least {required}, got {available}")]
    InsufficientSamples { required: usize, available: usize },

    /// A governed operation exceeded its budget
    #[error("timed out after {}ms", budget.as_millis())]
    TimedOut { budget: Duration },

    /// The network capability backing the probe is not usable
    #[error("collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),

    /// A background measurement task crashed
    #[error("measurement task panicked: {0}")]
    Panicked(String),
}

impl ProbeError {
    pub fn sample<S: Into<String>>(message: S) -> Self {
        Self::SampleFailure(message.into())
    }

    pub fn insufficient(required: usize, available: usize) -> Self {
        Self::InsufficientSamples { required, available }
    }

    pub fn timed_out(budget: Duration) -> Self {
        Self::TimedOut { budget }
    }

    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        Self::CollaboratorUnavailable(message.into())
    }

    /// Tag used in diagnostic log records
    pub fn category(&self) -> &'static str {
        match self {
            Self::SampleFailure(_) => "SAMPLE_FAILURE",
            Self::InsufficientSamples { .. } => "INSUFFICIENT_SAMPLES",
            Self::TimedOut { .. } => "TIMED_OUT",
            Self::CollaboratorUnavailable(_) => "COLLABORATOR_UNAVAILABLE",
            Self::Panicked(_) => "PANICKED",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }
}

impl From<std::io::Error> for ProbeError {
    fn from(error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => Self::unavailable(format!(
                "permission denied opening socket ({})",
                error
            )),
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => {
                Self::sample("no reply before deadline")
            }
            _ => Self::sample(error.to_string()),
        }
    }
}

/// Result alias for probe-level operations
pub type ProbeResult<T> = std::result::Result<T, ProbeError>;
