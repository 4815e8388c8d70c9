use crate::config::ConfigurationError;
use thiserror::Error;

/// Failures reported by the remote insights API boundary.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed with status {status}: {message}")]
    Request { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Create a transport-level error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}

/// Errors raised by the job lifecycle engine
#[derive(Error, Debug)]
pub enum JobError {
    /// The caller did not respect the job state machine
    #[error("{job}: Incorrect usage of {operation} - {reason}")]
    InvalidState {
        job: String,
        operation: &'static str,
        reason: String,
    },

    #[error("{job}: {operation} is not supported")]
    UnsupportedOperation {
        job: String,
        operation: &'static str,
    },

    #[error("Invalid interval: start {start} is after end {end}")]
    InvalidInterval {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("{job}: failed {attempts} times. Terminating...")]
    AttemptsExhausted { job: String, attempts: u32 },

    #[error("Insights API error: {0}")]
    Api(#[from] ApiError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl JobError {
    pub(crate) fn invalid_state(
        job: impl ToString,
        operation: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidState {
            job: job.to_string(),
            operation,
            reason: reason.into(),
        }
    }

    /// True for caller misuse of the lifecycle contract
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedOperation { .. })
    }
}

pub type JobResult<T> = std::result::Result<T, JobError>;
