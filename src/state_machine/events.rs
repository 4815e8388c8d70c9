use super::states::JobStatus;
use serde::{Deserialize, Serialize};

/// Events that can trigger report job state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum JobEvent {
    /// Submit the report to the remote side
    Start,
    /// A status document was received for the job
    StatusObserved(JobStatus),
    /// Reset a failed job before starting it again
    Reset,
}

impl JobEvent {
    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::StatusObserved(_) => "status_observed",
            Self::Reset => "reset",
        }
    }

    /// Check if this event represents a terminal transition
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::StatusObserved(status) if status.is_terminal())
    }
}
