use super::{events::JobEvent, states::JobStatus};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateMachineError {
    #[error("Invalid state transition from {from} on {event:?}")]
    InvalidTransition { from: JobStatus, event: JobEvent },
}

pub type StateMachineResult<T> = Result<T, StateMachineError>;

/// Transition table for a single report job.
///
/// The machine holds no state of its own; the job owns its current status and
/// asks the machine where an event leads.
#[derive(Debug, Clone, Copy, Default)]
pub struct JobStateMachine;

impl JobStateMachine {
    /// Resolve the state an event moves `current` into
    pub fn determine_target_state(
        current: JobStatus,
        event: JobEvent,
    ) -> StateMachineResult<JobStatus> {
        let target = match (current, event) {
            // Start transitions
            (JobStatus::NotStarted, JobEvent::Start) => JobStatus::Started,

            // Status observations while the remote side works on the job.
            // A remote "not started" means queued; the job stays where it is.
            (JobStatus::Started | JobStatus::Running, JobEvent::StatusObserved(observed)) => {
                match observed {
                    JobStatus::NotStarted => current,
                    other => other,
                }
            }

            // Only failed jobs may be reset for another attempt
            (JobStatus::Failed | JobStatus::Skipped, JobEvent::Reset) => JobStatus::NotStarted,

            (from, event) => return Err(StateMachineError::InvalidTransition { from, event }),
        };

        debug!(
            from = %current,
            event = event.event_type(),
            to = %target,
            "Job state transition resolved"
        );

        Ok(target)
    }

    /// Check whether an event is accepted in the given state
    pub fn can_transition(current: JobStatus, event: JobEvent) -> bool {
        Self::determine_target_state(current, event).is_ok()
    }
}
