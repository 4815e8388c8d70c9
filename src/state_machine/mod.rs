// State machine module for report job lifecycles
//
// Report jobs move NotStarted -> Started -> Running -> terminal, and only a
// failed job may be reset for another attempt.

pub mod events;
pub mod job_state_machine;
pub mod states;

// Re-export main types for convenient access
pub use events::JobEvent;
pub use job_state_machine::{JobStateMachine, StateMachineError, StateMachineResult};
pub use states::JobStatus;
