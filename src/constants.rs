//! # System Constants
//!
//! Operational boundaries of the insights job engine. These are the defaults
//! behind [`crate::config::InsightsJobsConfig`]; the remote API's own limits
//! are the reason most of them exist.

// Re-export state types for convenience
pub use crate::state_machine::JobStatus;

/// Remote API limits
pub mod api {
    /// Maximum number of calls the remote API accepts in one batch request
    pub const MAX_CALLS_PER_BATCH: usize = 50;

    /// Page size hint when fetching results of a finished report
    pub const RESULT_PAGE_SIZE: usize = 100;
}

/// Splitting of coarse jobs
pub mod splitter {
    /// Attribution look-back (days) added before the interval when probing
    /// for partition keys
    pub const ATTRIBUTION_WINDOW_DAYS: u32 = 28;

    /// The current day is always included on top of the attribution window
    pub const ATTRIBUTION_EXTRA_DAYS: u32 = 1;

    /// Attempt number at which a failing job is split instead of restarted
    pub const SPLIT_ON_ATTEMPT: u32 = 2;
}

/// Job manager polling policy
pub mod manager {
    /// No new jobs are started once the insights throttle reaches this value
    pub const THROTTLE_LIMIT: f64 = 70.0;

    pub const MAX_NUMBER_OF_ATTEMPTS: u32 = 5;

    /// Seconds to wait before checking job statuses again
    pub const JOB_STATUS_UPDATE_SLEEP_SECONDS: u64 = 30;

    /// Maximum number of concurrently running jobs
    pub const MAX_JOBS_IN_QUEUE: usize = 100;

    /// Maximum number of status checks per polling pass
    pub const MAX_JOBS_TO_CHECK: usize = 50;
}

/// Status groupings for lifecycle decisions
pub mod status_groups {
    use super::JobStatus;

    /// Statuses after which the job can only move through restart
    pub const TERMINAL_STATES: &[JobStatus] =
        &[JobStatus::Completed, JobStatus::Failed, JobStatus::Skipped];

    /// Statuses surfaced to callers as failed
    pub const FAILED_STATES: &[JobStatus] = &[JobStatus::Failed, JobStatus::Skipped];

    /// Statuses of a job the remote side is still working on
    pub const POLLABLE_STATES: &[JobStatus] = &[JobStatus::Started, JobStatus::Running];
}
