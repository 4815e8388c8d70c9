use super::date;
use chrono::{Days, NaiveDate};
use insights_jobs::jobs::DateInterval;
use insights_jobs::state_machine::{JobEvent, JobStatus};
use proptest::prelude::*;
use proptest::strategy::Just;

/// Strategy for generating any job status
pub fn job_status_strategy() -> impl Strategy<Value = JobStatus> {
    prop_oneof![
        Just(JobStatus::NotStarted),
        Just(JobStatus::Started),
        Just(JobStatus::Running),
        Just(JobStatus::Completed),
        Just(JobStatus::Failed),
        Just(JobStatus::Skipped),
    ]
}

/// Strategy for generating lifecycle events
pub fn job_event_strategy() -> impl Strategy<Value = JobEvent> {
    prop_oneof![
        Just(JobEvent::Start),
        Just(JobEvent::Reset),
        job_status_strategy().prop_map(JobEvent::StatusObserved),
    ]
}

/// Strategy for generating dates within a few years
pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0u64..2000).prop_map(|offset| date(2018, 1, 1) + Days::new(offset))
}

/// Strategy for generating valid intervals of up to 90 days
pub fn date_interval_strategy() -> impl Strategy<Value = DateInterval> {
    (date_strategy(), 0u64..90).prop_map(|(start, length)| {
        DateInterval::new(start, start + Days::new(length)).expect("start precedes end")
    })
}

/// Strategy for generating (completed, failed) flags of group members.
/// A failed member is always completed.
pub fn member_flags_strategy() -> impl Strategy<Value = Vec<(bool, bool)>> {
    prop::collection::vec(
        prop_oneof![
            Just((false, false)),
            Just((true, false)),
            Just((true, true)),
        ],
        0..20,
    )
}
