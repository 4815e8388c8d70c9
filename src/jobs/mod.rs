//! # Async report jobs
//!
//! The [`AsyncJob`] contract shared by a single remote report
//! ([`ReportJob`]) and a fixed group of jobs polled as one ([`JobGroup`]).
//!
//! Callers start a job, call [`AsyncJob::update_job`] until
//! [`AsyncJob::completed`] reports true, then either consume
//! [`AsyncJob::get_result`] or recover a failed job with
//! [`AsyncJob::restart`] / [`AsyncJob::split_job`].

pub mod job_group;
pub mod report_job;
pub mod splitter;

pub use job_group::JobGroup;
pub use report_job::ReportJob;

use crate::api::{RowStream, StatusBatch, TimeRange};
use crate::error::{JobError, JobResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed date range a job reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateInterval {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateInterval {
    pub fn new(start: NaiveDate, end: NaiveDate) -> JobResult<Self> {
        if start > end {
            return Err(JobError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// Single-day interval
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Stable identifier of every job covering this interval
    pub fn key(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn time_range(&self) -> TimeRange {
        TimeRange {
            since: self.start,
            until: self.end,
        }
    }
}

impl fmt::Display for DateInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} -> {}]", self.start, self.end)
    }
}

/// Lifecycle contract of a remote asynchronous report job
#[async_trait]
pub trait AsyncJob: fmt::Display + Send + Sync {
    /// Reporting window of the job
    fn interval(&self) -> &DateInterval;

    /// Job identifier, the start of the interval. Survives restarts and splits.
    fn key(&self) -> String {
        self.interval().key()
    }

    /// Starts at 1 and grows with every restart
    fn attempt_number(&self) -> u32;

    /// Start remote execution. A job may be started once per attempt.
    async fn start(&mut self) -> JobResult<()>;

    /// Reset and start again a job that failed
    async fn restart(&mut self) -> JobResult<()>;

    /// True once a terminal status has been observed. Never hits the network.
    fn completed(&self) -> bool;

    /// True if the job ended failed or skipped
    fn failed(&self) -> bool;

    /// Refresh the job status.
    ///
    /// With a batch the status check is queued into it and applied when the
    /// batch executes; without one the check runs immediately.
    async fn update_job(&mut self, batch: Option<&mut StatusBatch>) -> JobResult<()>;

    /// Lazy sequence of result rows of a finished, non-failed job
    fn get_result(&self) -> JobResult<RowStream>;

    /// Replace this job with an equivalent job of finer granularity
    async fn split_job(&self) -> JobResult<Box<dyn AsyncJob>>;
}
