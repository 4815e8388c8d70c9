#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Insights Jobs
//!
//! Lifecycle engine for long-running asynchronous report jobs against an
//! insights API that does not answer report requests synchronously.
//!
//! ## Overview
//!
//! A caller submits a report for a time interval, polls until the remote side
//! reports completion, failure or skip, then streams the paginated results.
//! The engine owns:
//!
//! - the job contract ([`jobs::AsyncJob`]) and its state machine
//! - batched status polling ([`api::StatusBatch`])
//! - group semantics for collections of jobs ([`jobs::JobGroup`])
//! - adaptive splitting of jobs too expensive for the remote side
//!   ([`jobs::splitter`])
//! - a throttle-aware manager driving many jobs ([`orchestration::JobManager`])
//!
//! Transport, authentication and result pagination live behind the
//! [`api::InsightsApi`] trait.
//!
//! ## Module Organization
//!
//! - [`api`] - Remote API boundary and batched status checks
//! - [`jobs`] - Report jobs, job groups and splitting
//! - [`state_machine`] - Job lifecycle states and transitions
//! - [`orchestration`] - Polling, retry and throttling policy
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use insights_jobs::api::{EdgeObject, InsightsApi, ReportLevel, ReportParams};
//! use insights_jobs::jobs::{AsyncJob, DateInterval, ReportJob};
//! use chrono::NaiveDate;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example(api: Arc<dyn InsightsApi>) -> Result<(), Box<dyn std::error::Error>> {
//! let interval = DateInterval::new(
//!     NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2021, 1, 7).unwrap(),
//! )?;
//! let params = ReportParams::new(ReportLevel::Ad, ["impressions", "spend"]);
//! let mut job = ReportJob::new(api, EdgeObject::account("act_1"), params, interval);
//!
//! job.start().await?;
//! while !job.completed() {
//!     tokio::time::sleep(Duration::from_secs(30)).await;
//!     job.update_job(None).await?;
//! }
//! let rows = job.get_result()?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod jobs;
pub mod logging;
pub mod orchestration;
pub mod state_machine;

pub use api::{EdgeObject, InsightsApi, ReportLevel, ReportParams, ReportRun, StatusBatch};
pub use crate::config::{ConfigLoader, InsightsJobsConfig};
pub use error::{ApiError, JobError, JobResult};
pub use jobs::{AsyncJob, DateInterval, JobGroup, ReportJob};
pub use orchestration::JobManager;
pub use state_machine::JobStatus;
