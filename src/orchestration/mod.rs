//! # Orchestration
//!
//! Caller-side policy around the job lifecycle: how many jobs run at once,
//! when to poll, and how failed jobs are recovered.
//!
//! ## Core Components
//!
//! - **JobManager**: throttle-aware polling loop that starts jobs from a lazy
//!   source, polls them in batches, restarts or splits failed jobs and hands
//!   out completed ones

pub mod job_manager;

pub use job_manager::JobManager;
