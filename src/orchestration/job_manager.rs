//! # Job Manager
//!
//! Drives a lazy source of jobs to completion. New jobs are started while the
//! insights throttle is below the configured limit and the running queue has
//! room; running jobs are polled through one shared status batch per pass;
//! failed jobs are restarted, split on their second failure, and abandoned
//! once they reach the attempt ceiling.
//!
//! Completed jobs are handed out in the order they finish:
//!
//! ```rust,ignore
//! let mut manager = JobManager::new(api, jobs, config.manager.clone());
//! while let Some(completed) = manager.next_completed().await? {
//!     for job in completed {
//!         let rows = job.get_result()?;
//!         // ...
//!     }
//! }
//! ```

use crate::api::{InsightsApi, StatusBatch};
use crate::config::ManagerConfig;
use crate::constants;
use crate::error::{JobError, JobResult};
use crate::jobs::AsyncJob;
use crate::logging::log_job_operation;
use std::sync::Arc;
use tracing::{info, warn};

type JobSource = Box<dyn Iterator<Item = Box<dyn AsyncJob>> + Send>;

pub struct JobManager {
    api: Arc<dyn InsightsApi>,
    config: ManagerConfig,
    jobs: JobSource,
    running_jobs: Vec<Box<dyn AsyncJob>>,
    current_throttle: f64,
}

impl JobManager {
    pub fn new<I>(api: Arc<dyn InsightsApi>, jobs: I, config: ManagerConfig) -> Self
    where
        I: IntoIterator<Item = Box<dyn AsyncJob>>,
        I::IntoIter: Send + 'static,
    {
        Self {
            api,
            config,
            jobs: Box::new(jobs.into_iter()),
            running_jobs: Vec::new(),
            current_throttle: 0.0,
        }
    }

    /// Number of jobs currently started and not yet handed out
    pub fn running_jobs(&self) -> usize {
        self.running_jobs.len()
    }

    /// Last throttle value read from the API
    pub fn current_throttle(&self) -> f64 {
        self.current_throttle
    }

    /// Wait until at least one job completes and return every job that did.
    ///
    /// Returns `None` once the source is exhausted and no jobs are running.
    pub async fn next_completed(&mut self) -> JobResult<Option<Vec<Box<dyn AsyncJob>>>> {
        if self.running_jobs.is_empty() {
            self.start_jobs().await?;
        }
        if self.running_jobs.is_empty() {
            return Ok(None);
        }

        let mut completed_jobs = self.check_jobs_status_and_restart().await?;
        while completed_jobs.is_empty() {
            info!(
                "No jobs ready to be consumed, wait for {} seconds",
                self.config.status_poll_interval_seconds
            );
            tokio::time::sleep(self.config.status_poll_interval()).await;
            completed_jobs = self.check_jobs_status_and_restart().await?;
        }

        self.start_jobs().await?;
        Ok(Some(completed_jobs))
    }

    /// Enqueue new jobs while the throttle and the queue size allow it
    async fn start_jobs(&mut self) -> JobResult<()> {
        self.update_api_throttle_limit().await?;
        self.wait_throttle_limit_down().await?;

        let prev_jobs_count = self.running_jobs.len();
        while self.current_throttle < self.config.throttle_limit
            && self.running_jobs.len() < self.config.max_jobs_in_queue
        {
            let Some(mut job) = self.jobs.next() else {
                break;
            };
            job.start().await?;
            self.running_jobs.push(job);
        }

        info!(
            added = self.running_jobs.len() - prev_jobs_count,
            throttle = self.current_throttle,
            running = self.running_jobs.len(),
            max_jobs_in_queue = self.config.max_jobs_in_queue,
            "Added: {} jobs. Current throttle limit is {}, {}/{} job(s) in queue",
            self.running_jobs.len() - prev_jobs_count,
            self.current_throttle,
            self.running_jobs.len(),
            self.config.max_jobs_in_queue
        );
        Ok(())
    }

    /// Queue status checks of running jobs into one batch and drain it.
    /// Job groups poll through their own batches.
    async fn check_jobs_status(&mut self) -> JobResult<()> {
        let mut batch = StatusBatch::new(Arc::clone(&self.api));
        let mut result = Ok(());
        for job in self.running_jobs.iter_mut() {
            if batch.len() >= self.config.max_jobs_to_check {
                info!("Reached batch queue limit");
                break;
            }
            if let Err(error) = job.update_job(Some(&mut batch)).await {
                result = Err(error);
                break;
            }
        }
        // Checks already queued still run before the error surfaces
        batch.drain().await;
        result
    }

    /// Poll running jobs, hand back the completed ones and recover failed ones
    async fn check_jobs_status_and_restart(&mut self) -> JobResult<Vec<Box<dyn AsyncJob>>> {
        self.check_jobs_status().await?;
        self.wait_throttle_limit_down().await?;

        let mut completed_jobs = Vec::new();
        let mut running_jobs = Vec::with_capacity(self.running_jobs.len());
        let mut failed_num = 0;
        let mut pending = std::mem::take(&mut self.running_jobs).into_iter();

        while let Some(mut job) = pending.next() {
            if job.failed() {
                failed_num += 1;
                let recovered = self.recover_failed_job(&mut job).await;
                match recovered {
                    Ok(Some(group_job)) => running_jobs.push(group_job),
                    Ok(None) => running_jobs.push(job),
                    Err(error) => {
                        // Nothing of this pass is lost: every job stays queued
                        running_jobs.push(job);
                        running_jobs.extend(completed_jobs);
                        running_jobs.extend(pending);
                        self.running_jobs = running_jobs;
                        return Err(error);
                    }
                }
            } else if job.completed() {
                completed_jobs.push(job);
            } else {
                running_jobs.push(job);
            }
        }

        self.running_jobs = running_jobs;
        info!(
            completed = completed_jobs.len(),
            failed = failed_num,
            running = self.running_jobs.len(),
            "Completed jobs: {}, Failed jobs: {}, Running jobs: {}",
            completed_jobs.len(),
            failed_num,
            self.running_jobs.len()
        );

        Ok(completed_jobs)
    }

    /// Restart a failed job in place, or split it on its second failure.
    ///
    /// Returns the group replacing `job` when it was split.
    async fn recover_failed_job(
        &self,
        job: &mut Box<dyn AsyncJob>,
    ) -> JobResult<Option<Box<dyn AsyncJob>>> {
        let attempt = job.attempt_number();
        if attempt >= self.config.max_attempts {
            return Err(JobError::AttemptsExhausted {
                job: job.to_string(),
                attempts: attempt,
            });
        }

        if attempt == constants::splitter::SPLIT_ON_ATTEMPT {
            info!(
                job = %job,
                "{}: failed second time, trying to split job into smaller chunks",
                job
            );
            match job.split_job().await {
                Ok(mut group_job) => {
                    group_job.start().await?;
                    log_job_operation(
                        "split",
                        &group_job.to_string(),
                        attempt,
                        "started",
                        Some(&job.to_string()),
                    );
                    return Ok(Some(group_job));
                }
                Err(error) if error.is_unsupported() => {
                    warn!(job = %job, "{}: cannot be split further, restarting", job);
                }
                Err(error) => return Err(error),
            }
        } else {
            info!(job = %job, "{}: failed, restarting", job);
        }

        job.restart().await?;
        log_job_operation("restart", &job.to_string(), job.attempt_number(), "started", None);
        Ok(None)
    }

    async fn wait_throttle_limit_down(&mut self) -> JobResult<()> {
        while self.current_throttle > self.config.throttle_limit {
            info!(
                throttle = self.current_throttle,
                "Current throttle is {}, wait {} seconds",
                self.current_throttle,
                self.config.status_poll_interval_seconds
            );
            tokio::time::sleep(self.config.status_poll_interval()).await;
            self.update_api_throttle_limit().await?;
        }
        Ok(())
    }

    async fn update_api_throttle_limit(&mut self) -> JobResult<()> {
        self.current_throttle = self.api.current_throttle().await?.current();
        Ok(())
    }
}
