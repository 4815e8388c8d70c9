//! # Job group
//!
//! A fixed, ordered group of jobs exposed as one logical job. The group has no
//! remote handle of its own: its completion and failure are aggregates over
//! its members, and its status checks fan out through [`StatusBatch`]es.

use super::{AsyncJob, DateInterval, ReportJob};
use crate::api::{InsightsApi, RowStream, StatusBatch};
use crate::config::InsightsJobsConfig;
use crate::error::{JobError, JobResult};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

pub struct JobGroup {
    api: Arc<dyn InsightsApi>,
    config: Arc<InsightsJobsConfig>,
    interval: DateInterval,
    jobs: Vec<Box<dyn AsyncJob>>,
    attempt_number: u32,
}

impl JobGroup {
    pub fn new(
        api: Arc<dyn InsightsApi>,
        interval: DateInterval,
        jobs: Vec<Box<dyn AsyncJob>>,
    ) -> Self {
        Self {
            api,
            config: Arc::new(InsightsJobsConfig::default()),
            interval,
            jobs,
            attempt_number: 1,
        }
    }

    pub fn from_report_jobs(
        api: Arc<dyn InsightsApi>,
        interval: DateInterval,
        jobs: Vec<ReportJob>,
    ) -> Self {
        let jobs = jobs
            .into_iter()
            .map(|job| Box::new(job) as Box<dyn AsyncJob>)
            .collect();
        Self::new(api, interval, jobs)
    }

    pub fn with_config(mut self, config: Arc<InsightsJobsConfig>) -> Self {
        self.config = config;
        self
    }

    /// Members in group order
    pub fn jobs(&self) -> &[Box<dyn AsyncJob>] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[async_trait]
impl AsyncJob for JobGroup {
    fn interval(&self) -> &DateInterval {
        &self.interval
    }

    fn attempt_number(&self) -> u32 {
        self.attempt_number
    }

    async fn start(&mut self) -> JobResult<()> {
        for job in self.jobs.iter_mut() {
            job.start().await?;
        }
        Ok(())
    }

    /// Restart failed members only; members that succeeded are left alone
    async fn restart(&mut self) -> JobResult<()> {
        if !self.failed() {
            return Err(JobError::invalid_state(
                &*self,
                "restart",
                "only failed jobs can be restarted",
            ));
        }

        for job in self.jobs.iter_mut() {
            if job.failed() {
                job.restart().await?;
            }
            self.attempt_number = self.attempt_number.max(job.attempt_number());
        }

        info!(job = %self, attempt = self.attempt_number, "{}: restarted failed jobs", self);
        Ok(())
    }

    fn completed(&self) -> bool {
        self.jobs.iter().all(|job| job.completed())
    }

    fn failed(&self) -> bool {
        self.jobs.iter().any(|job| job.failed())
    }

    /// Check every unfinished member once.
    ///
    /// Members are chunked to the API's per-request call ceiling; each chunk
    /// gets a fresh batch that is drained before the next chunk starts. A
    /// caller-supplied batch is not used, the group always polls through its
    /// own.
    async fn update_job(&mut self, _batch: Option<&mut StatusBatch>) -> JobResult<()> {
        let chunk_size = self.config.batch.max_calls_per_batch.max(1);
        let mut unfinished: Vec<&mut Box<dyn AsyncJob>> = self
            .jobs
            .iter_mut()
            .filter(|job| !job.completed())
            .collect();

        debug!(
            group = %self.interval,
            unfinished = unfinished.len(),
            chunk_size,
            "Checking status of unfinished jobs"
        );

        for chunk in unfinished.chunks_mut(chunk_size) {
            let mut batch = StatusBatch::new(Arc::clone(&self.api));
            let mut result = Ok(());
            for job in chunk.iter_mut() {
                if let Err(error) = job.update_job(Some(&mut batch)).await {
                    result = Err(error);
                    break;
                }
            }
            // Checks already queued still run before the error surfaces
            batch.drain().await;
            result?;
        }

        Ok(())
    }

    /// Member results concatenated in group order
    fn get_result(&self) -> JobResult<RowStream> {
        let streams = self
            .jobs
            .iter()
            .map(|job| job.get_result())
            .collect::<JobResult<Vec<_>>>()?;
        Ok(stream::iter(streams).flatten().boxed())
    }

    async fn split_job(&self) -> JobResult<Box<dyn AsyncJob>> {
        Err(JobError::UnsupportedOperation {
            job: self.to_string(),
            operation: "split_job",
        })
    }
}

impl fmt::Display for JobGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "JobGroup(key={}, interval={}, jobs={})",
            self.interval.key(),
            self.interval,
            self.jobs.len()
        )
    }
}
