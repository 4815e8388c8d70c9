//! # Report job
//!
//! A single remote insights report wrapped with local lifecycle tracking.
//! The mutable part of the job lives behind a shared lock so that batched
//! status callbacks can update it when the batch executes.

use super::{splitter, AsyncJob, DateInterval};
use crate::api::{EdgeObject, InsightsApi, ReportParams, ReportRun, RowStream, StatusBatch};
use crate::config::InsightsJobsConfig;
use crate::error::{JobError, JobResult};
use crate::state_machine::{JobEvent, JobStateMachine, JobStatus};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Default)]
struct ReportJobState {
    status: JobStatus,
    report_run: Option<ReportRun>,
    start_time: Option<DateTime<Utc>>,
    /// Locally observed completion time: when a status check first saw a
    /// terminal status, not when the remote side finished.
    finish_time: Option<DateTime<Utc>>,
    failed: bool,
}

/// Async job backed by one remote report run
pub struct ReportJob {
    api: Arc<dyn InsightsApi>,
    config: Arc<InsightsJobsConfig>,
    interval: DateInterval,
    edge_object: EdgeObject,
    params: ReportParams,
    attempt_number: u32,
    state: Arc<Mutex<ReportJobState>>,
}

impl ReportJob {
    /// Create a job for `edge_object` over `interval`.
    ///
    /// The params' `time_range` is always derived from the interval.
    pub fn new(
        api: Arc<dyn InsightsApi>,
        edge_object: EdgeObject,
        params: ReportParams,
        interval: DateInterval,
    ) -> Self {
        let mut params = params;
        params.time_range = Some(interval.time_range());

        Self {
            api,
            config: Arc::new(InsightsJobsConfig::default()),
            interval,
            edge_object,
            params,
            attempt_number: 1,
            state: Arc::new(Mutex::new(ReportJobState::default())),
        }
    }

    pub fn with_config(mut self, config: Arc<InsightsJobsConfig>) -> Self {
        self.config = config;
        self
    }

    pub fn edge_object(&self) -> &EdgeObject {
        &self.edge_object
    }

    pub fn params(&self) -> &ReportParams {
        &self.params
    }

    pub(crate) fn api(&self) -> &Arc<dyn InsightsApi> {
        &self.api
    }

    pub(crate) fn config(&self) -> &Arc<InsightsJobsConfig> {
        &self.config
    }

    /// Current lifecycle state
    pub fn status(&self) -> JobStatus {
        self.state.lock().status
    }

    /// Latest snapshot of the remote report run
    pub fn report_run(&self) -> Option<ReportRun> {
        self.state.lock().report_run.clone()
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.state.lock().start_time
    }

    pub fn finish_time(&self) -> Option<DateTime<Utc>> {
        self.state.lock().finish_time
    }

    /// Elapsed time since the job start, frozen once the job finished
    pub fn elapsed_time(&self) -> Option<Duration> {
        let state = self.state.lock();
        let start_time = state.start_time?;
        let end_time = state.finish_time.unwrap_or_else(Utc::now);
        Some(end_time - start_time)
    }

    fn enqueue_status_check(&self, batch: &mut StatusBatch, report_run_id: String) {
        let success_state = Arc::clone(&self.state);
        let success_label = self.to_string();
        let failure_label = success_label.clone();

        batch.enqueue(
            report_run_id,
            move |document| match serde_json::from_value::<ReportRun>(document) {
                Ok(run) => {
                    apply_status(&success_state, run, &success_label);
                }
                Err(error) => {
                    warn!(
                        job = %success_label,
                        error = %error,
                        "Unparseable status response, keeping previous state"
                    );
                }
            },
            move |error| {
                info!(
                    job = %failure_label,
                    error = %error,
                    "Request failed with response"
                );
            },
        );
    }
}

/// Store a fresh report run snapshot and detect terminal statuses.
///
/// Returns true if the job is finished.
fn apply_status(state: &Mutex<ReportJobState>, run: ReportRun, job: &str) -> bool {
    let mut state = state.lock();
    if state.finish_time.is_some() {
        return true;
    }

    let observed = run.async_status;
    info!(
        job = %job,
        percent = run.async_percent_completion,
        status = %observed,
        "{job} is {}% complete ({observed})",
        run.async_percent_completion
    );
    state.report_run = Some(run);

    let target = match JobStateMachine::determine_target_state(
        state.status,
        JobEvent::StatusObserved(observed),
    ) {
        Ok(target) => target,
        Err(error) => {
            warn!(job = %job, error = %error, "Ignoring status update");
            return false;
        }
    };
    state.status = target;

    if target == JobStatus::Completed {
        state.finish_time = Some(Utc::now());
        return true;
    }

    if target.is_failure() {
        let now = Utc::now();
        state.finish_time = Some(now);
        state.failed = true;
        let elapsed = state
            .start_time
            .map(|start| (now - start).num_seconds())
            .unwrap_or_default();
        info!(
            job = %job,
            status = %target,
            elapsed_seconds = elapsed,
            "{job} has status {target} after {elapsed} seconds."
        );
        return true;
    }

    false
}

#[async_trait]
impl AsyncJob for ReportJob {
    fn interval(&self) -> &DateInterval {
        &self.interval
    }

    fn attempt_number(&self) -> u32 {
        self.attempt_number
    }

    async fn start(&mut self) -> JobResult<()> {
        let current = {
            let state = self.state.lock();
            if state.report_run.is_some() {
                None
            } else {
                Some(state.status)
            }
        };
        let Some(current) = current.filter(|status| {
            JobStateMachine::can_transition(*status, JobEvent::Start)
        }) else {
            return Err(JobError::invalid_state(
                &*self,
                "start",
                "the job already started, use restart instead",
            ));
        };

        let run = self
            .api
            .submit_report(&self.edge_object, &self.params)
            .await?;
        let report_run_id = run.report_run_id.clone();

        {
            let mut state = self.state.lock();
            state.status = JobStateMachine::determine_target_state(current, JobEvent::Start)
                .map_err(|e| JobError::invalid_state(&report_run_id, "start", e.to_string()))?;
            state.report_run = Some(run);
            state.start_time = Some(Utc::now());
        }

        info!(
            job_id = %report_run_id,
            time_range = %self.interval,
            breakdowns = ?self.params.breakdowns,
            edge_object = %self.edge_object,
            attempt = self.attempt_number,
            "Created report run {report_run_id} to sync insights {} for {}",
            self.interval,
            self.edge_object
        );
        Ok(())
    }

    async fn restart(&mut self) -> JobResult<()> {
        let reset = {
            let state = self.state.lock();
            if state.report_run.is_some() && state.failed {
                JobStateMachine::determine_target_state(state.status, JobEvent::Reset).ok()
            } else {
                None
            }
        };
        let Some(reset) = reset else {
            return Err(JobError::invalid_state(
                &*self,
                "restart",
                "only failed jobs can be restarted",
            ));
        };

        *self.state.lock() = ReportJobState {
            status: reset,
            ..ReportJobState::default()
        };
        self.attempt_number += 1;

        self.start().await?;
        info!(job = %self, attempt = self.attempt_number, "{}: restarted", self);
        Ok(())
    }

    fn completed(&self) -> bool {
        self.state.lock().finish_time.is_some()
    }

    fn failed(&self) -> bool {
        self.state.lock().failed
    }

    async fn update_job(&mut self, batch: Option<&mut StatusBatch>) -> JobResult<()> {
        let report_run_id = {
            let state = self.state.lock();
            match (&state.report_run, state.finish_time) {
                (None, _) => None,
                (Some(run), Some(_)) => {
                    // Completion is terminal, no need to ask again
                    info!(
                        percent = run.async_percent_completion,
                        status = %run.async_status,
                        "Report run {} is already finished",
                        run.report_run_id
                    );
                    return Ok(());
                }
                (Some(run), None) => Some(run.report_run_id.clone()),
            }
        };
        let Some(report_run_id) = report_run_id else {
            return Err(JobError::invalid_state(
                &*self,
                "update_job",
                "the job is not started",
            ));
        };

        match batch {
            Some(batch) => self.enqueue_status_check(batch, report_run_id),
            None => {
                let run = self.api.fetch_status(&report_run_id).await?;
                let label = self.to_string();
                apply_status(&self.state, run, &label);
            }
        }
        Ok(())
    }

    fn get_result(&self) -> JobResult<RowStream> {
        let run = {
            let state = self.state.lock();
            if state.failed {
                None
            } else {
                state.report_run.clone()
            }
        };
        match run {
            Some(run) => Ok(self.api.fetch_results(&run, self.config.results.page_size)),
            None => Err(JobError::invalid_state(
                self,
                "get_result",
                "the job is not started or failed",
            )),
        }
    }

    async fn split_job(&self) -> JobResult<Box<dyn AsyncJob>> {
        let group = splitter::split_report_job(self).await?;
        Ok(Box::new(group))
    }
}

impl fmt::Display for ReportJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let job_id = self
            .state
            .lock()
            .report_run
            .as_ref()
            .map(|run| run.report_run_id.clone())
            .unwrap_or_else(|| "<None>".to_string());
        write!(
            f,
            "ReportJob(id={job_id}, {}, time_range={}, breakdowns={:?})",
            self.edge_object, self.interval, self.params.breakdowns
        )
    }
}

impl fmt::Debug for ReportJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportJob")
            .field("interval", &self.interval)
            .field("edge_object", &self.edge_object)
            .field("attempt_number", &self.attempt_number)
            .field("state", &*self.state.lock())
            .finish()
    }
}
