//! Mock job for group tests
//!
//! `MockJob` implements `AsyncJob` with scripted flags. Tests keep a
//! `MockJobHandle` to flip flags and read call counters after the job has
//! been moved into a group.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use insights_jobs::api::{RowStream, StatusBatch};
use insights_jobs::error::{ApiError, JobError, JobResult};
use insights_jobs::jobs::{AsyncJob, DateInterval};
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Default, Clone)]
pub struct MockJobState {
    pub attempt_number: u32,
    pub completed: bool,
    pub failed: bool,
    pub start_calls: usize,
    pub restart_calls: usize,
    /// One entry per update_job call: whether a batch was supplied
    pub update_calls: Vec<bool>,
    pub rows: Vec<i64>,
    /// Remaining restart calls that fail before touching the job
    pub restart_failures: usize,
    /// Remaining update_job calls that fail
    pub update_failures: usize,
}

#[derive(Clone)]
pub struct MockJobHandle(Arc<Mutex<MockJobState>>);

impl MockJobHandle {
    pub fn set_completed(&self, completed: bool) {
        self.0.lock().completed = completed;
    }

    pub fn set_failed(&self, failed: bool) {
        let mut state = self.0.lock();
        state.failed = failed;
        state.completed = state.completed || failed;
    }

    pub fn set_attempt_number(&self, attempt_number: u32) {
        self.0.lock().attempt_number = attempt_number;
    }

    pub fn set_rows(&self, rows: impl IntoIterator<Item = i64>) {
        self.0.lock().rows = rows.into_iter().collect();
    }

    pub fn fail_restart(&self, times: usize) {
        self.0.lock().restart_failures = times;
    }

    pub fn fail_update(&self, times: usize) {
        self.0.lock().update_failures = times;
    }

    pub fn snapshot(&self) -> MockJobState {
        self.0.lock().clone()
    }
}

pub struct MockJob {
    id: usize,
    interval: DateInterval,
    state: Arc<Mutex<MockJobState>>,
}

impl MockJob {
    pub fn new(id: usize, interval: DateInterval) -> (Self, MockJobHandle) {
        let state = Arc::new(Mutex::new(MockJobState {
            attempt_number: 1,
            ..Default::default()
        }));
        let handle = MockJobHandle(Arc::clone(&state));
        (
            Self {
                id,
                interval,
                state,
            },
            handle,
        )
    }

    /// `count` boxed mock jobs plus their handles
    pub fn many(count: usize, interval: DateInterval) -> (Vec<Box<dyn AsyncJob>>, Vec<MockJobHandle>) {
        (0..count)
            .map(|id| {
                let (job, handle) = MockJob::new(id, interval);
                (Box::new(job) as Box<dyn AsyncJob>, handle)
            })
            .unzip()
    }
}

#[async_trait]
impl AsyncJob for MockJob {
    fn interval(&self) -> &DateInterval {
        &self.interval
    }

    fn attempt_number(&self) -> u32 {
        self.state.lock().attempt_number
    }

    async fn start(&mut self) -> JobResult<()> {
        self.state.lock().start_calls += 1;
        Ok(())
    }

    async fn restart(&mut self) -> JobResult<()> {
        let mut state = self.state.lock();
        state.restart_calls += 1;
        if state.restart_failures > 0 {
            state.restart_failures -= 1;
            return Err(ApiError::transport("flaky submit").into());
        }
        state.attempt_number += 1;
        state.failed = false;
        state.completed = false;
        Ok(())
    }

    fn completed(&self) -> bool {
        self.state.lock().completed
    }

    fn failed(&self) -> bool {
        self.state.lock().failed
    }

    async fn update_job(&mut self, batch: Option<&mut StatusBatch>) -> JobResult<()> {
        let mut state = self.state.lock();
        state.update_calls.push(batch.is_some());
        if state.update_failures > 0 {
            state.update_failures -= 1;
            return Err(ApiError::transport("status read failed").into());
        }
        Ok(())
    }

    fn get_result(&self) -> JobResult<RowStream> {
        let state = self.state.lock();
        if state.failed {
            return Err(JobError::InvalidState {
                job: self.to_string(),
                operation: "get_result",
                reason: "the job is not started or failed".to_string(),
            });
        }
        let rows: Vec<Map<String, Value>> = state
            .rows
            .iter()
            .filter_map(|value| json!({ "value": value }).as_object().cloned())
            .collect();
        Ok(stream::iter(rows.into_iter().map(Ok)).boxed())
    }

    async fn split_job(&self) -> JobResult<Box<dyn AsyncJob>> {
        Err(JobError::UnsupportedOperation {
            job: self.to_string(),
            operation: "split_job",
        })
    }
}

impl fmt::Display for MockJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MockJob({})", self.id)
    }
}
