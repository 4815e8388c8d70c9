//! Mock Insights API for Testing
//!
//! Scripted implementation of `InsightsApi` that records every call so tests
//! can assert on network interaction without a remote service.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use insights_jobs::api::{
    EdgeObject, InsightRow, InsightsApi, InsightsThrottle, ReportParams, ReportRun, RowStream,
};
use insights_jobs::error::ApiError;
use insights_jobs::state_machine::JobStatus;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet, VecDeque};

/// Mock API state for tracking calls and simulating behavior
#[derive(Debug, Default)]
pub struct MockApiState {
    /// Submitted reports, in order
    pub submitted: Vec<(EdgeObject, ReportParams)>,
    /// Synchronous probe queries, in order
    pub probes: Vec<(EdgeObject, ReportParams)>,
    /// Immediate status reads
    pub status_calls: Vec<String>,
    /// Report run ids of every batched round trip
    pub batch_round_trips: Vec<Vec<String>>,
    /// Result fetches with their page size
    pub result_fetches: Vec<(String, usize)>,
    pub throttle_calls: usize,

    /// Status reported for runs without an explicit override
    pub default_status: JobStatus,
    pub run_statuses: HashMap<String, JobStatus>,
    /// Remaining transport failures per run id for batched calls
    pub transport_failures: HashMap<String, usize>,
    /// Runs whose batched status document cannot be parsed
    pub malformed_runs: HashSet<String>,
    pub probe_rows: Vec<InsightRow>,
    pub results: HashMap<String, Vec<InsightRow>>,
    /// Throttle values returned in sequence; the last one repeats
    pub throttles: VecDeque<InsightsThrottle>,
    next_run_id: u64,
}

pub struct MockInsightsApi {
    state: Mutex<MockApiState>,
}

impl MockInsightsApi {
    pub fn new() -> Self {
        let state = MockApiState {
            default_status: JobStatus::Running,
            ..Default::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn with_default_status(self, status: JobStatus) -> Self {
        self.state.lock().default_status = status;
        self
    }

    pub fn set_default_status(&self, status: JobStatus) {
        self.state.lock().default_status = status;
    }

    pub fn set_status(&self, report_run_id: &str, status: JobStatus) {
        self.state
            .lock()
            .run_statuses
            .insert(report_run_id.to_string(), status);
    }

    pub fn fail_transport(&self, report_run_id: &str, times: usize) {
        self.state
            .lock()
            .transport_failures
            .insert(report_run_id.to_string(), times);
    }

    pub fn set_malformed(&self, report_run_id: &str) {
        self.state
            .lock()
            .malformed_runs
            .insert(report_run_id.to_string());
    }

    pub fn set_probe_rows(&self, rows: Vec<Value>) {
        self.state.lock().probe_rows = rows
            .into_iter()
            .filter_map(|row| row.as_object().cloned())
            .collect();
    }

    pub fn set_results(&self, report_run_id: &str, rows: Vec<Value>) {
        self.state.lock().results.insert(
            report_run_id.to_string(),
            rows.into_iter()
                .filter_map(|row| row.as_object().cloned())
                .collect(),
        );
    }

    pub fn push_throttle(&self, per_application: f64, per_account: f64) {
        self.state.lock().throttles.push_back(InsightsThrottle {
            per_application,
            per_account,
        });
    }

    /// Inspect recorded calls
    pub fn with_state<R>(&self, f: impl FnOnce(&MockApiState) -> R) -> R {
        f(&self.state.lock())
    }

    pub fn submitted_count(&self) -> usize {
        self.state.lock().submitted.len()
    }

    pub fn status_call_count(&self) -> usize {
        self.state.lock().status_calls.len()
    }

    pub fn batch_round_trips(&self) -> Vec<Vec<String>> {
        self.state.lock().batch_round_trips.clone()
    }

    fn status_of(state: &MockApiState, report_run_id: &str) -> JobStatus {
        state
            .run_statuses
            .get(report_run_id)
            .copied()
            .unwrap_or(state.default_status)
    }

    fn status_document(report_run_id: &str, status: JobStatus) -> Value {
        let percent = if status == JobStatus::Completed { 100 } else { 0 };
        json!({
            "id": report_run_id,
            "account_id": "212551616838260",
            "async_status": status.as_str(),
            "async_percent_completion": percent,
        })
    }
}

#[async_trait]
impl InsightsApi for MockInsightsApi {
    async fn submit_report(
        &self,
        edge: &EdgeObject,
        params: &ReportParams,
    ) -> Result<ReportRun, ApiError> {
        let mut state = self.state.lock();
        state.next_run_id += 1;
        let report_run_id = format!("run-{}", state.next_run_id);
        state.submitted.push((edge.clone(), params.clone()));
        Ok(ReportRun::new(report_run_id, JobStatus::Started))
    }

    async fn query_insights(
        &self,
        edge: &EdgeObject,
        params: &ReportParams,
    ) -> Result<Vec<InsightRow>, ApiError> {
        let mut state = self.state.lock();
        state.probes.push((edge.clone(), params.clone()));
        Ok(state.probe_rows.clone())
    }

    async fn fetch_status(&self, report_run_id: &str) -> Result<ReportRun, ApiError> {
        let mut state = self.state.lock();
        state.status_calls.push(report_run_id.to_string());
        let status = Self::status_of(&state, report_run_id);
        let document = Self::status_document(report_run_id, status);
        Ok(serde_json::from_value(document)?)
    }

    async fn fetch_status_batch(&self, report_run_ids: &[String]) -> Vec<Result<Value, ApiError>> {
        let mut state = self.state.lock();
        state.batch_round_trips.push(report_run_ids.to_vec());

        report_run_ids
            .iter()
            .map(|report_run_id| {
                if let Some(remaining) = state.transport_failures.get_mut(report_run_id) {
                    if *remaining > 0 {
                        *remaining -= 1;
                        return Err(ApiError::transport("connection reset by peer"));
                    }
                }
                if state.malformed_runs.contains(report_run_id) {
                    return Ok(json!({"error": "unexpected document"}));
                }
                let status = Self::status_of(&state, report_run_id);
                Ok(Self::status_document(report_run_id, status))
            })
            .collect()
    }

    fn fetch_results(&self, run: &ReportRun, page_size: usize) -> RowStream {
        let mut state = self.state.lock();
        state
            .result_fetches
            .push((run.report_run_id.clone(), page_size));
        let rows = state
            .results
            .get(&run.report_run_id)
            .cloned()
            .unwrap_or_default();
        stream::iter(rows.into_iter().map(Ok)).boxed()
    }

    async fn current_throttle(&self) -> Result<InsightsThrottle, ApiError> {
        let mut state = self.state.lock();
        state.throttle_calls += 1;
        let throttle = if state.throttles.len() > 1 {
            state.throttles.pop_front().unwrap_or_default()
        } else {
            state.throttles.front().copied().unwrap_or_default()
        };
        Ok(throttle)
    }
}
