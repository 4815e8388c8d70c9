//! # Batched status checks
//!
//! A [`StatusBatch`] collects status reads for many report runs and sends
//! them to the insights API as a single round trip. Every call carries its own
//! success and failure handler. Calls the transport reports as failed are
//! moved, handlers included, into the batch returned by
//! [`StatusBatch::execute`], so callers loop until nothing is left:
//!
//! ```rust,ignore
//! let mut batch = StatusBatch::new(api.clone());
//! job.update_job(Some(&mut batch)).await?;
//! while let Some(retry) = batch.execute().await {
//!     batch = retry;
//! }
//! ```

use super::InsightsApi;
use crate::error::ApiError;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Receives the raw status document of a successful call
pub type SuccessHandler = Box<dyn FnMut(Value) + Send>;

/// Receives the error of a failed call; the call is retried afterwards
pub type FailureHandler = Box<dyn FnMut(&ApiError) + Send>;

struct BatchCall {
    report_run_id: String,
    on_success: SuccessHandler,
    on_failure: FailureHandler,
}

/// One unit of grouped status calls, exclusively owned by the caller that
/// created it
pub struct StatusBatch {
    api: Arc<dyn InsightsApi>,
    calls: Vec<BatchCall>,
}

impl StatusBatch {
    pub fn new(api: Arc<dyn InsightsApi>) -> Self {
        Self {
            api,
            calls: Vec::new(),
        }
    }

    /// Queue a status read for `report_run_id`
    pub fn enqueue<S, F>(&mut self, report_run_id: impl Into<String>, on_success: S, on_failure: F)
    where
        S: FnMut(Value) + Send + 'static,
        F: FnMut(&ApiError) + Send + 'static,
    {
        self.calls.push(BatchCall {
            report_run_id: report_run_id.into(),
            on_success: Box::new(on_success),
            on_failure: Box::new(on_failure),
        });
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Send all queued calls in one round trip and dispatch the handlers.
    ///
    /// Returns `None` when nothing is pending, otherwise a new batch holding
    /// the calls that must be retried.
    pub async fn execute(self) -> Option<StatusBatch> {
        if self.calls.is_empty() {
            return None;
        }

        let report_run_ids: Vec<String> = self
            .calls
            .iter()
            .map(|call| call.report_run_id.clone())
            .collect();
        let responses = self.api.fetch_status_batch(&report_run_ids).await;

        let mut retry = StatusBatch::new(Arc::clone(&self.api));
        let mut responses = responses.into_iter();
        let total = self.calls.len();

        for mut call in self.calls {
            match responses.next() {
                Some(Ok(document)) => (call.on_success)(document),
                Some(Err(error)) => {
                    (call.on_failure)(&error);
                    retry.calls.push(call);
                }
                None => {
                    let error = ApiError::transport(format!(
                        "no response for batched call {}",
                        call.report_run_id
                    ));
                    (call.on_failure)(&error);
                    retry.calls.push(call);
                }
            }
        }

        debug!(
            calls = total,
            retries = retry.len(),
            "Status batch executed"
        );

        if retry.is_empty() {
            None
        } else {
            info!(retries = retry.len(), "Some batched calls failed, retrying");
            Some(retry)
        }
    }

    /// Execute until the transport reports no further calls to retry
    pub async fn drain(self) {
        let mut batch = self;
        while let Some(retry) = batch.execute().await {
            batch = retry;
        }
    }
}

impl fmt::Debug for StatusBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusBatch")
            .field(
                "report_run_ids",
                &self
                    .calls
                    .iter()
                    .map(|call| call.report_run_id.as_str())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
