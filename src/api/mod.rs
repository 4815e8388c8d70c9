//! # Insights API boundary
//!
//! Types exchanged with the remote insights service and the [`InsightsApi`]
//! trait the engine drives. Transport, authentication and pagination live
//! behind the trait; the engine only relies on the shapes defined here.

pub mod batch;

pub use batch::StatusBatch;

use crate::error::ApiError;
use crate::state_machine::JobStatus;
use async_trait::async_trait;
use chrono::NaiveDate;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// One result row of an insights report
pub type InsightRow = Map<String, Value>;

/// Lazy, paginated sequence of result rows
pub type RowStream = BoxStream<'static, Result<InsightRow, ApiError>>;

/// Granularity of an insights report and of the object it is scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportLevel {
    Account,
    Campaign,
    Adset,
    Ad,
}

impl ReportLevel {
    /// Name of the row field carrying the identifier at this level
    pub fn id_field(&self) -> &'static str {
        match self {
            Self::Account => "account_id",
            Self::Campaign => "campaign_id",
            Self::Adset => "adset_id",
            Self::Ad => "ad_id",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Campaign => "campaign",
            Self::Adset => "adset",
            Self::Ad => "ad",
        }
    }
}

impl fmt::Display for ReportLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The remote entity a report is scoped to (an account, a campaign, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeObject {
    pub level: ReportLevel,
    pub id: String,
}

impl EdgeObject {
    pub fn new(level: ReportLevel, id: impl Into<String>) -> Self {
        Self {
            level,
            id: id.into(),
        }
    }

    pub fn account(id: impl Into<String>) -> Self {
        Self::new(ReportLevel::Account, id)
    }

    pub fn campaign(id: impl Into<String>) -> Self {
        Self::new(ReportLevel::Campaign, id)
    }
}

impl fmt::Display for EdgeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.level, self.id)
    }
}

/// Closed reporting window sent with every report request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub since: NaiveDate,
    pub until: NaiveDate,
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} -> {}]", self.since, self.until)
    }
}

/// Report request parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportParams {
    pub level: ReportLevel,
    pub fields: Vec<String>,
    #[serde(default)]
    pub breakdowns: Vec<String>,
    #[serde(default)]
    pub action_breakdowns: Vec<String>,
    #[serde(default)]
    pub action_attribution_windows: Vec<String>,
    /// Days per row bucket; `None` aggregates the whole window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_increment: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
    /// Parameters the engine passes through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ReportParams {
    pub fn new<I, S>(level: ReportLevel, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            level,
            fields: fields.into_iter().map(Into::into).collect(),
            breakdowns: Vec::new(),
            action_breakdowns: Vec::new(),
            action_attribution_windows: Vec::new(),
            time_increment: None,
            time_range: None,
            extra: Map::new(),
        }
    }

    pub fn with_breakdowns<I, S>(mut self, breakdowns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.breakdowns = breakdowns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_time_increment(mut self, days: u32) -> Self {
        self.time_increment = Some(days);
        self
    }
}

/// Snapshot of a remote report run, replaced on every status response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRun {
    #[serde(alias = "id")]
    pub report_run_id: String,
    #[serde(default)]
    pub async_status: JobStatus,
    /// Diagnostic only
    #[serde(default)]
    pub async_percent_completion: f64,
    #[serde(default)]
    pub date_start: Option<NaiveDate>,
    #[serde(default)]
    pub date_stop: Option<NaiveDate>,
}

impl ReportRun {
    pub fn new(report_run_id: impl Into<String>, async_status: JobStatus) -> Self {
        Self {
            report_run_id: report_run_id.into(),
            async_status,
            async_percent_completion: 0.0,
            date_start: None,
            date_stop: None,
        }
    }
}

/// Current insights load reported by the remote side, in percent
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InsightsThrottle {
    pub per_application: f64,
    pub per_account: f64,
}

impl InsightsThrottle {
    /// The account throttle cools down very slowly after hitting 100, so the
    /// smaller of the two values is the usable estimate.
    pub fn current(&self) -> f64 {
        self.per_application.min(self.per_account)
    }
}

/// Remote insights service consumed by the job engine
#[async_trait]
pub trait InsightsApi: Send + Sync {
    /// Submit an asynchronous report and return its run handle
    async fn submit_report(
        &self,
        edge: &EdgeObject,
        params: &ReportParams,
    ) -> Result<ReportRun, ApiError>;

    /// Run a report synchronously and return its rows
    async fn query_insights(
        &self,
        edge: &EdgeObject,
        params: &ReportParams,
    ) -> Result<Vec<InsightRow>, ApiError>;

    /// Read the current status of a single report run
    async fn fetch_status(&self, report_run_id: &str) -> Result<ReportRun, ApiError>;

    /// Read the status of many report runs in one round trip.
    ///
    /// Returns one entry per requested id, in request order. Each entry is
    /// either the raw status document or the failure of that individual call.
    async fn fetch_status_batch(&self, report_run_ids: &[String]) -> Vec<Result<Value, ApiError>>;

    /// Stream the rows of a completed report run
    fn fetch_results(&self, run: &ReportRun, page_size: usize) -> RowStream;

    /// Refresh and return the current insights throttle
    async fn current_throttle(&self) -> Result<InsightsThrottle, ApiError>;
}
