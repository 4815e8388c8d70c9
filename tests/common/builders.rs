//! Test data builders for report jobs

use super::MockInsightsApi;
use chrono::NaiveDate;
use insights_jobs::api::{EdgeObject, InsightsApi, ReportLevel, ReportParams};
use insights_jobs::config::InsightsJobsConfig;
use insights_jobs::jobs::{DateInterval, ReportJob};
use std::sync::Arc;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

pub fn interval(start: NaiveDate, end: NaiveDate) -> DateInterval {
    DateInterval::new(start, end).expect("valid test interval")
}

/// Params of a typical ad-level daily insights report
pub fn ad_params() -> ReportParams {
    ReportParams::new(ReportLevel::Ad, ["field1", "field2"]).with_time_increment(1)
}

/// Builder pattern for creating test ReportJobs against a mock API
pub struct ReportJobBuilder {
    api: Arc<MockInsightsApi>,
    edge_object: EdgeObject,
    params: ReportParams,
    interval: DateInterval,
    config: Option<InsightsJobsConfig>,
}

impl ReportJobBuilder {
    pub fn new(api: &Arc<MockInsightsApi>) -> Self {
        Self {
            api: Arc::clone(api),
            edge_object: EdgeObject::account("act_1"),
            params: ad_params(),
            interval: DateInterval::day(date(2019, 1, 1)),
            config: None,
        }
    }

    pub fn with_edge_object(mut self, edge_object: EdgeObject) -> Self {
        self.edge_object = edge_object;
        self
    }

    pub fn with_params(mut self, params: ReportParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_interval(mut self, interval: DateInterval) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_config(mut self, config: InsightsJobsConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> ReportJob {
        let api: Arc<dyn InsightsApi> = self.api;
        let job = ReportJob::new(api, self.edge_object, self.params, self.interval);
        match self.config {
            Some(config) => job.with_config(Arc::new(config)),
            None => job,
        }
    }
}
