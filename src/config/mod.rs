//! # Insights Jobs Configuration
//!
//! Tunables of the job engine. Every section has defaults matching the
//! remote API's documented limits, so an empty configuration is valid.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use insights_jobs::config::ConfigLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Loads config/insights-jobs.*, config/insights-jobs-<env>.* and
//! // INSIGHTS_JOBS__* environment overrides
//! let config = ConfigLoader::new("config").load()?;
//!
//! let chunk_size = config.batch.max_calls_per_batch;
//! let max_attempts = config.manager.max_attempts;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::api::ReportLevel;
use crate::constants;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigLoader;

/// Root configuration structure mirroring insights-jobs.toml
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct InsightsJobsConfig {
    /// Batched status checks
    pub batch: BatchConfig,

    /// Result fetching
    pub results: ResultsConfig,

    /// Splitting of coarse jobs
    pub splitter: SplitterConfig,

    /// Polling, retry and throttling policy of the job manager
    pub manager: ManagerConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Size of the groups unfinished jobs are chunked into per round trip
    pub max_calls_per_batch: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_calls_per_batch: constants::api::MAX_CALLS_PER_BATCH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ResultsConfig {
    pub page_size: usize,
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            page_size: constants::api::RESULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SplitterConfig {
    /// Attribution look-back in days; one extra day is always added
    pub attribution_window_days: u32,
    /// Level whose identifiers partition a split job
    pub partition_level: ReportLevel,
}

impl SplitterConfig {
    /// Total number of days the probe window is widened by
    pub fn lookback_days(&self) -> u32 {
        self.attribution_window_days + constants::splitter::ATTRIBUTION_EXTRA_DAYS
    }
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            attribution_window_days: constants::splitter::ATTRIBUTION_WINDOW_DAYS,
            partition_level: ReportLevel::Campaign,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ManagerConfig {
    pub throttle_limit: f64,
    pub max_attempts: u32,
    pub status_poll_interval_seconds: u64,
    pub max_jobs_in_queue: usize,
    pub max_jobs_to_check: usize,
}

impl ManagerConfig {
    pub fn status_poll_interval(&self) -> Duration {
        Duration::from_secs(self.status_poll_interval_seconds)
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            throttle_limit: constants::manager::THROTTLE_LIMIT,
            max_attempts: constants::manager::MAX_NUMBER_OF_ATTEMPTS,
            status_poll_interval_seconds: constants::manager::JOB_STATUS_UPDATE_SLEEP_SECONDS,
            max_jobs_in_queue: constants::manager::MAX_JOBS_IN_QUEUE,
            max_jobs_to_check: constants::manager::MAX_JOBS_TO_CHECK,
        }
    }
}

impl InsightsJobsConfig {
    /// Validate value ranges
    pub fn validate(&self) -> ConfigResult<()> {
        let max_calls = self.batch.max_calls_per_batch;
        if max_calls == 0 || max_calls > constants::api::MAX_CALLS_PER_BATCH {
            return Err(ConfigurationError::invalid_value(
                "batch.max_calls_per_batch",
                max_calls,
                format!(
                    "must be between 1 and {}",
                    constants::api::MAX_CALLS_PER_BATCH
                ),
            ));
        }

        if self.results.page_size == 0 {
            return Err(ConfigurationError::invalid_value(
                "results.page_size",
                self.results.page_size,
                "must be greater than 0",
            ));
        }

        if self.manager.max_attempts == 0 {
            return Err(ConfigurationError::invalid_value(
                "manager.max_attempts",
                self.manager.max_attempts,
                "must be greater than 0",
            ));
        }

        if !(0.0..=100.0).contains(&self.manager.throttle_limit) {
            return Err(ConfigurationError::invalid_value(
                "manager.throttle_limit",
                self.manager.throttle_limit,
                "must be a percentage between 0 and 100",
            ));
        }

        if self.manager.max_jobs_in_queue == 0 {
            return Err(ConfigurationError::invalid_value(
                "manager.max_jobs_in_queue",
                self.manager.max_jobs_in_queue,
                "must be greater than 0",
            ));
        }

        if self.manager.max_jobs_to_check == 0 {
            return Err(ConfigurationError::invalid_value(
                "manager.max_jobs_to_check",
                self.manager.max_jobs_to_check,
                "must be greater than 0",
            ));
        }

        Ok(())
    }
}
