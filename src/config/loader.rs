//! Configuration Loader
//!
//! Environment-aware configuration loading. Sources are layered, later ones
//! winning: built-in defaults, `insights-jobs.{toml,yaml,json}`,
//! `insights-jobs-<environment>.*`, then `INSIGHTS_JOBS__<SECTION>__<KEY>`
//! environment variables.

use super::error::{ConfigResult, ConfigurationError};
use super::InsightsJobsConfig;
use ::config::{Config, Environment, File};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Base name of the configuration files
pub const CONFIG_FILE_STEM: &str = "insights-jobs";

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "INSIGHTS_JOBS";

#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_directory: PathBuf,
    environment: String,
}

impl ConfigLoader {
    /// Loader for `config_directory` with the environment auto-detected
    pub fn new(config_directory: impl Into<PathBuf>) -> Self {
        Self {
            config_directory: config_directory.into(),
            environment: detect_environment(),
        }
    }

    /// Override the detected environment.
    /// This is useful for testing without modifying global environment variables
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Load, merge and validate the configuration
    pub fn load(&self) -> ConfigResult<InsightsJobsConfig> {
        debug!(
            "Loading configuration for environment '{}' from directory: {}",
            self.environment,
            self.config_directory.display()
        );

        let base_file = self.config_directory.join(CONFIG_FILE_STEM);
        let environment_file = self
            .config_directory
            .join(format!("{CONFIG_FILE_STEM}-{}", self.environment));

        let settings = Config::builder()
            .add_source(File::with_name(&base_file.to_string_lossy()).required(false))
            .add_source(File::with_name(&environment_file.to_string_lossy()).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigurationError::load_failed(&self.config_directory, e))?;

        let config: InsightsJobsConfig = settings
            .try_deserialize()
            .map_err(|e| ConfigurationError::load_failed(&self.config_directory, e))?;

        config.validate()?;

        info!(
            environment = %self.environment,
            max_calls_per_batch = config.batch.max_calls_per_batch,
            max_attempts = config.manager.max_attempts,
            throttle_limit = config.manager.throttle_limit,
            "Configuration loaded successfully"
        );

        Ok(config)
    }
}

/// Get current environment from environment variables
pub fn detect_environment() -> String {
    env::var("INSIGHTS_JOBS_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}
