use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle values of a remote report job, as reported by the insights API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    /// Created locally, not yet submitted
    #[serde(rename = "Job Not Started")]
    NotStarted,
    /// Submitted, the remote side has acknowledged it
    #[serde(rename = "Job Started")]
    Started,
    /// The remote side is computing the report
    #[serde(rename = "Job Running")]
    Running,
    /// Report is ready for result fetching
    #[serde(rename = "Job Completed")]
    Completed,
    /// The remote side gave up on the report
    #[serde(rename = "Job Failed")]
    Failed,
    /// The remote side skipped the report
    #[serde(rename = "Job Skipped")]
    Skipped,
}

impl JobStatus {
    /// Check if this is a terminal state (only restart leaves it)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Skipped)
    }

    /// Failed and skipped jobs are both surfaced as failed
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::Skipped)
    }

    /// Check if the remote side is still working on the job
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Started | Self::Running)
    }

    /// Wire representation used by the insights API
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "Job Not Started",
            Self::Started => "Job Started",
            Self::Running => "Job Running",
            Self::Completed => "Job Completed",
            Self::Failed => "Job Failed",
            Self::Skipped => "Job Skipped",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Job Not Started" => Ok(Self::NotStarted),
            "Job Started" => Ok(Self::Started),
            "Job Running" => Ok(Self::Running),
            "Job Completed" => Ok(Self::Completed),
            "Job Failed" => Ok(Self::Failed),
            "Job Skipped" => Ok(Self::Skipped),
            _ => Err(format!("Invalid job status: {s}")),
        }
    }
}

/// Default state for new jobs
impl Default for JobStatus {
    fn default() -> Self {
        Self::NotStarted
    }
}
