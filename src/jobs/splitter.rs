//! # Job splitting
//!
//! A report job that keeps failing or timing out is usually too expensive for
//! the remote side. Splitting probes a cheaper, narrower report for the
//! partition keys (campaign ids by default) active in the window and creates
//! one report job per key, grouped so the caller can keep treating them as a
//! single job.

use super::{AsyncJob, DateInterval, JobGroup, ReportJob};
use crate::api::{EdgeObject, InsightRow, ReportLevel, ReportParams, TimeRange};
use crate::config::SplitterConfig;
use crate::error::JobResult;
use chrono::Days;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Parameters of the probe report listing the partition keys of a job.
///
/// Same scope and filters as the job, grouped by the partition level, without
/// time bucketing, and reaching back over the attribution window so keys
/// whose effects attribute into the interval are found too.
pub fn probe_params(
    params: &ReportParams,
    interval: &DateInterval,
    config: &SplitterConfig,
) -> ReportParams {
    let mut probe = params.clone();
    let level = config.partition_level;

    probe.fields = vec![level.id_field().to_string()];
    probe.level = level;
    probe.time_increment = None;

    let since = interval
        .start()
        .checked_sub_days(Days::new(u64::from(config.lookback_days())))
        .unwrap_or(chrono::NaiveDate::MIN);
    probe.time_range = Some(TimeRange {
        since,
        until: interval.end(),
    });

    probe
}

/// Distinct values of `level`'s id field across probe rows
pub fn partition_keys(rows: &[InsightRow], level: ReportLevel) -> BTreeSet<String> {
    let field = level.id_field();
    rows.iter()
        .filter_map(|row| match row.get(field) {
            Some(Value::String(id)) => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            Some(other) => {
                debug!(field, value = %other, "Skipping non-scalar partition key");
                None
            }
            None => None,
        })
        .collect()
}

/// Split `job` into one report job per partition key found by the probe
pub async fn split_report_job(job: &ReportJob) -> JobResult<JobGroup> {
    let config = job.config();
    let splitter = &config.splitter;
    let probe = probe_params(job.params(), job.interval(), splitter);

    let rows = job.api().query_insights(job.edge_object(), &probe).await?;
    let keys = partition_keys(&rows, splitter.partition_level);

    info!(
        num = keys.len(),
        period = %job.interval(),
        level = %splitter.partition_level,
        keys = ?keys,
        "Got {} {} partitions for period {}",
        keys.len(),
        splitter.partition_level,
        job.interval()
    );

    let jobs = keys
        .into_iter()
        .map(|key| {
            ReportJob::new(
                Arc::clone(job.api()),
                EdgeObject::new(splitter.partition_level, key),
                job.params().clone(),
                *job.interval(),
            )
            .with_config(Arc::clone(config))
        })
        .collect();

    Ok(JobGroup::from_report_jobs(
        Arc::clone(job.api()),
        *job.interval(),
        jobs,
    )
    .with_config(Arc::clone(config)))
}
