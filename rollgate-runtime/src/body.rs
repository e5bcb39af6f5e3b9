//! The JSON body a job answers with.
use crate::job::JobParameters;
use rollgate_core::{ErrorRecord, PerformanceReport, RunConfig, Thresholds, Verdict};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;

pub const ERROR_RESULT: &str = "ERROR";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportMetrics {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub success_rate: f64,
    pub avg_response_time: f64,
    pub min_response_time: f64,
    pub max_response_time: f64,
    pub p50_response_time: f64,
    pub p95_response_time: f64,
    pub p99_response_time: f64,
    pub requests_per_second: f64,
    pub errors_per_minute: f64,
}

impl From<&PerformanceReport> for ReportMetrics {
    fn from(report: &PerformanceReport) -> Self {
        let latency = &report.latency;
        Self {
            total_requests: report.total_requests,
            successful_requests: report.successful_requests,
            failed_requests: report.failed_requests,
            success_rate: report.success_rate,
            avg_response_time: latency.avg.as_secs_f64(),
            min_response_time: latency.min.as_secs_f64(),
            max_response_time: latency.max.as_secs_f64(),
            p50_response_time: latency.p50.as_secs_f64(),
            p95_response_time: latency.p95.as_secs_f64(),
            p99_response_time: latency.p99.as_secs_f64(),
            requests_per_second: report.requests_per_second,
            errors_per_minute: report.errors_per_minute,
        }
    }
}

/// Body of a job that ran to a verdict.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub environment: String,
    pub service_url: String,
    /// Seconds.
    pub test_duration: u64,
    pub concurrent_users: usize,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Seconds, at most the first 100 in recording order.
    pub response_times: Vec<f64>,
    pub status_codes: BTreeMap<String, u64>,
    pub errors: Vec<ErrorRecord>,
    pub metrics: ReportMetrics,
    pub test_result: Verdict,
    pub performance_criteria: Thresholds,
}

impl JobResult {
    pub fn new(config: &RunConfig, report: &PerformanceReport, timestamp: OffsetDateTime) -> Self {
        Self {
            environment: config.environment.clone(),
            service_url: config.target_url.clone(),
            test_duration: config.duration.as_secs(),
            concurrent_users: config.concurrency,
            timestamp,
            response_times: report
                .latency_sample
                .iter()
                .map(|latency| latency.as_secs_f64())
                .collect(),
            status_codes: report
                .status_codes
                .iter()
                .map(|(code, count)| (code.to_string(), *count))
                .collect(),
            errors: report.errors.clone(),
            metrics: report.into(),
            test_result: report.verdict,
            performance_criteria: report.thresholds,
        }
    }
}

/// Body of a job aborted by a run-level error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorResult {
    pub environment: String,
    pub service_url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub test_result: String,
    pub error: String,
}

impl ErrorResult {
    pub fn new(params: &JobParameters, error: impl ToString, timestamp: OffsetDateTime) -> Self {
        Self {
            environment: params.environment.clone(),
            service_url: params.service_url.clone(),
            timestamp,
            test_result: ERROR_RESULT.to_string(),
            error: error.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobOutcome {
    Completed(JobResult),
    Errored(ErrorResult),
}

impl JobOutcome {
    /// PASS and FAIL both completed the job; only a run-level error is a 500.
    pub fn status_code(&self) -> u16 {
        match self {
            JobOutcome::Completed(_) => 200,
            JobOutcome::Errored(_) => 500,
        }
    }

    pub fn passed(&self) -> bool {
        matches!(self, JobOutcome::Completed(result) if result.test_result.is_pass())
    }

    pub fn test_result(&self) -> &str {
        match self {
            JobOutcome::Completed(result) => result.test_result.as_str(),
            JobOutcome::Errored(result) => &result.test_result,
        }
    }
}
