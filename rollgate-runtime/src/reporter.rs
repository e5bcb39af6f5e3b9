//! Success/failure signalling to the release orchestrator.
use reqwest::Client;
use rollgate_core::PerformanceReport;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum ReporterError {
    #[error("Callback request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Callback URL `{0}` cannot take a path")]
    InvalidCallback(String),
}

/// Variables exported to the orchestrator on PASS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutputVariables {
    pub test_result: String,
    pub success_rate: String,
    pub avg_response_time: String,
}

impl OutputVariables {
    pub fn from_report(report: &PerformanceReport) -> Self {
        // NOTE: Debug formatting keeps the trailing `.0` that consumers parse as a float.
        Self {
            test_result: report.verdict.to_string(),
            success_rate: format!("{:?}", report.success_rate),
            avg_response_time: format!("{:?}", report.latency.avg.as_secs_f64()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    JobFailed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureDetails {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: FailureKind,
}

impl FailureDetails {
    pub fn job_failed(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: FailureKind::JobFailed,
        }
    }
}

/// Relays a job's result to the orchestrator that launched it.
#[trait_variant::make(JobReporter: Send)]
pub trait LocalJobReporter {
    async fn report_success(
        &self,
        job_id: &str,
        outputs: &OutputVariables,
    ) -> Result<(), ReporterError>;

    async fn report_failure(
        &self,
        job_id: &str,
        details: &FailureDetails,
    ) -> Result<(), ReporterError>;
}

/// Only logs the signal. Used when no callback endpoint is configured.
#[derive(Debug, Clone, Default)]
pub struct LogReporter;

impl JobReporter for LogReporter {
    async fn report_success(
        &self,
        job_id: &str,
        outputs: &OutputVariables,
    ) -> Result<(), ReporterError> {
        info!(job_id, ?outputs, "Job succeeded");
        Ok(())
    }

    async fn report_failure(
        &self,
        job_id: &str,
        details: &FailureDetails,
    ) -> Result<(), ReporterError> {
        warn!(job_id, message = %details.message, "Job failed");
        Ok(())
    }
}

/// POSTs JSON to `{callback}/jobs/{job_id}/success` or `/failure`.
#[derive(Debug, Clone)]
pub struct HttpReporter {
    client: Client,
    callback: Url,
}

impl HttpReporter {
    pub fn new(client: Client, callback: Url) -> Self {
        Self { client, callback }
    }

    fn endpoint(&self, job_id: &str, signal: &str) -> Result<Url, ReporterError> {
        let mut url = self.callback.clone();
        url.path_segments_mut()
            .map_err(|_| ReporterError::InvalidCallback(self.callback.to_string()))?
            .pop_if_empty()
            .extend(["jobs", job_id, signal]);
        Ok(url)
    }

    async fn post<T: Serialize + ?Sized>(&self, url: Url, body: &T) -> Result<(), ReporterError> {
        self.client
            .post(url)
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

impl JobReporter for HttpReporter {
    async fn report_success(
        &self,
        job_id: &str,
        outputs: &OutputVariables,
    ) -> Result<(), ReporterError> {
        let url = self.endpoint(job_id, "success")?;
        self.post(url, outputs).await
    }

    async fn report_failure(
        &self,
        job_id: &str,
        details: &FailureDetails,
    ) -> Result<(), ReporterError> {
        let url = self.endpoint(job_id, "failure")?;
        self.post(url, details).await
    }
}

/// Reporter picked at startup from the CLI flags.
#[derive(Debug, Clone)]
pub enum AnyReporter {
    Log(LogReporter),
    Http(HttpReporter),
}

impl AnyReporter {
    pub fn from_callback(client: Client, callback: Option<Url>) -> Self {
        match callback {
            Some(callback) => AnyReporter::Http(HttpReporter::new(client, callback)),
            None => AnyReporter::Log(LogReporter),
        }
    }
}

impl JobReporter for AnyReporter {
    async fn report_success(
        &self,
        job_id: &str,
        outputs: &OutputVariables,
    ) -> Result<(), ReporterError> {
        match self {
            AnyReporter::Log(reporter) => JobReporter::report_success(reporter, job_id, outputs).await,
            AnyReporter::Http(reporter) => JobReporter::report_success(reporter, job_id, outputs).await,
        }
    }

    async fn report_failure(
        &self,
        job_id: &str,
        details: &FailureDetails,
    ) -> Result<(), ReporterError> {
        match self {
            AnyReporter::Log(reporter) => JobReporter::report_failure(reporter, job_id, details).await,
            AnyReporter::Http(reporter) => JobReporter::report_failure(reporter, job_id, details).await,
        }
    }
}
