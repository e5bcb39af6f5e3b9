//! One job, end to end: drive load, reduce, relay the verdict.
use crate::body::{ErrorResult, JobOutcome, JobResult};
use crate::error::RuntimeError;
use crate::job::{JobParameters, JobRequest};
use crate::reporter::{FailureDetails, JobReporter, OutputVariables};
use reqwest::Client;
use rollgate::{ConfigurableLoadTest, HttpProbe, LoadTest};
use rollgate_core::{PerformanceReport, RunConfig, Thresholds, Verdict};
use std::fmt;
use std::time::Duration;
use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, warn};

/// Runs performance-gate jobs and relays their verdicts through `R`.
///
/// Every job gets a child of the gate's shutdown token, so shutting the gate down cuts in-flight
/// jobs short instead of leaving them running.
pub struct Gate<R> {
    client: Client,
    reporter: R,
    thresholds: Thresholds,
    max_run_time: Option<Duration>,
    batch_interval: Option<Duration>,
    request_timeout: Option<Duration>,
    shutdown: CancellationToken,
}

impl<R: JobReporter + Sync> Gate<R> {
    pub fn new(client: Client, reporter: R) -> Self {
        Self {
            client,
            reporter,
            thresholds: Thresholds::default(),
            max_run_time: None,
            batch_interval: None,
            request_timeout: None,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Cancel any job still running after `limit`.
    pub fn max_run_time(mut self, limit: Option<Duration>) -> Self {
        self.max_run_time = limit;
        self
    }

    pub fn batch_interval(mut self, interval: Duration) -> Self {
        self.batch_interval = Some(interval);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn shutdown_on(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    #[instrument(
        name = "job",
        skip_all,
        fields(job_id = request.job_id.as_deref().unwrap_or("-"), run_id = %uuid::Uuid::new_v4())
    )]
    pub async fn run_job(&self, request: JobRequest) -> JobOutcome {
        let JobRequest { job_id, parameters } = request;
        let started_at = OffsetDateTime::now_utc();
        info!(
            "Starting performance test for {} environment",
            parameters.environment
        );

        match self.execute(&parameters).await {
            Ok((config, report)) => {
                info!("Performance test results: {report}");
                if let Some(job_id) = &job_id {
                    self.relay_verdict(job_id, &report).await;
                }
                JobOutcome::Completed(JobResult::new(&config, &report, started_at))
            }
            Err(err) => self.reject(job_id.as_deref(), &parameters, err).await,
        }
    }

    /// Answer with an ERROR body, relaying the failure when there is a job to report to.
    pub async fn reject(
        &self,
        job_id: Option<&str>,
        parameters: &JobParameters,
        err: impl fmt::Display,
    ) -> JobOutcome {
        error!("Performance test error: {err}");
        if let Some(job_id) = job_id {
            let details = FailureDetails::job_failed(format!("Performance test error: {err}"));
            if let Err(err) = self.reporter.report_failure(job_id, &details).await {
                warn!("Failed to report job failure: {err}");
            }
        }
        JobOutcome::Errored(ErrorResult::new(parameters, err, OffsetDateTime::now_utc()))
    }

    async fn execute(
        &self,
        params: &JobParameters,
    ) -> Result<(RunConfig, PerformanceReport), RuntimeError> {
        let mut config = params.run_config();
        if let Some(interval) = self.batch_interval {
            config.batch_interval = interval;
        }
        if let Some(timeout) = self.request_timeout {
            config.request_timeout = timeout;
        }
        config.validate()?;

        let probe = HttpProbe::new(self.client.clone(), &config.target_url)?;
        let cancel = self.shutdown.child_token();
        let deadline = self.max_run_time.map(|limit| {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(limit).await;
                warn!(
                    "Job exceeded the {} run-time cap, cancelling",
                    humantime::format_duration(limit)
                );
                cancel.cancel();
            })
        });

        let run = LoadTest::new(probe, config.clone())
            .cancel_on(cancel)
            .await;
        if let Some(deadline) = deadline {
            deadline.abort();
        }
        let run = run?;

        if run.cancelled {
            warn!(
                "Job cut short after {} waves; reducing {} recorded requests",
                run.waves,
                run.outcomes.len()
            );
        }

        let report = PerformanceReport::reduce(&run.outcomes, &config, &self.thresholds);
        Ok((config, report))
    }

    async fn relay_verdict(&self, job_id: &str, report: &PerformanceReport) {
        let res = match report.verdict {
            Verdict::Pass => {
                self.reporter
                    .report_success(job_id, &OutputVariables::from_report(report))
                    .await
            }
            Verdict::Fail => {
                self.reporter
                    .report_failure(job_id, &FailureDetails::job_failed(report.failure_message()))
                    .await
            }
        };

        match res {
            Ok(()) => debug!("Reported {} verdict for job {job_id}", report.verdict),
            Err(err) => warn!("Failed to report {} verdict: {err}", report.verdict),
        }
    }
}
