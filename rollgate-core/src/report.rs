use crate::{
    LatencyStats, OutcomeKind, RequestOutcome, RunConfig, Thresholds, Verdict,
    LATENCY_SAMPLE_LIMIT,
};
#[cfg(feature = "rt")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use time::OffsetDateTime;

/// A transport failure as it appears in the job body.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "rt", derive(Serialize, Deserialize))]
pub struct ErrorRecord {
    #[cfg_attr(feature = "rt", serde(with = "time::serde::rfc3339"))]
    pub timestamp: OffsetDateTime,
    pub error: String,
    #[cfg_attr(feature = "rt", serde(rename = "user"))]
    pub client: usize,
}

/// The reduction of one run's outcomes. Created once per run and never mutated.
#[derive(Clone, Debug, PartialEq)]
pub struct PerformanceReport {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    /// Percent of requests answered with a 200.
    pub success_rate: f64,
    /// Normalized by the configured duration, not the measured one.
    pub requests_per_second: f64,
    pub errors_per_minute: f64,
    pub latency: LatencyStats,
    /// First recorded latencies, in recording order.
    pub latency_sample: Vec<Duration>,
    pub status_codes: BTreeMap<u16, u64>,
    pub errors: Vec<ErrorRecord>,
    pub thresholds: Thresholds,
    pub verdict: Verdict,
}

impl PerformanceReport {
    /// Reduce a run's outcomes. Pure: the same input always yields the same report.
    pub fn reduce(
        outcomes: &[RequestOutcome],
        config: &RunConfig,
        thresholds: &Thresholds,
    ) -> Self {
        let mut successful_requests = 0u64;
        let mut failed_requests = 0u64;
        let mut latencies = Vec::with_capacity(outcomes.len());
        let mut status_codes = BTreeMap::new();
        let mut errors = vec![];

        for outcome in outcomes {
            if outcome.is_success() {
                successful_requests += 1;
            } else {
                failed_requests += 1;
            }

            match &outcome.kind {
                OutcomeKind::Response { status } => {
                    latencies.push(outcome.latency);
                    *status_codes.entry(*status).or_insert(0) += 1;
                }
                OutcomeKind::Transport { error } => errors.push(ErrorRecord {
                    timestamp: outcome.issued_at,
                    error: error.clone(),
                    client: outcome.client,
                }),
            }
        }

        let total_requests = successful_requests + failed_requests;
        let success_rate = if total_requests > 0 {
            (successful_requests as f64 / total_requests as f64) * 100.
        } else {
            0.
        };

        let duration = config.duration.as_secs_f64();
        let (requests_per_second, errors_per_minute) = if duration > 0. {
            (
                total_requests as f64 / duration,
                (failed_requests as f64 / duration) * 60.,
            )
        } else {
            (0., 0.)
        };

        let latency = LatencyStats::from_latencies(&latencies);

        // NOTE: Nothing measured can never satisfy the success-rate bound, but be explicit.
        let verdict = if total_requests == 0 {
            Verdict::Fail
        } else {
            thresholds.judge(success_rate, latency.avg, latency.p95)
        };

        latencies.truncate(LATENCY_SAMPLE_LIMIT);

        Self {
            total_requests,
            successful_requests,
            failed_requests,
            success_rate,
            requests_per_second,
            errors_per_minute,
            latency,
            latency_sample: latencies,
            status_codes,
            errors,
            thresholds: *thresholds,
            verdict,
        }
    }

    /// Message relayed to the orchestrator when the verdict is FAIL.
    pub fn failure_message(&self) -> String {
        format!(
            "Performance test failed: Success rate {:.1}%, Avg response time {:.2}s",
            self.success_rate,
            self.latency.avg.as_secs_f64(),
        )
    }
}

impl fmt::Display for PerformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Requests={}, SuccessRate={:.1}%, Avg={:.2}s, P95={:.2}s, RPS={:.2}, Result={}",
            self.total_requests,
            self.success_rate,
            self.latency.avg.as_secs_f64(),
            self.latency.p95.as_secs_f64(),
            self.requests_per_second,
            self.verdict,
        )
    }
}
