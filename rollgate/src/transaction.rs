use crate::error::{error_chain, ProbeError};
use crate::probe::Probe;
use rollgate_core::RequestOutcome;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::time::Instant;
use tracing::trace;

pub const LATENCY_METRIC: &str = "rollgate_request_latency";
pub const SUCCESS_METRIC: &str = "rollgate_request_success";
pub const ERROR_METRIC: &str = "rollgate_request_error";

/// Issue one request through `probe`, bounded by `timeout`, and record what happened.
///
/// Never fails: transport problems become a `Transport` outcome.
pub(crate) async fn request_hook<P: Probe>(
    probe: &P,
    client: usize,
    timeout: Duration,
) -> RequestOutcome {
    let issued_at = OffsetDateTime::now_utc();
    let start = Instant::now();
    let res = tokio::time::timeout(timeout, probe.probe(client)).await;
    let elapsed = start.elapsed();

    let outcome = match res {
        Ok(Ok(status)) => RequestOutcome::response(issued_at, client, elapsed, status),
        Ok(Err(err)) => RequestOutcome::transport(issued_at, client, elapsed, error_chain(&err)),
        Err(_) => RequestOutcome::transport(
            issued_at,
            client,
            elapsed,
            ProbeError::Timeout(timeout).to_string(),
        ),
    };

    trace!(
        client,
        status = ?outcome.status_code(),
        error = outcome.error(),
        "Request finished in {:?}",
        elapsed
    );

    #[cfg(feature = "metrics")]
    record_metrics(&outcome);

    outcome
}

#[cfg(feature = "metrics")]
fn record_metrics(outcome: &RequestOutcome) {
    // TODO: Describe these once at startup rather than on every request.
    metrics::describe_histogram!(LATENCY_METRIC, metrics::Unit::Seconds, "Request latency");

    if outcome.status_code().is_some() {
        metrics::histogram!(LATENCY_METRIC).record(outcome.latency.as_secs_f64());
    }

    if outcome.is_success() {
        metrics::counter!(SUCCESS_METRIC).increment(1);
    } else {
        metrics::counter!(ERROR_METRIC).increment(1);
    }
}
