use crate::error::DriverError;
use crate::probe::Probe;
use crate::transaction::request_hook;
use rollgate_core::{RequestOutcome, RunConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn, Instrument};

/// Fans one request per logical client out to its own task and joins them all.
pub(crate) struct WaveDispatcher<P> {
    probe: Arc<P>,
    concurrency: usize,
    request_interval: Duration,
    request_timeout: Duration,
}

pub(crate) struct Wave {
    /// Completion order.
    pub outcomes: Vec<RequestOutcome>,
    pub cancelled: bool,
}

impl<P: Probe> WaveDispatcher<P> {
    pub fn new(probe: Arc<P>, config: &RunConfig) -> Self {
        Self {
            probe,
            concurrency: config.concurrency,
            request_interval: config.request_interval,
            request_timeout: config.request_timeout,
        }
    }

    pub async fn dispatch(&self, cancel: &CancellationToken) -> Result<Wave, DriverError> {
        let mut tasks = JoinSet::new();
        for client in 0..self.concurrency {
            let probe = self.probe.clone();
            let request_interval = self.request_interval;
            let request_timeout = self.request_timeout;

            tasks.spawn(
                async move {
                    let outcome = request_hook(&*probe, client, request_timeout).await;
                    // Per-client pacing; every client waits the same, so completion order holds.
                    tokio::time::sleep(request_interval).await;
                    outcome
                }
                .in_current_span(),
            );
        }

        let mut outcomes = Vec::with_capacity(self.concurrency);
        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    debug!("Wave cancelled with {} requests in flight.", tasks.len());
                    tasks.abort_all();
                    return Ok(Wave { outcomes, cancelled: true });
                }

                next = tasks.join_next() => match next {
                    Some(Ok(outcome)) => outcomes.push(outcome),
                    Some(Err(err)) => {
                        error!("Request worker failed: {err}");
                        return Err(DriverError::Worker(err));
                    }
                    None => break,
                },
            }
        }

        Ok(Wave {
            outcomes,
            cancelled: false,
        })
    }
}
