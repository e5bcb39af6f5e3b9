#![cfg_attr(docsrs, feature(doc_cfg))]
//! Job runtime for the rollgate performance gate.
//!
//! A job takes its parameters from the release orchestrator, drives a [`rollgate::LoadTest`]
//! against the freshly deployed service, reduces the outcomes to a verdict and relays that
//! verdict back through a [`JobReporter`]. Jobs arrive over HTTP (`rollgate serve`) or from the
//! command line (`rollgate run`).

pub mod body;
pub mod error;
pub mod gate;
pub mod job;
pub mod reporter;
pub mod runtime;
pub(crate) mod server;

pub use body::{ErrorResult, JobOutcome, JobResult, ReportMetrics};
pub use error::{RuntimeError, ServerError};
pub use gate::Gate;
pub use job::{JobParameters, JobRequest};
pub use reporter::{
    AnyReporter, FailureDetails, HttpReporter, JobReporter, LocalJobReporter, LogReporter,
    OutputVariables, ReporterError,
};
pub use runtime::{GateRuntime, Invocation, DEFAULT_PORT};

/// Serve jobs on an already-bound listener until `shutdown` fires.
pub async fn serve<R: JobReporter + Sync + 'static>(
    listener: tokio::net::TcpListener,
    gate: std::sync::Arc<Gate<R>>,
    shutdown: tokio_util::sync::CancellationToken,
) -> Result<(), ServerError> {
    server::serve(listener, gate, shutdown).await
}
