//! Default rollgate runtime
//!
//! Either serves jobs over HTTP until interrupted, or runs a single job from the command line
//! and prints its body.
use crate::body::JobOutcome;
use crate::error::RuntimeError;
use crate::gate::Gate;
use crate::job::{JobParameters, JobRequest, UNKNOWN_ENVIRONMENT};
use crate::reporter::AnyReporter;
use crate::server::server_task;
use clap::{Parser, Subcommand};
use reqwest::Client;
use rollgate_core::DEFAULT_TEST_DURATION;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
#[allow(unused)]
use tracing::{debug, error, info, instrument, warn, Instrument};
use url::Url;

pub const DEFAULT_PORT: u16 = 7621;

#[derive(Parser, Debug)]
#[command(version, about = "Post-deployment performance gate")]
struct GateCli {
    #[command(subcommand)]
    command: GateCommand,

    /// Orchestrator base URL to POST job results to. Results are only logged without it.
    #[arg(long, global = true)]
    callback_url: Option<Url>,

    /// Cancel any job still running after this long, e.g. `15m`.
    #[arg(long, global = true, value_parser = humantime::parse_duration)]
    max_run_time: Option<Duration>,
}

#[derive(Subcommand, Debug)]
enum GateCommand {
    /// Serve `POST /run` and `GET /health`.
    Serve {
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// Run one job and print its result body.
    Run {
        #[arg(long, default_value = UNKNOWN_ENVIRONMENT)]
        environment: String,

        #[arg(long)]
        service_url: String,

        /// Seconds.
        #[arg(long, default_value_t = DEFAULT_TEST_DURATION.as_secs())]
        test_duration: u64,

        #[arg(long)]
        job_id: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    Serve { port: u16 },
    Once(JobRequest),
}

/// Default rollgate runtime.
///
/// # Example
///
/// ```no_run
/// use rollgate_runtime::GateRuntime;
///
/// #[tokio::main]
/// async fn main() {
///     let passed = GateRuntime::new().with_args().run().await.unwrap();
///     std::process::exit(if passed { 0 } else { 1 });
/// }
/// ```
pub struct GateRuntime {
    invocation: Invocation,
    callback_url: Option<Url>,
    max_run_time: Option<Duration>,
}

impl Default for GateRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl GateRuntime {
    pub fn new() -> Self {
        Self {
            invocation: Invocation::Serve { port: DEFAULT_PORT },
            callback_url: None,
            max_run_time: None,
        }
    }

    /// Use the default CLI arguments.
    ///
    /// ```ignore
    /// $ rollgate serve -p 2742 --callback-url http://orchestrator.internal/
    /// $ rollgate run --environment production --service-url https://api.example.com --test-duration 60
    /// ```
    pub fn with_args(self) -> Self {
        self.with_cli(GateCli::parse())
    }

    fn with_cli(mut self, args: GateCli) -> Self {
        self.callback_url = args.callback_url;
        self.max_run_time = args.max_run_time;
        self.invocation = match args.command {
            GateCommand::Serve { port } => Invocation::Serve { port },
            GateCommand::Run {
                environment,
                service_url,
                test_duration,
                job_id,
            } => Invocation::Once(JobRequest {
                job_id,
                parameters: JobParameters {
                    environment,
                    service_url,
                    test_duration: Duration::from_secs(test_duration),
                },
            }),
        };
        self
    }

    pub fn invocation(mut self, invocation: Invocation) -> Self {
        self.invocation = invocation;
        self
    }

    pub fn callback_url(mut self, url: Option<Url>) -> Self {
        self.callback_url = url;
        self
    }

    pub fn max_run_time(mut self, limit: Option<Duration>) -> Self {
        self.max_run_time = limit;
        self
    }

    /// Serve until interrupted, or run the single job and print its body.
    ///
    /// Returns whether the gate passed; a server that shut down cleanly counts as passing.
    #[instrument(name = "rollgate", skip_all)]
    pub async fn run(self) -> Result<bool, RuntimeError> {
        let client = Client::builder().build()?;
        let reporter = AnyReporter::from_callback(client.clone(), self.callback_url);
        let shutdown = CancellationToken::new();
        let gate = Gate::new(client, reporter)
            .max_run_time(self.max_run_time)
            .shutdown_on(shutdown.clone());

        match self.invocation {
            Invocation::Serve { port } => {
                spawn_shutdown_signal(shutdown.clone());
                server_task(port, Arc::new(gate), shutdown).await?;
                Ok(true)
            }
            Invocation::Once(request) => {
                spawn_shutdown_signal(shutdown);
                let outcome = gate.run_job(request).await;
                print_outcome(&outcome)?;
                Ok(outcome.passed())
            }
        }
    }
}

fn print_outcome(outcome: &JobOutcome) -> Result<(), RuntimeError> {
    let body = serde_json::to_string_pretty(outcome)?;
    println!("{body}");
    Ok(())
}

fn spawn_shutdown_signal(shutdown: CancellationToken) {
    tokio::spawn(
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Interrupted, shutting down");
                    shutdown.cancel();
                }
                Err(err) => error!("Unable to listen for the interrupt signal: {err}"),
            }
        }
        .in_current_span(),
    );
}
