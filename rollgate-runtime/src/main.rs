use rollgate_runtime::GateRuntime;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rollgate=info,rollgate_runtime=info,tower_http=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let passed = GateRuntime::new().with_args().run().await?;
    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
