use std::net::SocketAddr;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEFAULT_ADDR: &str = "0.0.0.0:3002";

#[tokio::main]
async fn main() {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mock_service=debug,tower_http=info")),
        )
        .init();

    let addr: SocketAddr = match std::env::args().nth(1).as_deref().unwrap_or(DEFAULT_ADDR).parse() {
        Ok(addr) => addr,
        Err(err) => {
            eprintln!("Invalid listen address: {err}");
            std::process::exit(2);
        }
    };

    tokio::spawn(mock_service::tps_measure_task());
    mock_service::run(addr).await;
}
