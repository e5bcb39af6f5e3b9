use rollgate::DriverError;
use rollgate_core::ConfigError;
use thiserror::Error;

/// Failures that abort a job. Surfaced as an ERROR body, never as FAIL.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Driver(#[from] DriverError),

    #[error("Failed to serialize job body: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Server failed: {0}")]
    Server(#[from] ServerError),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Address parsing error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
