use rollgate_core::ConfigError;
use std::time::Duration;
use thiserror::Error;

/// Run-level failures. Any of these aborts the run.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Invalid run configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid target URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unsupported target URL scheme `{0}`, expected http or https")]
    UnsupportedScheme(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Request worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Failure of a single request. Recorded in the outcome, never propagated.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("request timed out after {}", humantime::format_duration(*.0))]
    Timeout(Duration),

    #[error("{}", error_chain(.0))]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

/// Flatten an error and its sources into one line.
///
/// `reqwest` keeps the interesting part (refused, DNS, TLS) in the source chain.
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(err) = source {
        let next = err.to_string();
        if !message.contains(&next) {
            message.push_str(": ");
            message.push_str(&next);
        }
        source = err.source();
    }
    message
}
