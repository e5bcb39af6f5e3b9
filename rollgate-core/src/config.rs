use crate::{
    DEFAULT_BATCH_INTERVAL, DEFAULT_CONCURRENCY, DEFAULT_REQUEST_INTERVAL,
    DEFAULT_REQUEST_TIMEOUT, PRODUCTION_CONCURRENCY, PRODUCTION_ENVIRONMENT,
};
#[cfg(feature = "rt")]
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
#[cfg(feature = "rt")]
use serde_with::{serde_as, DurationMilliSeconds, DurationSeconds};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Target URL must not be empty")]
    EmptyTarget,

    #[error("Test duration must be greater than zero")]
    ZeroDuration,

    #[error("Concurrency must be greater than zero")]
    ZeroConcurrency,

    #[error("Batch interval must be greater than zero")]
    ZeroBatchInterval,

    #[error("Request timeout must be greater than zero")]
    ZeroRequestTimeout,
}

/// Inputs fixing a single load-test run.
///
/// Pacing is best-effort: nothing checks that one wave of `concurrency` requests fits inside
/// `batch_interval`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "rt", cfg_eval::cfg_eval, serde_as)]
#[cfg_attr(feature = "rt", derive(Serialize, Deserialize))]
pub struct RunConfig {
    pub environment: String,
    pub target_url: String,
    #[cfg_attr(feature = "rt", serde_as(as = "DurationSeconds<u64>"))]
    pub duration: Duration,
    pub concurrency: usize,
    #[cfg_attr(feature = "rt", serde_as(as = "DurationMilliSeconds<u64>"))]
    pub request_interval: Duration,
    #[cfg_attr(feature = "rt", serde_as(as = "DurationMilliSeconds<u64>"))]
    pub batch_interval: Duration,
    #[cfg_attr(feature = "rt", serde_as(as = "DurationMilliSeconds<u64>"))]
    pub request_timeout: Duration,
}

impl RunConfig {
    pub fn new(environment: &str, target_url: &str, duration: Duration) -> Self {
        Self {
            environment: environment.to_string(),
            target_url: target_url.to_string(),
            duration,
            concurrency: concurrency_for(environment),
            request_interval: DEFAULT_REQUEST_INTERVAL,
            batch_interval: DEFAULT_BATCH_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_url.trim().is_empty() {
            return Err(ConfigError::EmptyTarget);
        }
        if self.duration.is_zero() {
            return Err(ConfigError::ZeroDuration);
        }
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.batch_interval.is_zero() {
            return Err(ConfigError::ZeroBatchInterval);
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroRequestTimeout);
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == PRODUCTION_ENVIRONMENT
    }
}

/// Logical clients per wave for an environment tier.
pub fn concurrency_for(environment: &str) -> usize {
    if environment == PRODUCTION_ENVIRONMENT {
        PRODUCTION_CONCURRENCY
    } else {
        DEFAULT_CONCURRENCY
    }
}
