//! Job requests as handed over by the release orchestrator.
use rollgate_core::{RunConfig, DEFAULT_TEST_DURATION};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, DurationSeconds, PickFirst};
use std::time::Duration;

pub const UNKNOWN_ENVIRONMENT: &str = "unknown";

#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobParameters {
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default)]
    pub service_url: String,
    /// Seconds, as an integer or a numeric string.
    #[serde_as(as = "PickFirst<(DurationSeconds<u64>, DurationSeconds<String>)>")]
    #[serde(default = "default_test_duration")]
    pub test_duration: Duration,
}

fn default_environment() -> String {
    UNKNOWN_ENVIRONMENT.to_string()
}

fn default_test_duration() -> Duration {
    DEFAULT_TEST_DURATION
}

impl Default for JobParameters {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            service_url: String::new(),
            test_duration: default_test_duration(),
        }
    }
}

impl JobParameters {
    /// Run configuration for these parameters, with the tiered concurrency applied.
    pub fn run_config(&self) -> RunConfig {
        RunConfig::new(&self.environment, &self.service_url, self.test_duration)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRequest {
    /// Orchestrator job to report back to. Nothing is reported without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default)]
    pub parameters: JobParameters,
}

impl JobRequest {
    /// The identifying fields of a body that failed to deserialize, so its error body can still
    /// name the environment and target. Anything missing or mistyped takes its default.
    pub fn salvage(body: &Value) -> Self {
        let text = |pointer: &str| body.pointer(pointer).and_then(Value::as_str).map(str::to_string);
        let mut request = Self {
            job_id: text("/job_id"),
            ..Default::default()
        };
        if let Some(environment) = text("/parameters/environment") {
            request.parameters.environment = environment;
        }
        if let Some(service_url) = text("/parameters/service_url") {
            request.parameters.service_url = service_url;
        }
        request
    }
}
