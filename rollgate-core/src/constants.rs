use std::time::Duration;

/// Test duration used when the job parameters do not supply one.
pub const DEFAULT_TEST_DURATION: Duration = Duration::from_secs(300);

/// Logical clients per wave for the `production` environment tier.
pub const PRODUCTION_CONCURRENCY: usize = 10;

/// Logical clients per wave for every other environment tier.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Delay a logical client waits after its request completes.
pub const DEFAULT_REQUEST_INTERVAL: Duration = Duration::from_millis(100);

/// Minimum time between the starts of two consecutive waves.
pub const DEFAULT_BATCH_INTERVAL: Duration = Duration::from_secs(10);

/// Upper bound on a single request, connection setup included.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Raw latencies kept in a report.
pub const LATENCY_SAMPLE_LIMIT: usize = 100;

/// The only status counted as a successful request.
pub const SUCCESS_STATUS: u16 = 200;

/// Statuses from here up are recorded as errors, not timed responses.
pub const HTTP_ERROR_STATUS: u16 = 400;

/// Prefix of the `User-Agent` each logical client sends; the client index is appended.
pub const USER_AGENT_PREFIX: &str = "Rollgate-LoadTest-User";

pub const PRODUCTION_ENVIRONMENT: &str = "production";

/// The default minimum success rate, in percent.
pub const DEFAULT_MIN_SUCCESS_RATE: f64 = 95.0;

/// The default maximum mean latency.
pub const DEFAULT_MAX_AVG_LATENCY: Duration = Duration::from_secs(2);

/// The default maximum p95 latency.
pub const DEFAULT_MAX_P95_LATENCY: Duration = Duration::from_secs(5);
