use crate::{DEFAULT_MAX_AVG_LATENCY, DEFAULT_MAX_P95_LATENCY, DEFAULT_MIN_SUCCESS_RATE};
#[cfg(feature = "rt")]
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
#[cfg(feature = "rt")]
use serde_with::{serde_as, DurationSecondsWithFrac};
use std::fmt;
use std::time::Duration;

/// Pass/fail policy a run is judged against.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "rt", cfg_eval::cfg_eval, serde_as)]
#[cfg_attr(feature = "rt", derive(Serialize, Deserialize))]
pub struct Thresholds {
    /// Percent, inclusive.
    pub min_success_rate: f64,
    #[cfg_attr(
        feature = "rt",
        serde(rename = "max_avg_response_time"),
        serde_as(as = "DurationSecondsWithFrac<f64>")
    )]
    pub max_avg_latency: Duration,
    #[cfg_attr(
        feature = "rt",
        serde(rename = "max_p95_response_time"),
        serde_as(as = "DurationSecondsWithFrac<f64>")
    )]
    pub max_p95_latency: Duration,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_success_rate: DEFAULT_MIN_SUCCESS_RATE,
            max_avg_latency: DEFAULT_MAX_AVG_LATENCY,
            max_p95_latency: DEFAULT_MAX_P95_LATENCY,
        }
    }
}

impl Thresholds {
    /// PASS iff every bound holds.
    pub fn judge(&self, success_rate: f64, avg: Duration, p95: Duration) -> Verdict {
        if success_rate >= self.min_success_rate
            && avg <= self.max_avg_latency
            && p95 <= self.max_p95_latency
        {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "rt", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "rt", serde(rename_all = "UPPERCASE"))]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        let thresholds = Thresholds::default();
        assert_eq!(
            thresholds.judge(95.0, Duration::from_secs(2), Duration::from_secs(5)),
            Verdict::Pass
        );
    }

    #[test]
    fn any_bound_failing_fails() {
        let thresholds = Thresholds::default();
        let ok = Duration::from_millis(500);

        assert_eq!(thresholds.judge(94.9, ok, ok), Verdict::Fail);
        assert_eq!(
            thresholds.judge(100.0, Duration::from_millis(2001), ok),
            Verdict::Fail
        );
        assert_eq!(
            thresholds.judge(100.0, ok, Duration::from_millis(5001)),
            Verdict::Fail
        );
    }

    #[test]
    fn verdict_renders_uppercase() {
        assert_eq!(Verdict::Pass.to_string(), "PASS");
        assert_eq!(Verdict::Fail.to_string(), "FAIL");
    }

    #[cfg(feature = "rt")]
    #[test]
    fn thresholds_serialize_as_criteria() {
        let json = serde_json::to_value(Thresholds::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "min_success_rate": 95.0,
                "max_avg_response_time": 2.0,
                "max_p95_response_time": 5.0,
            })
        );
    }
}
