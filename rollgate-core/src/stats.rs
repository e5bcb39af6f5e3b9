#[cfg(feature = "rt")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Latency distribution of the requests that received a response.
///
/// All fields are zero when nothing was measured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "rt", derive(Serialize, Deserialize))]
pub struct LatencyStats {
    pub count: usize,
    pub avg: Duration,
    pub min: Duration,
    pub max: Duration,
    pub p50: Duration,
    pub p95: Duration,
    pub p99: Duration,
}

impl LatencyStats {
    pub fn from_latencies(latencies: &[Duration]) -> Self {
        if latencies.is_empty() {
            return Self::default();
        }

        let mut sorted = latencies.to_vec();
        sorted.sort_unstable();

        let total: Duration = sorted.iter().sum();
        // NOTE: Duration division takes a u32; a run never gets near 4 billion requests.
        let avg = total / sorted.len() as u32;

        Self {
            count: sorted.len(),
            avg,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            p50: quantile(&sorted, 0.5),
            p95: quantile(&sorted, 0.95),
            p99: quantile(&sorted, 0.99),
        }
    }
}

impl fmt::Display for LatencyStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "avg={:?}, min={:?}, max={:?}, p50={:?}, p95={:?}, p99={:?}",
            self.avg, self.min, self.max, self.p50, self.p95, self.p99,
        )
    }
}

/// Nearest-rank quantile over an ascending slice using the index `floor(len * q)`.
///
/// No interpolation: existing thresholds were calibrated against this estimator.
pub fn quantile(sorted: &[Duration], q: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }

    let idx = (sorted.len() as f64 * q).floor() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(values: &[u64]) -> Vec<Duration> {
        values.iter().map(|s| Duration::from_secs(*s)).collect()
    }

    #[test]
    fn empty_latencies_are_zeroed() {
        assert_eq!(LatencyStats::from_latencies(&[]), LatencyStats::default());
        assert_eq!(quantile(&[], 0.95), Duration::ZERO);
    }

    #[test]
    fn quantile_uses_floor_index() {
        let sorted = secs(&[1, 1, 1, 1, 1, 1, 1, 1, 1, 10]);
        assert_eq!(quantile(&sorted, 0.5), Duration::from_secs(1));
        // floor(10 * 0.95) == 9
        assert_eq!(quantile(&sorted, 0.95), Duration::from_secs(10));
        assert_eq!(quantile(&sorted, 0.99), Duration::from_secs(10));
    }

    #[test]
    fn quantile_of_single_value() {
        let sorted = secs(&[3]);
        assert_eq!(quantile(&sorted, 0.5), Duration::from_secs(3));
        assert_eq!(quantile(&sorted, 0.99), Duration::from_secs(3));
    }

    #[test]
    fn p50_of_even_length_takes_upper_middle() {
        let sorted = secs(&[1, 2, 3, 4]);
        assert_eq!(quantile(&sorted, 0.5), Duration::from_secs(3));
    }

    #[test]
    fn stats_sort_unordered_input() {
        let stats = LatencyStats::from_latencies(&secs(&[5, 1, 3, 2, 4]));
        assert_eq!(stats.count, 5);
        assert_eq!(stats.min, Duration::from_secs(1));
        assert_eq!(stats.max, Duration::from_secs(5));
        assert_eq!(stats.avg, Duration::from_secs(3));
        assert_eq!(stats.p50, Duration::from_secs(3));
        assert_eq!(stats.p95, Duration::from_secs(5));
    }

    #[test]
    fn percentiles_are_monotonic() {
        let samples: Vec<Duration> = (0..257u64)
            .map(|i| Duration::from_millis((i * 7919) % 1013))
            .collect();
        for len in 1..samples.len() {
            let stats = LatencyStats::from_latencies(&samples[..len]);
            assert!(stats.min <= stats.p50);
            assert!(stats.p50 <= stats.p95);
            assert!(stats.p95 <= stats.p99);
            assert!(stats.p99 <= stats.max);
        }
    }
}
