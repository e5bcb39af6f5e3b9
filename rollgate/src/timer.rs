use std::time::Duration;
use tokio::time::{interval, Instant, Interval, MissedTickBehavior};

/// Fixed wave cadence.
///
/// A tick fires `interval_dur` after the previous one. When a wave overruns, the next tick
/// fires immediately and the cadence re-anchors on it.
pub(crate) struct Timer {
    interval: Interval,
    last_tick: Instant,
    interval_dur: Duration,
}

impl Timer {
    pub async fn new(interval_dur: Duration) -> Self {
        let mut interval = interval(interval_dur);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // NOTE: First tick completes instantly
        let last_tick = interval.tick().await;
        Self {
            interval,
            last_tick,
            interval_dur,
        }
    }

    /// Wait for the next tick, returning how long the finished cycle took.
    pub async fn tick(&mut self) -> Duration {
        // NOTE: A late tick reports its scheduled instant, so anchor on the actual time instead.
        self.interval.tick().await;
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;
        elapsed
    }

    /// Time since the current cycle started.
    pub fn elapsed(&self) -> Duration {
        self.last_tick.elapsed()
    }

    pub fn interval_dur(&self) -> Duration {
        self.interval_dur
    }
}

impl std::fmt::Display for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", humantime::format_duration(self.interval_dur))
    }
}
