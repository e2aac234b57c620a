//! Aggregate statistics describing how badly traffic is jammed.

use arrayvec::ArrayVec;
use std::time::{Duration, Instant};

/// The number of efficiency samples kept by a [StatsHistory].
pub const HISTORY_LEN: usize = 60;

/// The default interval between efficiency samples.
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(200);

/// Statistics computed at the end of a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickStats {
    /// The mean vehicle speed in hundredths of a rad per tick.
    pub average_speed: f64,
    /// The number of vehicles that braked or were held still this tick.
    pub braking_count: usize,
}

impl TickStats {
    /// Creates the statistics for a ring of `count` vehicles.
    pub(crate) fn new(total_speed: f64, count: usize, braking_count: usize) -> Self {
        let average_speed = if count == 0 {
            0.0
        } else {
            100.0 * total_speed / count as f64
        };
        Self {
            average_speed,
            braking_count,
        }
    }

    /// The average speed as a percentage of the target speed, capped at 100.
    pub fn efficiency(&self, max_speed: f64) -> f64 {
        if max_speed <= 0.0 {
            return 0.0;
        }
        f64::min(100.0, self.average_speed / (max_speed * 100.0) * 100.0)
    }
}

/// One sample of a [StatsHistory].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EfficiencySample {
    /// The frame the sample was taken after.
    pub frame: usize,
    /// When the sample was taken.
    pub at: Instant,
    /// The flow efficiency in percent.
    pub efficiency: f64,
}

/// A rolling record of flow efficiency, sampled no more often than a fixed interval.
#[derive(Clone, Debug)]
pub struct StatsHistory {
    samples: ArrayVec<EfficiencySample, HISTORY_LEN>,
    interval: Duration,
    last: Option<Instant>,
}

impl Default for StatsHistory {
    fn default() -> Self {
        Self::new(SAMPLE_INTERVAL)
    }
}

impl StatsHistory {
    /// Creates an empty history that samples at most once per `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            samples: ArrayVec::new(),
            interval,
            last: None,
        }
    }

    /// Records a sample unless one was taken less than an interval ago.
    /// Returns `true` if a sample was recorded.
    pub fn record(&mut self, now: Instant, frame: usize, stats: &TickStats, max_speed: f64) -> bool {
        if let Some(last) = self.last {
            if now.saturating_duration_since(last) < self.interval {
                return false;
            }
        }
        if self.samples.is_full() {
            self.samples.remove(0);
        }
        self.samples.push(EfficiencySample {
            frame,
            at: now,
            efficiency: stats.efficiency(max_speed),
        });
        self.last = Some(now);
        true
    }

    /// The recorded samples, oldest first.
    pub fn samples(&self) -> &[EfficiencySample] {
        &self.samples
    }

    /// The most recent sample.
    pub fn latest(&self) -> Option<&EfficiencySample> {
        self.samples.last()
    }

    /// Discards all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.last = None;
    }
}
