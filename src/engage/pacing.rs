//! Randomized pauses between reads and actions

use super::shutdown::ShutdownSignal;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Inclusive millisecond band a pause is drawn from; `[min, max]` in config files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u64; 2]", into = "[u64; 2]")]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        DelayRange { min_ms, max_ms }
    }

    /// A band that always yields `ms`
    pub const fn fixed(ms: u64) -> Self {
        DelayRange::new(ms, ms)
    }

    pub fn is_valid(&self) -> bool {
        self.min_ms <= self.max_ms
    }
}

impl From<[u64; 2]> for DelayRange {
    fn from([min_ms, max_ms]: [u64; 2]) -> Self {
        DelayRange { min_ms, max_ms }
    }
}

impl From<DelayRange> for [u64; 2] {
    fn from(range: DelayRange) -> Self {
        [range.min_ms, range.max_ms]
    }
}

impl fmt::Display for DelayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}ms", self.min_ms, self.max_ms)
    }
}

/// Source of the loop's pauses.
///
/// `pause` returns the time charged to the pause, which stuck detection
/// accumulates.
pub trait Pacer: Send {
    fn pause(&mut self, range: DelayRange) -> Duration;
}

/// Sleeps for a uniformly drawn duration, cut short by shutdown
pub struct JitterPacer {
    rng: StdRng,
    shutdown: Arc<ShutdownSignal>,
}

impl JitterPacer {
    pub fn new(shutdown: Arc<ShutdownSignal>) -> Self {
        JitterPacer {
            rng: StdRng::from_entropy(),
            shutdown,
        }
    }

    pub fn seeded(shutdown: Arc<ShutdownSignal>, seed: u64) -> Self {
        JitterPacer {
            rng: StdRng::seed_from_u64(seed),
            shutdown,
        }
    }

    fn draw(&mut self, range: DelayRange) -> Duration {
        let ms = if range.min_ms >= range.max_ms {
            range.min_ms
        } else {
            self.rng.gen_range(range.min_ms..=range.max_ms)
        };
        Duration::from_millis(ms)
    }
}

impl Pacer for JitterPacer {
    fn pause(&mut self, range: DelayRange) -> Duration {
        let delay = self.draw(range);
        self.shutdown.wait(delay);
        delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_stays_in_band() {
        let mut pacer = JitterPacer::seeded(Arc::new(ShutdownSignal::new()), 7);
        for _ in 0..200 {
            let d = pacer.draw(DelayRange::new(70, 100));
            assert!(d >= Duration::from_millis(70) && d <= Duration::from_millis(100));
        }
        assert_eq!(pacer.draw(DelayRange::fixed(5)), Duration::from_millis(5));
    }

    #[test]
    fn test_pause_returns_immediately_after_shutdown() {
        let signal = Arc::new(ShutdownSignal::new());
        signal.trigger();
        let mut pacer = JitterPacer::new(signal);

        let start = std::time::Instant::now();
        let charged = pacer.pause(DelayRange::fixed(5_000));
        assert_eq!(charged, Duration::from_millis(5_000));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_range_from_toml_pair() {
        #[derive(Deserialize)]
        struct Wrapper {
            poll: DelayRange,
        }
        let parsed: Wrapper = toml::from_str("poll = [70, 100]").unwrap();
        assert_eq!(parsed.poll, DelayRange::new(70, 100));
        assert!(parsed.poll.is_valid());
        assert!(!DelayRange::new(5, 1).is_valid());
    }
}
