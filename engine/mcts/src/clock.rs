//! Time sources for the search deadline.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// A monotonic time source. Readings are offsets from an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Deterministic clock: every reading returns the current time and then
/// advances it by a fixed tick.
///
/// With a `tick` of 1ms and a 100ms budget the search runs exactly 99 cycles,
/// independent of machine speed.
#[derive(Debug, Clone)]
pub struct StepClock {
    current: Cell<Duration>,
    tick: Duration,
}

impl StepClock {
    pub fn new(tick: Duration) -> Self {
        Self {
            current: Cell::new(Duration::ZERO),
            tick,
        }
    }

    /// Time the next reading will return.
    pub fn peek(&self) -> Duration {
        self.current.get()
    }
}

impl Clock for StepClock {
    fn now(&self) -> Duration {
        let reading = self.current.get();
        self.current.set(reading + self.tick);
        reading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_clock_advances_per_reading() {
        let clock = StepClock::new(Duration::from_millis(5));
        assert_eq!(clock.now(), Duration::ZERO);
        assert_eq!(clock.now(), Duration::from_millis(5));
        assert_eq!(clock.peek(), Duration::from_millis(10));
        assert_eq!(clock.now(), Duration::from_millis(10));
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
