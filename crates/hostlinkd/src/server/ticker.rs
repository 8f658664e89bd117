//! Tick sources driving [`Server::run`](super::Server::run).

use std::thread;
use std::time::{Duration, Instant};

/// Periodic-callback facility that paces the scheduler loop.
pub trait TickSource {
    /// Waits for the next tick and returns the time elapsed since the
    /// previous one.
    fn next_tick(&mut self) -> Duration;
}

/// Ticks at a fixed wall-clock interval by sleeping on the calling thread.
///
/// A tick that overruns its slot is followed immediately by the next one;
/// the reported delta always reflects real elapsed time.
#[derive(Debug)]
pub struct IntervalTicker {
    interval: Duration,
    last: Instant,
}

impl IntervalTicker {
    /// Creates a ticker whose first tick is due one `interval` from now.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Instant::now(),
        }
    }

    /// Configured interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

impl TickSource for IntervalTicker {
    fn next_tick(&mut self) -> Duration {
        if let Some(due) = self.last.checked_add(self.interval) {
            let now = Instant::now();
            if due > now {
                thread::sleep(due - now);
            }
        }
        let now = Instant::now();
        let delta = now.saturating_duration_since(self.last);
        self.last = now;
        delta
    }
}
