//! Playback clocks driving timeline progression.

use std::time::{Duration, Instant};

/// Monotonic playback clock that freezes while paused.
///
/// Elapsed time is accumulated from measured deltas rather than recomputed
/// from a start timestamp, so pausing never leaks wall-clock time into the
/// timeline. Owned and mutated by a single scheduler thread.
#[derive(Debug)]
pub struct PauseClock {
    accumulated: Duration,
    running_since: Option<Instant>,
}

impl PauseClock {
    /// Start a running clock at elapsed 0.
    pub fn start() -> Self {
        Self {
            accumulated: Duration::ZERO,
            running_since: Some(Instant::now()),
        }
    }

    /// Elapsed unpaused time in seconds.
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }

    /// Elapsed unpaused time.
    pub fn elapsed(&self) -> Duration {
        match self.running_since {
            Some(since) => self.accumulated + since.elapsed(),
            None => self.accumulated,
        }
    }

    /// Freeze the clock. Idempotent.
    pub fn pause(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += since.elapsed();
        }
    }

    /// Resume after a pause. Idempotent.
    pub fn resume(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(Instant::now());
        }
    }

    /// `true` while frozen.
    pub fn is_paused(&self) -> bool {
        self.running_since.is_none()
    }
}
