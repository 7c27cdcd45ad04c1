//! The metronome and beat-crossing detection.

/// One metronome beat crossed by a poll.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tick {
    /// Absolute 0-based beat index since the clock started.
    pub beat_index: u64,
    /// Beat within the bar, `0..time_sig_num`.
    pub beat: u32,
    /// 0-based bar number.
    pub bar: u64,
    /// `true` on the first beat of each bar.
    pub accent: bool,
    /// Elapsed seconds the tick is due at (`beat_index * seconds_per_beat`).
    pub due_at: f64,
}

/// Maps elapsed playback time to (beat, bar) pairs.
///
/// The clock is not self-driven: the scheduler polls it at whatever cadence
/// it likes. Each poll emits every beat boundary crossed since the previous
/// poll, exactly once, provided elapsed values are monotonically
/// non-decreasing. Beat 0 is due at elapsed 0, so the very first poll emits
/// it immediately.
#[derive(Debug)]
pub struct MetronomeClock {
    seconds_per_beat: f64,
    time_sig_num: u32,
    next_beat: u64,
}

impl MetronomeClock {
    /// Create a clock for `time_sig_num` beats per bar at `seconds_per_beat`.
    pub fn new(seconds_per_beat: f64, time_sig_num: u32) -> Self {
        debug_assert!(seconds_per_beat > 0.0);
        debug_assert!(time_sig_num > 0);
        Self {
            seconds_per_beat,
            time_sig_num,
            next_beat: 0,
        }
    }

    /// Emit all ticks due at or before `elapsed` seconds.
    pub fn poll(&mut self, elapsed: f64) -> Vec<Tick> {
        let mut ticks = Vec::new();
        loop {
            let due_at = self.next_beat as f64 * self.seconds_per_beat;
            if due_at > elapsed {
                break;
            }
            let beat = (self.next_beat % u64::from(self.time_sig_num)) as u32;
            ticks.push(Tick {
                beat_index: self.next_beat,
                beat,
                bar: self.next_beat / u64::from(self.time_sig_num),
                accent: beat == 0,
                due_at,
            });
            self.next_beat += 1;
        }
        ticks
    }

    /// Beat index the next poll can emit (number of ticks emitted so far).
    pub fn ticks_emitted(&self) -> u64 {
        self.next_beat
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timing/metronome.rs"]
mod tests;
