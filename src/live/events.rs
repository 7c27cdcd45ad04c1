//! Observer events emitted by the live playback scheduler.

/// Scheduler lifecycle phase.
///
/// Transitions: `Idle → CountIn? → Playing ⇄ Paused → Completed`, with stop
/// returning to `Idle` from any non-idle phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Nothing scheduled.
    Idle,
    /// Silent count-in bar before the first pass.
    CountIn,
    /// Driving the timeline.
    Playing,
    /// Time frozen, awaiting resume.
    Paused,
    /// Natural end of playback; terminal until the next play.
    Completed,
}

/// Events the live scheduler publishes to its observer.
///
/// The scheduler never mutates display state itself: it only posts these,
/// and the controlling context drains the channel and applies them. That
/// keeps timing correctness independent of rendering latency.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlayerEvent {
    /// Lifecycle transition.
    Phase(Phase),
    /// Show a word at an opacity, optionally cross-dissolving over the
    /// outgoing word.
    Display {
        /// 0-based index of the word to show.
        word_index: usize,
        /// Incoming word opacity in [0, 1].
        opacity: f64,
        /// Outgoing word and its opacity during a negative-gap dissolve.
        previous: Option<(usize, f64)>,
    },
    /// Blank the display (positive gap).
    Clear,
    /// A new word started, `current` of `total` within the pass (1-based).
    WordProgress {
        /// 1-based position within the pass.
        current: usize,
        /// Words in the pass.
        total: usize,
    },
    /// Metronome beat boundary crossed.
    Tick {
        /// Beat within the bar, 0-based.
        beat: u32,
        /// 0-based bar number; -1 during the count-in.
        bar: i64,
        /// Seconds since the pass started; negative during the count-in.
        elapsed: f64,
        /// First beat of the bar.
        accent: bool,
    },
    /// A pass started.
    LoopStatus {
        /// 1-based loop iteration.
        iteration: u32,
        /// Total passes, `None` when looping until stopped.
        total: Option<u32>,
    },
}
