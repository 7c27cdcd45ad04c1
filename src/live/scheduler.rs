//! The real-time playback scheduler thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::audio::click::MetronomeAudio;
use crate::foundation::error::{WordbeatError, WordbeatResult};
use crate::live::events::{Phase, PlayerEvent};
use crate::settings::model::{LoopSettings, MetronomeSettings, PlayerConfig};
use crate::timeline::pass::{PassCursor, TimingPlan};
use crate::timeline::segment::{SegmentKind, TimedSegment};
use crate::timeline::words::WordSequence;
use crate::timing::clock::PauseClock;
use crate::timing::metronome::MetronomeClock;

/// Display updates per fade, bounding event volume on slow fades.
pub const FADE_STEPS: u32 = 20;

/// Cooperative-cancellation poll interval inside timing loops.
const POLL: Duration = Duration::from_millis(1);
/// Poll interval while paused.
const PAUSE_POLL: Duration = Duration::from_millis(10);

/// Immutable configuration snapshot a playback run is started from.
///
/// Captured once at `play()`; edits to the live settings after that cannot
/// reach the in-flight run.
#[derive(Clone, Debug)]
pub struct PlaySnapshot {
    /// Resolved timing.
    pub plan: TimingPlan,
    /// Words to traverse.
    pub words: Arc<WordSequence>,
    /// 0-based first word of each pass.
    pub start_index: usize,
    /// Loop policy.
    pub looping: LoopSettings,
    /// Play a silent count-in bar first.
    pub count_in: bool,
    /// Click settings.
    pub metronome: MetronomeSettings,
}

impl PlaySnapshot {
    /// Validate `config` against `words` and capture a run snapshot.
    pub fn capture(config: &PlayerConfig, words: Arc<WordSequence>) -> WordbeatResult<Self> {
        if words.is_empty() {
            return Err(WordbeatError::config("cannot play an empty word list"));
        }
        let plan = config.resolve_timing()?;
        let start_index = words.clamp_start_index(config.start_word);
        Ok(Self {
            plan,
            words,
            start_index,
            looping: config.looping,
            count_in: config.count_in,
            metronome: config.metronome,
        })
    }
}

/// Shared control flags, the only mutable state crossing thread boundaries.
#[derive(Debug, Default)]
struct Flags {
    playing: AtomicBool,
    paused: AtomicBool,
}

impl Flags {
    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }
}

/// Handle to a live playback run on its background thread.
///
/// The thread owns all playback state and publishes [`PlayerEvent`]s through
/// the channel returned by [`Player::spawn`]. Dropping the handle stops the
/// run.
pub struct Player {
    flags: Arc<Flags>,
    handle: Option<JoinHandle<()>>,
}

impl Player {
    /// Start a playback run, returning the handle and the event stream.
    pub fn spawn(snapshot: PlaySnapshot) -> (Self, Receiver<PlayerEvent>) {
        let flags = Arc::new(Flags {
            playing: AtomicBool::new(true),
            paused: AtomicBool::new(false),
        });
        let (tx, rx) = mpsc::channel();
        let driver_flags = flags.clone();
        let handle = std::thread::spawn(move || {
            Driver::new(snapshot, driver_flags, tx).run();
        });
        (
            Self {
                flags,
                handle: Some(handle),
            },
            rx,
        )
    }

    /// Freeze time advancement; the current segment finishes first.
    pub fn pause(&self) {
        self.flags.paused.store(true, Ordering::Release);
    }

    /// Resume after a pause.
    pub fn resume(&self) {
        self.flags.paused.store(false, Ordering::Release);
    }

    /// Cooperatively cancel the run. Perceived within a few milliseconds.
    pub fn stop(&self) {
        self.flags.paused.store(false, Ordering::Release);
        self.flags.playing.store(false, Ordering::Release);
    }

    /// `true` until the run ends, naturally or by stop.
    pub fn is_playing(&self) -> bool {
        self.flags.is_playing()
    }

    /// `true` while paused.
    pub fn is_paused(&self) -> bool {
        self.flags.is_paused()
    }

    /// Wait for the run to end without cancelling it.
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// How a driver step ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    /// Keep driving.
    Continue,
    /// The stop flag was raised.
    Stopped,
    /// The observer dropped its receiver; nobody is listening.
    Detached,
}

/// The playback thread: owns the clock, the metronome and all pass state.
struct Driver {
    snapshot: PlaySnapshot,
    flags: Arc<Flags>,
    tx: Sender<PlayerEvent>,
    audio: MetronomeAudio,
}

impl Driver {
    fn new(snapshot: PlaySnapshot, flags: Arc<Flags>, tx: Sender<PlayerEvent>) -> Self {
        let audio = if snapshot.metronome.enabled {
            MetronomeAudio::open(snapshot.metronome.volume)
        } else {
            MetronomeAudio::disabled()
        };
        Self {
            snapshot,
            flags,
            tx,
            audio,
        }
    }

    fn run(mut self) {
        let end = self.drive();
        self.flags.playing.store(false, Ordering::Release);
        self.flags.paused.store(false, Ordering::Release);
        match end {
            Step::Continue => {
                let _ = self.tx.send(PlayerEvent::Phase(Phase::Completed));
            }
            Step::Stopped => {
                let _ = self.tx.send(PlayerEvent::Phase(Phase::Idle));
            }
            Step::Detached => debug!("live observer went away; playback thread exiting"),
        }
    }

    /// Drive count-in and passes to their natural end.
    fn drive(&mut self) -> Step {
        if self.snapshot.count_in {
            match self.count_in() {
                Step::Continue => {}
                halted => return halted,
            }
        }

        if !self.send(PlayerEvent::Phase(Phase::Playing)) {
            return Step::Detached;
        }

        let limit = self.snapshot.looping.pass_count();
        let mut iteration = 0u32;
        loop {
            if !self.send(PlayerEvent::LoopStatus {
                iteration: iteration + 1,
                total: limit,
            }) {
                return Step::Detached;
            }
            match self.play_pass() {
                Step::Continue => {}
                halted => return halted,
            }
            iteration += 1;
            if let Some(limit) = limit
                && iteration >= limit
            {
                return Step::Continue;
            }
        }
    }

    /// The silent count-in bar: one click per beat, no word displayed,
    /// negative elapsed reported so observers can show time-to-start.
    fn count_in(&mut self) -> Step {
        if !self.send(PlayerEvent::Phase(Phase::CountIn)) {
            return Step::Detached;
        }
        let beats = self.snapshot.plan.time_sig_num;
        let spb = self.snapshot.plan.seconds_per_beat;
        for beat in 0..beats {
            if !self.flags.is_playing() {
                return Step::Stopped;
            }
            self.audio.click(beat == 0);
            if !self.send(PlayerEvent::Tick {
                beat,
                bar: -1,
                elapsed: -f64::from(beats - beat) * spb,
                accent: beat == 0,
            }) {
                return Step::Detached;
            }
            let started = Instant::now();
            while started.elapsed().as_secs_f64() < spb {
                if !self.flags.is_playing() {
                    return Step::Stopped;
                }
                std::thread::sleep(POLL);
            }
        }
        Step::Continue
    }

    /// One pass over the word list, time-boxed by the loop settings.
    fn play_pass(&mut self) -> Step {
        let plan = self.snapshot.plan;
        let words = self.snapshot.words.clone();
        let start = self.snapshot.start_index;
        let total = words.len() - start;
        let budget = self.snapshot.looping.pass_budget_secs(&plan);

        let mut clock = PauseClock::start();
        let mut metronome = MetronomeClock::new(plan.seconds_per_beat, plan.time_sig_num);
        let mut current_word: Option<usize> = None;

        for timed in PassCursor::new(&plan, &words, start, budget) {
            match self.pause_point(&mut clock) {
                Step::Continue => {}
                halted => return halted,
            }

            let segment = timed.segment;
            if segment.kind != SegmentKind::Gap && current_word != Some(segment.word_index) {
                current_word = Some(segment.word_index);
                if !self.send(PlayerEvent::WordProgress {
                    current: segment.word_index - start + 1,
                    total,
                }) {
                    return Step::Detached;
                }
            }

            let step = match segment.kind {
                SegmentKind::FadeIn => self.run_fade(&mut clock, &mut metronome, &timed, true),
                SegmentKind::FadeOut => self.run_fade(&mut clock, &mut metronome, &timed, false),
                SegmentKind::Hold => {
                    if !self.send(PlayerEvent::Display {
                        word_index: segment.word_index,
                        opacity: 1.0,
                        previous: None,
                    }) {
                        return Step::Detached;
                    }
                    self.wait_until(&mut clock, &mut metronome, timed.end())
                }
                SegmentKind::Gap => {
                    if !self.send(PlayerEvent::Clear) {
                        return Step::Detached;
                    }
                    self.wait_until(&mut clock, &mut metronome, timed.end())
                }
            };
            match step {
                Step::Continue => {}
                halted => return halted,
            }
        }
        Step::Continue
    }

    /// Honor a pause request between segments, freezing the pass clock.
    fn pause_point(&mut self, clock: &mut PauseClock) -> Step {
        if !self.flags.is_playing() {
            return Step::Stopped;
        }
        if !self.flags.is_paused() {
            return Step::Continue;
        }
        clock.pause();
        if !self.send(PlayerEvent::Phase(Phase::Paused)) {
            return Step::Detached;
        }
        while self.flags.is_paused() && self.flags.is_playing() {
            std::thread::sleep(PAUSE_POLL);
        }
        clock.resume();
        if !self.flags.is_playing() {
            return Step::Stopped;
        }
        if !self.send(PlayerEvent::Phase(Phase::Playing)) {
            return Step::Detached;
        }
        Step::Continue
    }

    /// Step a fade's opacity in [`FADE_STEPS`] increments against the clock.
    ///
    /// A time-boxed (truncated) fade simply stops stepping at the cut; the
    /// opacity ramp itself still follows the nominal duration so the visible
    /// rate never changes.
    fn run_fade(
        &mut self,
        clock: &mut PauseClock,
        metronome: &mut MetronomeClock,
        timed: &TimedSegment,
        rising: bool,
    ) -> Step {
        let segment = timed.segment;
        for i in 0..=FADE_STEPS {
            let t = f64::from(i) / f64::from(FADE_STEPS);
            let offset = timed.nominal_duration * t;
            if offset > segment.duration + 1e-9 {
                break;
            }
            match self.wait_until(clock, metronome, timed.start + offset) {
                Step::Continue => {}
                halted => return halted,
            }
            let opacity = if rising { t } else { 1.0 - t };
            if !self.send(PlayerEvent::Display {
                word_index: segment.word_index,
                opacity,
                previous: segment.previous_word_index.map(|p| (p, 1.0 - opacity)),
            }) {
                return Step::Detached;
            }
        }
        Step::Continue
    }

    /// Sleep-poll until the pass clock reaches `target`, servicing metronome
    /// ticks and the stop flag at millisecond granularity.
    fn wait_until(
        &mut self,
        clock: &mut PauseClock,
        metronome: &mut MetronomeClock,
        target: f64,
    ) -> Step {
        loop {
            let now = clock.elapsed_secs();
            for tick in metronome.poll(now) {
                self.audio.click(tick.accent);
                if !self.send(PlayerEvent::Tick {
                    beat: tick.beat,
                    bar: tick.bar as i64,
                    elapsed: tick.due_at,
                    accent: tick.accent,
                }) {
                    return Step::Detached;
                }
            }
            if now + 1e-9 >= target {
                return Step::Continue;
            }
            if !self.flags.is_playing() {
                return Step::Stopped;
            }
            std::thread::sleep(POLL);
        }
    }

    fn send(&self, event: PlayerEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/live/scheduler.rs"]
mod tests;
