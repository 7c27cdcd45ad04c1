//! The per-pass playback cursor over the timeline.

use std::collections::VecDeque;

use crate::timeline::segment::{Segment, SegmentKind, TimedSegment};
use crate::timeline::words::WordSequence;

/// Shortest Hold a word can collapse to when fades consume its whole note
/// value.
pub const MIN_HOLD_SECS: f64 = 0.01;

/// Tolerance when comparing accumulated pass time against a time-box.
const BUDGET_EPS: f64 = 1e-9;

/// Timing settings resolved to concrete seconds, captured immutably at the
/// start of a playback or export run.
///
/// Mid-run edits to BPM or note values never reach an in-flight pass; both
/// schedulers hold their own copy of this plan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimingPlan {
    /// Validated tempo.
    pub bpm: u32,
    /// Beats per bar.
    pub time_sig_num: u32,
    /// Nominal display duration of one word.
    pub word_secs: f64,
    /// Fade-in span, 0 to disable.
    pub fade_in_secs: f64,
    /// Fade-out span, 0 to disable.
    pub fade_out_secs: f64,
    /// Inter-word gap; negative means the next word's fade-in cross-dissolves
    /// over this word instead of a blank pause.
    pub gap_secs: f64,
    /// `60 / bpm`.
    pub seconds_per_beat: f64,
    /// `time_sig_num * 60 / bpm`.
    pub bar_secs: f64,
}

/// Generate the ordered segments for one word of a pass.
///
/// This is the single authoritative per-word algorithm; the live scheduler
/// and the frame exporter both consume it (through [`PassCursor`]) so their
/// timelines cannot drift apart.
///
/// Shape, in order:
/// 1. FadeIn, if a fade-in span is configured. Under a negative gap it also
///    names the previous word so the renderer cross-dissolves the two.
/// 2. Hold at full opacity. The fade-out span is only subtracted when a
///    FadeOut will actually be emitted, keeping the word's segment total at
///    its nominal duration.
/// 3. FadeOut, only when configured *and* the gap is non-negative: a
///    negative gap absorbs the fade-out role into the next word's FadeIn.
/// 4. Gap, only for a positive gap and only between words, never after the
///    last word of the pass.
pub fn segments_for_word(
    plan: &TimingPlan,
    word_count: usize,
    start_index: usize,
    word_index: usize,
) -> Vec<Segment> {
    let has_previous = word_index > start_index;
    let has_next = word_index + 1 < word_count;
    let crossfade = plan.gap_secs < 0.0 && has_previous;
    let emits_fade_out = plan.fade_out_secs > 0.0 && plan.gap_secs >= 0.0;

    let mut segments = Vec::with_capacity(4);

    if plan.fade_in_secs > 0.0 {
        segments.push(Segment {
            kind: SegmentKind::FadeIn,
            word_index,
            previous_word_index: crossfade.then(|| word_index - 1),
            duration: plan.fade_in_secs,
        });
    }

    let fade_out_span = if emits_fade_out {
        plan.fade_out_secs
    } else {
        0.0
    };
    segments.push(Segment {
        kind: SegmentKind::Hold,
        word_index,
        previous_word_index: None,
        duration: (plan.word_secs - plan.fade_in_secs - fade_out_span).max(MIN_HOLD_SECS),
    });

    if emits_fade_out {
        segments.push(Segment {
            kind: SegmentKind::FadeOut,
            word_index,
            previous_word_index: None,
            duration: plan.fade_out_secs,
        });
    }

    if plan.gap_secs > 0.0 && has_next {
        segments.push(Segment {
            kind: SegmentKind::Gap,
            word_index,
            previous_word_index: None,
            duration: plan.gap_secs,
        });
    }

    segments
}

/// Nominal duration of a full single pass from `start_index`: every word's
/// note value plus one positive gap per word boundary.
pub fn pass_nominal_duration(plan: &TimingPlan, word_count: usize, start_index: usize) -> f64 {
    let n = word_count.saturating_sub(start_index);
    if n == 0 {
        return 0.0;
    }
    n as f64 * plan.word_secs + (n - 1) as f64 * plan.gap_secs.max(0.0)
}

/// Lazily walks one pass of the word list, yielding [`TimedSegment`]s.
///
/// When a `budget` is set (ByBars looping), the pass is time-boxed: the
/// segment that crosses the budget is truncated and the pass ends there,
/// mid-word, pre-empted rather than completed. Truncation happens here, on
/// the shared representation, which is what guarantees the live and export
/// paths cut the same word at the same instant.
pub struct PassCursor<'a> {
    plan: &'a TimingPlan,
    words: &'a WordSequence,
    start_index: usize,
    budget: Option<f64>,
    next_word: usize,
    pending: VecDeque<Segment>,
    cursor: f64,
    exhausted: bool,
}

impl<'a> PassCursor<'a> {
    /// Begin a pass at `start_index` (0-based), optionally time-boxed to
    /// `budget` seconds.
    pub fn new(
        plan: &'a TimingPlan,
        words: &'a WordSequence,
        start_index: usize,
        budget: Option<f64>,
    ) -> Self {
        Self {
            plan,
            words,
            start_index,
            budget,
            next_word: start_index,
            pending: VecDeque::new(),
            cursor: 0.0,
            exhausted: false,
        }
    }

    /// Seconds of timeline already yielded.
    pub fn elapsed(&self) -> f64 {
        self.cursor
    }

    fn budget_left(&self) -> Option<f64> {
        self.budget.map(|b| b - self.cursor)
    }
}

impl Iterator for PassCursor<'_> {
    type Item = TimedSegment;

    fn next(&mut self) -> Option<TimedSegment> {
        if self.exhausted {
            return None;
        }
        if let Some(left) = self.budget_left()
            && left <= BUDGET_EPS
        {
            self.exhausted = true;
            return None;
        }

        if self.pending.is_empty() {
            if self.next_word >= self.words.len() {
                self.exhausted = true;
                return None;
            }
            self.pending = segments_for_word(
                self.plan,
                self.words.len(),
                self.start_index,
                self.next_word,
            )
            .into();
            self.next_word += 1;
        }

        let mut segment = self.pending.pop_front()?;
        let nominal = segment.duration;
        if let Some(left) = self.budget_left()
            && segment.duration > left
        {
            segment.duration = left;
            self.exhausted = true;
        }

        let timed = TimedSegment {
            segment,
            start: self.cursor,
            nominal_duration: nominal,
        };
        self.cursor += segment.duration;
        Some(timed)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/pass.rs"]
mod tests;
