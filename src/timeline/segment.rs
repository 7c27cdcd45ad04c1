//! The per-word segment model and its render phases.

/// The phase a [`Segment`] renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentKind {
    /// Incoming word opacity rises 0 → 1. Cross-dissolves with the previous
    /// word when [`Segment::previous_word_index`] is set.
    FadeIn,
    /// Word at full opacity.
    Hold,
    /// Word opacity falls 1 → 0.
    FadeOut,
    /// Blank display between words.
    Gap,
}

/// One timed phase of a single word's display.
///
/// Segments are generated lazily per word as playback advances, consumed
/// immediately by whichever scheduler requested them, and never persisted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    /// Phase kind.
    pub kind: SegmentKind,
    /// 0-based index of the word this segment displays.
    pub word_index: usize,
    /// Outgoing word for a negative-gap cross-dissolve, if any.
    ///
    /// Only ever set on [`SegmentKind::FadeIn`] segments: while the incoming
    /// word's opacity rises `t`, the outgoing word's falls `1 - t`, so the
    /// two always sum to one.
    pub previous_word_index: Option<usize>,
    /// Segment duration in seconds, always `>= 0`.
    pub duration: f64,
}

/// A [`Segment`] placed on the pass timeline, possibly clipped by a time-box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimedSegment {
    /// The segment itself, with `duration` already clipped.
    pub segment: Segment,
    /// Start offset in seconds from the beginning of the pass.
    pub start: f64,
    /// Unclipped duration the segment was generated with.
    pub nominal_duration: f64,
}

impl TimedSegment {
    /// End offset in seconds from the beginning of the pass.
    pub fn end(&self) -> f64 {
        self.start + self.segment.duration
    }

    /// `true` when the time-box cut this segment short.
    pub fn is_truncated(&self) -> bool {
        self.segment.duration < self.nominal_duration
    }
}
