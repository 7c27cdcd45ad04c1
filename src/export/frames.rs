//! Frame planning: maps the playback timeline onto discrete output frame indices.

use crate::foundation::core::Fps;
use crate::render::compositor::FrameContent;
use crate::settings::model::LoopSettings;
use crate::timeline::pass::{PassCursor, TimingPlan};
use crate::timeline::segment::SegmentKind;
use crate::timeline::words::WordSequence;

/// Discretize the playback timeline into an exact frame sequence.
///
/// This is the synthetic clock: no wall time anywhere, so two plans built
/// from identical settings are identical, frame for frame.
///
/// Segment boundaries are quantized cumulatively as
/// `frames(segment) = round(end*fps) - round(start*fps)`, so rounding error
/// never accumulates across a pass. Fades step opacity in equal per-frame
/// increments over their nominal frame count; a time-boxed fade stops
/// stepping at the cut, mid-ramp, exactly where the live path stops.
///
/// An infinite loop renders a single iteration.
pub fn plan_frames(
    plan: &TimingPlan,
    words: &WordSequence,
    start_index: usize,
    looping: &LoopSettings,
    fps: Fps,
) -> Vec<FrameContent> {
    let passes = looping.pass_count().unwrap_or(1);
    let budget = looping.pass_budget_secs(plan);

    let mut frames = Vec::new();
    for _ in 0..passes {
        for timed in PassCursor::new(plan, words, start_index, budget) {
            let segment = timed.segment;
            let first = fps.secs_to_frames_round(timed.start);
            let count = fps.secs_to_frames_round(timed.end()).saturating_sub(first);
            if count == 0 {
                continue;
            }
            // Opacity steps are spread over the segment's nominal frame
            // count; truncation shortens the emitted range, not the ramp.
            let nominal_count = fps
                .secs_to_frames_round(timed.start + timed.nominal_duration)
                .saturating_sub(first)
                .max(count);

            for i in 0..count {
                frames.push(match segment.kind {
                    SegmentKind::FadeIn => {
                        let opacity = i as f64 / nominal_count as f64;
                        FrameContent {
                            word: Some(segment.word_index),
                            opacity,
                            previous: segment
                                .previous_word_index
                                .map(|p| (p, 1.0 - opacity)),
                        }
                    }
                    SegmentKind::Hold => FrameContent {
                        word: Some(segment.word_index),
                        opacity: 1.0,
                        previous: None,
                    },
                    SegmentKind::FadeOut => FrameContent {
                        word: Some(segment.word_index),
                        opacity: 1.0 - i as f64 / nominal_count as f64,
                        previous: None,
                    },
                    SegmentKind::Gap => FrameContent::BLANK,
                });
            }
        }
    }
    frames
}

#[cfg(test)]
#[path = "../../tests/unit/export/frames.rs"]
mod tests;
