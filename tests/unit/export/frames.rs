use super::*;
use crate::settings::model::LoopMode;

fn plan(word: f64, fade_in: f64, fade_out: f64, gap: f64) -> TimingPlan {
    TimingPlan {
        bpm: 120,
        time_sig_num: 4,
        word_secs: word,
        fade_in_secs: fade_in,
        fade_out_secs: fade_out,
        gap_secs: gap,
        seconds_per_beat: 0.5,
        bar_secs: 2.0,
    }
}

fn no_loop() -> LoopSettings {
    LoopSettings {
        enabled: false,
        ..LoopSettings::default()
    }
}

fn by_bars(bars: u32, times: u32, infinite: bool) -> LoopSettings {
    LoopSettings {
        enabled: true,
        mode: LoopMode::ByBars,
        loop_bars: bars,
        loop_times: times,
        infinite,
    }
}

fn fps30() -> Fps {
    Fps::whole(30).unwrap()
}

#[test]
fn identical_settings_produce_identical_plans() {
    let p = plan(0.5, 0.125, 0.125, 0.25);
    let words = WordSequence::from_text("alpha beta gamma");
    let a = plan_frames(&p, &words, 0, &no_loop(), fps30());
    let b = plan_frames(&p, &words, 0, &no_loop(), fps30());
    assert_eq!(a, b);
    assert!(!a.is_empty());
}

#[test]
fn hold_only_words_quantize_to_exact_frame_runs() {
    let p = plan(0.5, 0.0, 0.0, 0.0);
    let words = WordSequence::from_text("one two three");
    let frames = plan_frames(&p, &words, 0, &no_loop(), fps30());
    assert_eq!(frames.len(), 45);
    for (i, frame) in frames.iter().enumerate() {
        assert_eq!(frame.word, Some(i / 15));
        assert_eq!(frame.opacity, 1.0);
        assert_eq!(frame.previous, None);
    }
}

#[test]
fn fade_frames_step_opacity_in_equal_increments() {
    let p = plan(1.0, 0.5, 0.0, 0.0);
    let words = WordSequence::from_text("solo");
    let frames = plan_frames(&p, &words, 0, &no_loop(), fps30());
    // 0.5s fade = 15 frames, then 0.5s hold = 15 frames.
    assert_eq!(frames.len(), 30);
    for (i, frame) in frames.iter().take(15).enumerate() {
        assert_eq!(frame.opacity, i as f64 / 15.0);
    }
    assert!(frames[15..].iter().all(|f| f.opacity == 1.0));
}

#[test]
fn cross_dissolve_opacities_sum_to_one_exactly_when_gap_is_negative() {
    let p = plan(0.5, 0.25, 0.25, -0.125);
    let words = WordSequence::from_text("a b c");
    let frames = plan_frames(&p, &words, 0, &no_loop(), fps30());
    let mut dissolve_frames = 0;
    for frame in &frames {
        if let Some((prev, prev_opacity)) = frame.previous {
            assert_eq!(prev + 1, frame.word.unwrap());
            assert_eq!(frame.opacity + prev_opacity, 1.0);
            dissolve_frames += 1;
        }
    }
    assert!(dissolve_frames > 0, "negative gap must cross-dissolve");

    // And never when the gap is non-negative.
    let p = plan(0.5, 0.25, 0.25, 0.125);
    let frames = plan_frames(&p, &words, 0, &no_loop(), fps30());
    assert!(frames.iter().all(|f| f.previous.is_none()));
}

#[test]
fn positive_gap_renders_blank_frames_between_words() {
    let p = plan(0.5, 0.0, 0.0, 0.2);
    let words = WordSequence::from_text("x y");
    let frames = plan_frames(&p, &words, 0, &no_loop(), fps30());
    // 15 + 6 + 15 frames; no trailing gap.
    assert_eq!(frames.len(), 36);
    assert!(frames[15..21].iter().all(|f| *f == FrameContent::BLANK));
    assert_eq!(frames[21].word, Some(1));
}

#[test]
fn bar_budget_cuts_the_pass_at_an_exact_frame() {
    // 1 bar at 4/4, 120 bpm = 2.0s = 60 frames; 1.0s words.
    let p = plan(1.0, 0.0, 0.0, 0.0);
    let words = WordSequence::from_text("a b c d e");
    let frames = plan_frames(&p, &words, 0, &by_bars(1, 1, false), fps30());
    assert_eq!(frames.len(), 60);
    assert!(frames[..30].iter().all(|f| f.word == Some(0)));
    assert!(frames[30..].iter().all(|f| f.word == Some(1)));
}

#[test]
fn bar_budget_shorter_than_one_word_emits_fewer_frames_than_the_word() {
    let mut p = plan(1.0, 0.0, 0.0, 0.0);
    p.bar_secs = 0.4;
    let words = WordSequence::from_text("a b");
    let frames = plan_frames(&p, &words, 0, &by_bars(1, 1, false), fps30());
    assert_eq!(frames.len(), 12);
    assert!(frames.len() < 30, "must truncate inside the first word");
    assert!(frames.iter().all(|f| f.word == Some(0)));
}

#[test]
fn loop_times_repeat_the_pass_verbatim() {
    let p = plan(1.0, 0.0, 0.0, 0.0);
    let words = WordSequence::from_text("a b c");
    let frames = plan_frames(&p, &words, 0, &by_bars(1, 2, false), fps30());
    assert_eq!(frames.len(), 120);
    assert_eq!(frames[..60], frames[60..]);
}

#[test]
fn infinite_loop_exports_exactly_one_pass() {
    let p = plan(1.0, 0.0, 0.0, 0.0);
    let words = WordSequence::from_text("a b c");
    let finite = plan_frames(&p, &words, 0, &by_bars(1, 1, false), fps30());
    let infinite = plan_frames(&p, &words, 0, &by_bars(1, 5, true), fps30());
    assert_eq!(finite, infinite);
}
