use super::*;
use crate::export::sink::InMemorySink;

#[test]
fn empty_word_list_is_rejected_before_anything_starts() {
    let config = PlayerConfig::default();
    let words = WordSequence::from_text("");
    let mut sink = InMemorySink::new();
    let cancel = AtomicBool::new(false);
    let err = export_frames(
        &config,
        &words,
        &mut sink,
        &cancel,
        &mut |_| {},
        &ExportOpts::default(),
    )
    .err()
    .expect("empty word list must fail");
    assert!(matches!(err, WordbeatError::Config(_)));
    assert!(sink.config().is_none(), "the sink must never be started");
}

#[test]
fn missing_font_is_rejected_before_the_sink_starts() {
    let config = PlayerConfig::default();
    let words = WordSequence::from_text("one two");
    let mut sink = InMemorySink::new();
    let cancel = AtomicBool::new(false);
    let err = export_frames(
        &config,
        &words,
        &mut sink,
        &cancel,
        &mut |_| {},
        &ExportOpts::default(),
    )
    .err()
    .expect("missing font must fail");
    assert!(matches!(err, WordbeatError::Config(_)));
    assert!(sink.config().is_none());
}

#[test]
fn zero_threads_is_rejected() {
    assert!(build_thread_pool(Some(0)).is_err());
}

#[test]
fn progress_percent_math() {
    let p = ExportProgress {
        frames_written: 50,
        frames_planned: 200,
    };
    assert_eq!(p.percent(), 25);
    let done = ExportProgress {
        frames_written: 0,
        frames_planned: 0,
    };
    assert_eq!(done.percent(), 100);
}
