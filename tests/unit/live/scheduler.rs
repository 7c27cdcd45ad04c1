use super::*;
use crate::settings::model::LoopMode;

/// 1/32 words at 300 bpm: 25ms per word, quick enough for tests.
fn fast_config() -> PlayerConfig {
    let mut config = PlayerConfig::default();
    config.timing.bpm = 300;
    config.timing.word_note = "1/32".to_owned();
    config.timing.fade_in_note = "0".to_owned();
    config.timing.fade_out_note = "0".to_owned();
    config.timing.gap_note = "0".to_owned();
    config.count_in = false;
    config.metronome.enabled = false;
    config
}

#[test]
fn capture_rejects_an_empty_word_list() {
    let words = Arc::new(WordSequence::from_text(""));
    let err = PlaySnapshot::capture(&fast_config(), words)
        .err()
        .expect("empty word list must fail");
    assert!(matches!(err, WordbeatError::Config(_)));
}

#[test]
fn capture_clamps_the_start_word() {
    let words = Arc::new(WordSequence::from_text("a b c"));
    let mut config = fast_config();
    config.start_word = 99;
    let snapshot = PlaySnapshot::capture(&config, words).unwrap();
    assert_eq!(snapshot.start_index, 2);
}

#[test]
fn single_pass_completes_with_ordered_word_progress() {
    let words = Arc::new(WordSequence::from_text("one two three"));
    let snapshot = PlaySnapshot::capture(&fast_config(), words).unwrap();
    let (player, events) = Player::spawn(snapshot);

    let events: Vec<PlayerEvent> = events.into_iter().collect();
    player.join();

    let progress: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            PlayerEvent::WordProgress { current, .. } => Some(*current),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![1, 2, 3]);

    let full_displays = events
        .iter()
        .filter(|e| {
            matches!(
                e,
                PlayerEvent::Display {
                    opacity,
                    ..
                } if *opacity == 1.0
            )
        })
        .count();
    assert_eq!(full_displays, 3, "hold-only words display once each");

    let last_phase = events
        .iter()
        .rev()
        .find_map(|e| match e {
            PlayerEvent::Phase(phase) => Some(*phase),
            _ => None,
        })
        .unwrap();
    assert_eq!(last_phase, Phase::Completed);

    // Beat 0 ticks at pass start, accented.
    let first_tick = events
        .iter()
        .find_map(|e| match e {
            PlayerEvent::Tick { beat, accent, .. } => Some((*beat, *accent)),
            _ => None,
        })
        .unwrap();
    assert_eq!(first_tick, (0, true));
}

#[test]
fn loop_status_counts_passes() {
    let words = Arc::new(WordSequence::from_text("a b"));
    let mut config = fast_config();
    config.looping.enabled = true;
    config.looping.mode = LoopMode::AllWords;
    config.looping.loop_times = 3;
    let snapshot = PlaySnapshot::capture(&config, words).unwrap();
    let (player, events) = Player::spawn(snapshot);

    let events: Vec<PlayerEvent> = events.into_iter().collect();
    player.join();

    let iterations: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            PlayerEvent::LoopStatus { iteration, total } => {
                assert_eq!(*total, Some(3));
                Some(*iteration)
            }
            _ => None,
        })
        .collect();
    assert_eq!(iterations, vec![1, 2, 3]);
}

#[test]
fn stop_interrupts_an_infinite_loop() {
    let words = Arc::new(WordSequence::from_text("a b c d e f g h"));
    let mut config = fast_config();
    config.looping.enabled = true;
    config.looping.infinite = true;
    let snapshot = PlaySnapshot::capture(&config, words).unwrap();
    let (player, events) = Player::spawn(snapshot);

    std::thread::sleep(Duration::from_millis(40));
    player.stop();

    let events: Vec<PlayerEvent> = events.into_iter().collect();
    assert!(!player.is_playing());
    player.join();

    let last_phase = events
        .iter()
        .rev()
        .find_map(|e| match e {
            PlayerEvent::Phase(phase) => Some(*phase),
            _ => None,
        })
        .unwrap();
    assert_eq!(last_phase, Phase::Idle, "stop returns to idle, not completed");
}

#[test]
fn count_in_ticks_precede_the_first_word() {
    let words = Arc::new(WordSequence::from_text("go"));
    let mut config = fast_config();
    config.count_in = true;
    let snapshot = PlaySnapshot::capture(&config, words).unwrap();
    let (player, events) = Player::spawn(snapshot);

    let events: Vec<PlayerEvent> = events.into_iter().collect();
    player.join();

    let count_in_ticks: Vec<(u32, f64)> = events
        .iter()
        .filter_map(|e| match e {
            PlayerEvent::Tick {
                beat,
                bar: -1,
                elapsed,
                ..
            } => Some((*beat, *elapsed)),
            _ => None,
        })
        .collect();
    assert_eq!(count_in_ticks.len(), 4, "one tick per count-in beat at 4/4");
    assert!(count_in_ticks.iter().all(|(_, e)| *e < 0.0));

    let first_display_at = events
        .iter()
        .position(|e| matches!(e, PlayerEvent::Display { .. }))
        .unwrap();
    let last_count_in_at = events
        .iter()
        .rposition(|e| matches!(e, PlayerEvent::Tick { bar: -1, .. }))
        .unwrap();
    assert!(last_count_in_at < first_display_at);
}
