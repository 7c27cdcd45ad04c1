use super::*;

#[test]
fn first_poll_emits_beat_zero_immediately() {
    let mut clock = MetronomeClock::new(0.5, 4);
    let ticks = clock.poll(0.0);
    assert_eq!(ticks.len(), 1);
    assert_eq!(ticks[0].beat_index, 0);
    assert_eq!(ticks[0].beat, 0);
    assert_eq!(ticks[0].bar, 0);
    assert!(ticks[0].accent);
}

#[test]
fn tick_count_over_interval_is_floor_plus_one() {
    // floor(T / spb) + 1 ticks from time 0 inclusive.
    let spb = 0.5;
    let total = 3.2f64;
    let mut clock = MetronomeClock::new(spb, 4);
    let mut count = 0;
    // Fine-grained monotone polling, as the scheduler does.
    let mut t = 0.0;
    while t <= total {
        count += clock.poll(t).len();
        t += 0.01;
    }
    assert_eq!(count as f64, (total / spb).floor() + 1.0);
}

#[test]
fn no_beat_index_is_ever_duplicated_or_skipped() {
    let mut clock = MetronomeClock::new(0.25, 3);
    let mut seen = Vec::new();
    for step in [0.0, 0.1, 0.1, 0.4, 0.9, 0.9, 2.0] {
        for tick in clock.poll(step) {
            seen.push(tick.beat_index);
        }
    }
    let expected: Vec<u64> = (0..=8).collect();
    assert_eq!(seen, expected);
}

#[test]
fn coarse_polls_catch_up_without_losing_ticks() {
    let mut clock = MetronomeClock::new(0.5, 4);
    let ticks = clock.poll(2.6);
    assert_eq!(ticks.len(), 6);
    assert_eq!(ticks.last().unwrap().beat_index, 5);
}

#[test]
fn bars_and_accents_follow_the_time_signature() {
    let mut clock = MetronomeClock::new(0.1, 3);
    let ticks = clock.poll(0.65);
    let beats: Vec<u32> = ticks.iter().map(|t| t.beat).collect();
    assert_eq!(beats, vec![0, 1, 2, 0, 1, 2, 0]);
    let bars: Vec<u64> = ticks.iter().map(|t| t.bar).collect();
    assert_eq!(bars, vec![0, 0, 0, 1, 1, 1, 2]);
    assert!(ticks.iter().all(|t| t.accent == (t.beat == 0)));
}
