use super::*;

#[test]
fn quarter_note_at_120_is_half_a_second() {
    let quarter = parse_note_token("1/4").unwrap();
    assert_eq!(note_to_seconds(quarter, 120), 0.5);
}

#[test]
fn none_token_is_zero_at_any_bpm() {
    assert_eq!(note_to_seconds(parse_note_token("none").unwrap(), 20), 0.0);
    assert_eq!(note_to_seconds(parse_note_token("0").unwrap(), 300), 0.0);
}

#[test]
fn bar_of_four_beats_at_120_is_two_seconds() {
    assert_eq!(bar_seconds(4, 120), 2.0);
    assert_eq!(beat_seconds(120), 0.5);
}

#[test]
fn factors_are_quarter_note_multiples() {
    assert_eq!(NoteValue::ThirtySecond.factor(), 0.125);
    assert_eq!(NoteValue::Quarter.factor(), 1.0);
    assert_eq!(NoteValue::Whole.factor(), 4.0);
    assert_eq!(NoteValue::Sexdecuple.factor(), 64.0);
}

#[test]
fn every_token_round_trips() {
    for token in ["1/32", "1/16", "1/8", "1/4", "1/2", "1", "2", "4", "8", "16"] {
        let note = parse_note_token(token).unwrap().unwrap();
        assert_eq!(note.token(), token);
    }
}

#[test]
fn malformed_tokens_are_rejected() {
    assert!(parse_note_token("1/3").is_err());
    assert!(parse_note_token("quarter").is_err());
    assert!(parse_note_token("-1/4").is_err());
}

#[test]
fn doubling_the_tempo_halves_every_duration() {
    for token in ["1/16", "1/4", "2"] {
        let note = parse_note_token(token).unwrap();
        let slow = note_to_seconds(note, 60);
        let fast = note_to_seconds(note, 120);
        assert!((slow - 2.0 * fast).abs() < 1e-12);
    }
}
