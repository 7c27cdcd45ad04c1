//! Musical note values and their conversion to seconds.

use crate::foundation::error::{WordbeatError, WordbeatResult};

/// A musical note value, the unit every display duration is expressed in.
///
/// Conversion to seconds goes through quarter-note multiples: a quarter note
/// is one beat, so `seconds = factor * 60 / bpm`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NoteValue {
    /// Thirty-second note.
    ThirtySecond,
    /// Sixteenth note.
    Sixteenth,
    /// Eighth note.
    Eighth,
    /// Quarter note (one beat).
    Quarter,
    /// Half note.
    Half,
    /// Whole note.
    Whole,
    /// Two whole notes (breve).
    Double,
    /// Four whole notes.
    Quadruple,
    /// Eight whole notes.
    Octuple,
    /// Sixteen whole notes.
    Sexdecuple,
}

impl NoteValue {
    /// Duration in quarter-note multiples.
    pub fn factor(self) -> f64 {
        match self {
            NoteValue::ThirtySecond => 0.125,
            NoteValue::Sixteenth => 0.25,
            NoteValue::Eighth => 0.5,
            NoteValue::Quarter => 1.0,
            NoteValue::Half => 2.0,
            NoteValue::Whole => 4.0,
            NoteValue::Double => 8.0,
            NoteValue::Quadruple => 16.0,
            NoteValue::Octuple => 32.0,
            NoteValue::Sexdecuple => 64.0,
        }
    }

    /// Canonical token as it appears in configuration.
    pub fn token(self) -> &'static str {
        match self {
            NoteValue::ThirtySecond => "1/32",
            NoteValue::Sixteenth => "1/16",
            NoteValue::Eighth => "1/8",
            NoteValue::Quarter => "1/4",
            NoteValue::Half => "1/2",
            NoteValue::Whole => "1",
            NoteValue::Double => "2",
            NoteValue::Quadruple => "4",
            NoteValue::Octuple => "8",
            NoteValue::Sexdecuple => "16",
        }
    }
}

/// Parse a note token; `"none"` and `"0"` mean "no duration" (`Ok(None)`).
pub fn parse_note_token(token: &str) -> WordbeatResult<Option<NoteValue>> {
    let t = token.trim();
    match t {
        "none" | "0" | "" => Ok(None),
        "1/32" => Ok(Some(NoteValue::ThirtySecond)),
        "1/16" => Ok(Some(NoteValue::Sixteenth)),
        "1/8" => Ok(Some(NoteValue::Eighth)),
        "1/4" => Ok(Some(NoteValue::Quarter)),
        "1/2" => Ok(Some(NoteValue::Half)),
        "1" => Ok(Some(NoteValue::Whole)),
        "2" => Ok(Some(NoteValue::Double)),
        "4" => Ok(Some(NoteValue::Quadruple)),
        "8" => Ok(Some(NoteValue::Octuple)),
        "16" => Ok(Some(NoteValue::Sexdecuple)),
        other => Err(WordbeatError::config(format!(
            "unknown note value '{other}'"
        ))),
    }
}

/// Seconds for a note value at `bpm`; `None` (no note) is zero.
pub fn note_to_seconds(note: Option<NoteValue>, bpm: u32) -> f64 {
    match note {
        None => 0.0,
        Some(n) => n.factor() * 60.0 / f64::from(bpm),
    }
}

/// Seconds per beat at `bpm`.
pub fn beat_seconds(bpm: u32) -> f64 {
    60.0 / f64::from(bpm)
}

/// Seconds per bar: `time_sig_num` beats.
pub fn bar_seconds(time_sig_num: u32, bpm: u32) -> f64 {
    f64::from(time_sig_num) * 60.0 / f64::from(bpm)
}

#[cfg(test)]
#[path = "../../tests/unit/timing/note.rs"]
mod tests;
