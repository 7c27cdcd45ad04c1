//! Optional metronome click output.

pub mod click;
