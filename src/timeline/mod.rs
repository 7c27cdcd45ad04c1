//! The shared playback timeline: word sequence, segment model, and the
//! per-pass cursor both schedulers consume.

pub mod pass;
pub mod segment;
pub mod words;
