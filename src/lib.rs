//! Wordbeat displays a word sequence one word at a time, paced by a musical
//! time model (BPM, time signature, note-value durations), with cross-fade
//! transitions, optional negative-gap overlap and section looping. It also
//! renders the same timeline offline into a video file or image sequence,
//! bit-for-bit consistent with the live preview.
//!
//! The public API is run-oriented:
//!
//! - Validate a [`PlayerConfig`] and load a [`WordSequence`]
//! - Live: capture a [`PlaySnapshot`], spawn a [`Player`], drain its
//!   [`PlayerEvent`] channel
//! - Offline: call [`export_frames`] with a [`FrameSink`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod audio;
pub mod export;
pub mod foundation;
pub mod live;
pub mod render;
pub mod settings;
pub mod timeline;
pub mod timing;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Rgb8};
pub use crate::foundation::error::{WordbeatError, WordbeatResult};

pub use crate::export::exporter::{ExportOpts, ExportProgress, ExportStats, export_frames};
pub use crate::export::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::export::sink::{FrameSink, ImageSequenceSink, InMemorySink, SinkConfig};
pub use crate::live::events::{Phase, PlayerEvent};
pub use crate::live::scheduler::{FADE_STEPS, PlaySnapshot, Player};
pub use crate::render::blend::blend;
pub use crate::settings::model::{ExportFormat, LoopMode, PlayerConfig};
pub use crate::timeline::words::WordSequence;
