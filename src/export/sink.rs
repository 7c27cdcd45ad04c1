//! Output sinks for exported frames (image sequence and video).

use std::path::PathBuf;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{WordbeatError, WordbeatResult};
use crate::render::compositor::FrameRgba;

/// Configuration handed to a [`FrameSink`] before any frames arrive.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Frames carry a meaningful alpha channel.
    pub transparent: bool,
}

/// Sink contract for consuming rendered frames in timeline order.
///
/// `push_frame` is called in strictly increasing `FrameIndex` order within a
/// single `begin`/`end` bracket.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> WordbeatResult<()>;
    /// Push one frame in strictly increasing timeline order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgba) -> WordbeatResult<()>;
    /// Called once after the last frame, including after a cancel.
    fn end(&mut self) -> WordbeatResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRgba)>,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg.clone()
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, FrameRgba)] {
        &self.frames
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> WordbeatResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgba) -> WordbeatResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> WordbeatResult<()> {
        Ok(())
    }
}

/// Writes each frame as a zero-padded numbered PNG in a directory, created
/// if absent.
#[derive(Debug)]
pub struct ImageSequenceSink {
    dir: PathBuf,
    cfg: Option<SinkConfig>,
}

impl ImageSequenceSink {
    /// Create a sink targeting `dir` (`frame_000000.png`, ...).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cfg: None,
        }
    }

    fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(format!("frame_{:06}.png", idx.0))
    }
}

impl FrameSink for ImageSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> WordbeatResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            WordbeatError::resource(format!(
                "failed to create output directory '{}': {e}",
                self.dir.display()
            ))
        })?;
        self.cfg = Some(cfg);
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgba) -> WordbeatResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| WordbeatError::resource("image sequence sink not started"))?;
        let path = self.frame_path(idx);
        let write = if cfg.transparent {
            image::save_buffer_with_format(
                &path,
                &frame.data,
                frame.width,
                frame.height,
                image::ColorType::Rgba8,
                image::ImageFormat::Png,
            )
        } else {
            // Opaque exports are three-channel; strip the constant alpha.
            let rgb: Vec<u8> = frame
                .data
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect();
            image::save_buffer_with_format(
                &path,
                &rgb,
                frame.width,
                frame.height,
                image::ColorType::Rgb8,
                image::ImageFormat::Png,
            )
        };
        write.map_err(|e| {
            WordbeatError::resource(format!("failed to write '{}': {e}", path.display()))
        })
    }

    fn end(&mut self) -> WordbeatResult<()> {
        self.cfg = None;
        Ok(())
    }
}
