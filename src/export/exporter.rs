//! Export orchestration: drives frame planning and parallel rendering to a sink.

use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::export::frames::plan_frames;
use crate::export::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{WordbeatError, WordbeatResult};
use crate::render::compositor::{Compositor, FrameRgba};
use crate::settings::model::PlayerConfig;
use crate::timeline::words::WordSequence;

/// Options controlling export execution (not output content: two exports
/// with the same settings produce byte-identical frames whatever these say).
#[derive(Clone, Debug)]
pub struct ExportOpts {
    /// Render frames in parallel with rayon.
    pub parallel: bool,
    /// Override the number of rayon worker threads; `None` uses defaults.
    pub threads: Option<usize>,
    /// Frames rendered per batch in parallel mode; also the cancellation
    /// granularity there.
    pub chunk_size: usize,
}

impl Default for ExportOpts {
    fn default() -> Self {
        Self {
            parallel: false,
            threads: None,
            chunk_size: 64,
        }
    }
}

/// A progress report, emitted after every frame reaches the sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportProgress {
    /// Frames already delivered.
    pub frames_written: u64,
    /// Total frames the plan contains.
    pub frames_planned: u64,
}

impl ExportProgress {
    /// Whole percent complete.
    pub fn percent(&self) -> u8 {
        if self.frames_planned == 0 {
            return 100;
        }
        ((self.frames_written * 100) / self.frames_planned).min(100) as u8
    }
}

/// Final export outcome.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportStats {
    /// Frames delivered to the sink.
    pub frames_written: u64,
    /// Frames the plan contained.
    pub frames_planned: u64,
    /// The cancel flag ended the run early. Not an error: the sink is still
    /// finalized cleanly around whatever was written.
    pub cancelled: bool,
}

/// Render the configured timeline offline into `sink`.
///
/// Fully deterministic: the frame plan is a pure function of the settings
/// and the compositor is a pure function of the plan, so repeated runs are
/// byte-identical. `cancel` is the single cooperative-cancellation signal,
/// checked between frames (between chunks in parallel mode).
pub fn export_frames(
    config: &PlayerConfig,
    words: &WordSequence,
    sink: &mut dyn FrameSink,
    cancel: &AtomicBool,
    on_progress: &mut dyn FnMut(ExportProgress),
    opts: &ExportOpts,
) -> WordbeatResult<ExportStats> {
    if words.is_empty() {
        return Err(WordbeatError::config("cannot export an empty word list"));
    }
    let plan = config.resolve_timing()?;
    let (fps, canvas) = config.export.resolve(&config.appearance)?;
    let transparent = config.export.transparent_background;
    let start_index = words.clamp_start_index(config.start_word);

    let compositor = Compositor::new(canvas, &config.appearance, transparent, words)?;
    let specs = plan_frames(&plan, words, start_index, &config.looping, fps);
    let frames_planned = specs.len() as u64;
    info!(frames = frames_planned, fps = fps.as_f64(), "starting export");

    sink.begin(SinkConfig {
        width: canvas.width,
        height: canvas.height,
        fps,
        transparent,
    })?;

    let mut written = 0u64;
    let mut push = |sink: &mut dyn FrameSink,
                    written: &mut u64,
                    idx: u64,
                    frame: &FrameRgba|
     -> WordbeatResult<()> {
        sink.push_frame(FrameIndex(idx), frame).map_err(|e| {
            WordbeatError::resource(format!("export aborted after {written} frames: {e}"))
        })?;
        *written += 1;
        on_progress(ExportProgress {
            frames_written: *written,
            frames_planned,
        });
        Ok(())
    };

    let mut cancelled = false;
    if opts.parallel {
        let pool = build_thread_pool(opts.threads)?;
        let chunk_size = opts.chunk_size.max(1);
        for (chunk_no, chunk) in specs.chunks(chunk_size).enumerate() {
            if cancel.load(Ordering::Acquire) {
                cancelled = true;
                break;
            }
            let rendered: Vec<_> = pool.install(|| {
                chunk
                    .par_iter()
                    .map(|spec| compositor.render(spec))
                    .collect()
            });
            for (i, frame) in rendered.iter().enumerate() {
                let idx = (chunk_no * chunk_size + i) as u64;
                push(sink, &mut written, idx, frame)?;
            }
        }
    } else {
        for (idx, spec) in specs.iter().enumerate() {
            if cancel.load(Ordering::Acquire) {
                cancelled = true;
                break;
            }
            let frame = compositor.render(spec);
            push(sink, &mut written, idx as u64, &frame)?;
        }
    }

    sink.end()?;
    if cancelled {
        debug!(written, "export cancelled");
    } else {
        info!(written, "export complete");
    }
    Ok(ExportStats {
        frames_written: written,
        frames_planned,
        cancelled,
    })
}

fn build_thread_pool(threads: Option<usize>) -> WordbeatResult<rayon::ThreadPool> {
    if threads == Some(0) {
        return Err(WordbeatError::config(
            "export 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| WordbeatError::resource(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/export/exporter.rs"]
mod tests;
