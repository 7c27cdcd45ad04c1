//! ffmpeg process wiring for encoding exported frames into a video file.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::export::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{WordbeatError, WordbeatResult};
use crate::render::compositor::FrameRgba;
use crate::settings::model::ExportFormat;

/// Options for [`FfmpegSink`] container output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output file path.
    pub out_path: PathBuf,
    /// Target container; must be a container format, not an image sequence.
    pub format: ExportFormat,
    /// Overwrite the output file if it already exists.
    pub overwrite: bool,
}

impl FfmpegSinkOpts {
    /// Create options for `out_path` in `format`.
    pub fn new(out_path: impl Into<PathBuf>, format: ExportFormat) -> Self {
        Self {
            out_path: out_path.into(),
            format,
            overwrite: true,
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw RGBA frames to its
/// stdin.
///
/// Codec selection follows the container: mp4/mov use libx264 + yuv420p (so
/// dimensions must be even), avi uses mpeg4; transparent mov/avi switch to
/// the png codec, which keeps the alpha channel.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            cfg: None,
            last_idx: None,
        }
    }

    /// Codec arguments for the configured container/transparency pair.
    fn codec_args(&self, transparent: bool) -> WordbeatResult<Vec<&'static str>> {
        let args = match (self.opts.format, transparent) {
            (ExportFormat::Mp4, false) => {
                vec!["-an", "-c:v", "libx264", "-pix_fmt", "yuv420p", "-movflags", "+faststart"]
            }
            (ExportFormat::Mov, false) => {
                vec!["-an", "-c:v", "libx264", "-pix_fmt", "yuv420p", "-movflags", "+faststart"]
            }
            (ExportFormat::Avi, false) => vec!["-an", "-c:v", "mpeg4", "-pix_fmt", "yuv420p"],
            // The png codec carries RGBA through mov/avi containers.
            (ExportFormat::Mov, true) | (ExportFormat::Avi, true) => {
                vec!["-an", "-c:v", "png", "-pix_fmt", "rgba"]
            }
            (ExportFormat::Mp4, true) => {
                return Err(WordbeatError::config(
                    "mp4 cannot carry an alpha channel; use mov, avi or an image sequence",
                ));
            }
            (ExportFormat::ImageSequence, _) => {
                return Err(WordbeatError::config(
                    "image sequences are written by ImageSequenceSink, not ffmpeg",
                ));
            }
        };
        Ok(args)
    }

    fn uses_yuv420p(&self, transparent: bool) -> bool {
        !transparent
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> WordbeatResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(WordbeatError::config(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if self.uses_yuv420p(cfg.transparent)
            && (cfg.width % 2 != 0 || cfg.height % 2 != 0)
        {
            return Err(WordbeatError::config(
                "ffmpeg sink width/height must be even (required for yuv420p output)",
            ));
        }
        let codec_args = self.codec_args(cfg.transparent)?;

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(WordbeatError::config(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(WordbeatError::resource(
                "ffmpeg is required for video encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if self.opts.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        // Input: raw straight-alpha RGBA8 frames on stdin.
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);
        cmd.args(codec_args);
        cmd.arg(&self.opts.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            WordbeatError::resource(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| WordbeatError::resource("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| WordbeatError::resource("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgba) -> WordbeatResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| WordbeatError::resource("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(WordbeatError::resource(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(WordbeatError::resource(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(WordbeatError::resource("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&frame.data).map_err(|e| {
            WordbeatError::resource(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> WordbeatResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| WordbeatError::resource("ffmpeg sink not started"))?;

        let status = child.wait().map_err(|e| {
            WordbeatError::resource(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| WordbeatError::resource("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| WordbeatError::resource(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(WordbeatError::resource(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        self.cfg = None;
        Ok(())
    }
}

impl Drop for FfmpegSink {
    /// Abandoned mid-export (an error path dropped the sink before `end`):
    /// kill the encoder so no zombie holds the partially written output.
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` before `-i` sets the input framerate.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> WordbeatResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
