//! The boundary-validated configuration model.

use std::path::{Path, PathBuf};

use crate::foundation::core::{Canvas, Fps, Rgb8};
use crate::foundation::error::{WordbeatError, WordbeatResult};
use crate::timeline::pass::TimingPlan;
use crate::timing::note::{bar_seconds, beat_seconds, note_to_seconds, parse_note_token};

/// Tempo bounds enforced at the boundary.
pub const BPM_RANGE: std::ops::RangeInclusive<u32> = 20..=300;

/// Musical timing options as the user supplies them (note tokens, not
/// seconds). Resolved once into a [`TimingPlan`] before a run starts.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    /// Beats per minute; clamped into [`BPM_RANGE`] at resolution.
    pub bpm: u32,
    /// Time signature numerator, beats per bar (1–16).
    pub time_sig_num: u32,
    /// Time signature denominator (2, 4, 8 or 16). Display-only: the beat
    /// unit for duration math is always the quarter note.
    pub time_sig_den: u32,
    /// Note value each word is held for.
    pub word_note: String,
    /// Fade-in note value, `"none"`/`"0"` to disable.
    pub fade_in_note: String,
    /// Fade-out note value, `"none"`/`"0"` to disable.
    pub fade_out_note: String,
    /// Inter-word gap note value, `"none"`/`"0"` to disable.
    pub gap_note: String,
    /// Treat the gap as a cross-fade overlap into the next word instead of a
    /// blank pause.
    pub gap_is_negative: bool,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            bpm: 120,
            time_sig_num: 4,
            time_sig_den: 4,
            word_note: "1/4".to_owned(),
            fade_in_note: "1/16".to_owned(),
            fade_out_note: "1/16".to_owned(),
            gap_note: "0".to_owned(),
            gap_is_negative: false,
        }
    }
}

impl TimingSettings {
    /// Validate and resolve every token to concrete seconds.
    pub fn resolve(&self) -> WordbeatResult<TimingPlan> {
        if self.bpm == 0 {
            return Err(WordbeatError::config("bpm must be > 0"));
        }
        let bpm = self.bpm.clamp(*BPM_RANGE.start(), *BPM_RANGE.end());

        if !(1..=16).contains(&self.time_sig_num) {
            return Err(WordbeatError::config(format!(
                "time signature numerator must be 1..=16, got {}",
                self.time_sig_num
            )));
        }
        if ![2, 4, 8, 16].contains(&self.time_sig_den) {
            return Err(WordbeatError::config(format!(
                "time signature denominator must be one of 2/4/8/16, got {}",
                self.time_sig_den
            )));
        }

        let word = parse_note_token(&self.word_note)?;
        if word.is_none() {
            return Err(WordbeatError::config("word note value must not be 'none'"));
        }
        let fade_in = parse_note_token(&self.fade_in_note)?;
        let fade_out = parse_note_token(&self.fade_out_note)?;
        let gap = parse_note_token(&self.gap_note)?;

        let gap_secs = {
            let g = note_to_seconds(gap, bpm);
            if self.gap_is_negative { -g } else { g }
        };

        Ok(TimingPlan {
            bpm,
            time_sig_num: self.time_sig_num,
            word_secs: note_to_seconds(word, bpm),
            fade_in_secs: note_to_seconds(fade_in, bpm),
            fade_out_secs: note_to_seconds(fade_out, bpm),
            gap_secs,
            seconds_per_beat: beat_seconds(bpm),
            bar_secs: bar_seconds(self.time_sig_num, bpm),
        })
    }
}

/// What a loop pass spans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopMode {
    /// One pass is one traversal of the word list from the start index.
    AllWords,
    /// One pass is time-boxed to `loop_bars` bars, pre-empting mid-word.
    ByBars,
}

/// Section looping options.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LoopSettings {
    /// Loop at all; when off, exactly one pass plays.
    pub enabled: bool,
    /// Pass length policy.
    pub mode: LoopMode,
    /// Bars per pass in [`LoopMode::ByBars`].
    pub loop_bars: u32,
    /// Number of passes when not infinite.
    pub loop_times: u32,
    /// Loop until stopped.
    pub infinite: bool,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: LoopMode::AllWords,
            loop_bars: 4,
            loop_times: 2,
            infinite: false,
        }
    }
}

impl LoopSettings {
    /// Validate counts.
    pub fn validate(&self) -> WordbeatResult<()> {
        if self.loop_bars == 0 {
            return Err(WordbeatError::config("loop_bars must be >= 1"));
        }
        if self.loop_times == 0 {
            return Err(WordbeatError::config("loop_times must be >= 1"));
        }
        Ok(())
    }

    /// Time-box for one pass, if any: ByBars looping boxes each pass to
    /// `loop_bars` bars regardless of word-list length.
    pub fn pass_budget_secs(&self, plan: &TimingPlan) -> Option<f64> {
        (self.enabled && self.mode == LoopMode::ByBars)
            .then(|| f64::from(self.loop_bars) * plan.bar_secs)
    }

    /// Number of passes to play; `None` means until stopped.
    pub fn pass_count(&self) -> Option<u32> {
        if !self.enabled {
            return Some(1);
        }
        if self.infinite { None } else { Some(self.loop_times) }
    }
}

/// Output container for export.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// H.264 in MP4. Cannot carry an alpha channel.
    Mp4,
    /// AVI; mpeg4 when opaque, png codec when transparent.
    Avi,
    /// QuickTime; h264 when opaque, png codec when transparent.
    Mov,
    /// Directory of zero-padded numbered PNG frames.
    ImageSequence,
}

impl ExportFormat {
    /// Parse a user token (container extension or `png_sequence`).
    pub fn parse(token: &str) -> WordbeatResult<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "mp4" => Ok(Self::Mp4),
            "avi" => Ok(Self::Avi),
            "mov" => Ok(Self::Mov),
            "image_sequence" | "png_sequence" | "png" => Ok(Self::ImageSequence),
            other => Err(WordbeatError::config(format!(
                "unknown export format '{other}'"
            ))),
        }
    }

    /// File extension for container formats; `None` for image sequences.
    pub fn extension(self) -> Option<&'static str> {
        match self {
            Self::Mp4 => Some("mp4"),
            Self::Avi => Some("avi"),
            Self::Mov => Some("mov"),
            Self::ImageSequence => None,
        }
    }
}

/// Offline export options.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Frames per second.
    pub fps: u32,
    /// Output width in pixels; 0 derives from the aspect ratio.
    pub width: u32,
    /// Output height in pixels; 0 derives from the aspect ratio.
    pub height: u32,
    /// Output container.
    pub format: ExportFormat,
    /// Emit an alpha channel instead of filling the background color.
    pub transparent_background: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            fps: 30,
            width: 1920,
            height: 1080,
            format: ExportFormat::Mp4,
            transparent_background: false,
        }
    }
}

impl ExportSettings {
    /// Validate, deriving the resolution from `appearance` when unset.
    pub fn resolve(&self, appearance: &AppearanceSettings) -> WordbeatResult<(Fps, Canvas)> {
        let fps = Fps::whole(self.fps)?;
        let canvas = if self.width == 0 || self.height == 0 {
            appearance.default_resolution()?
        } else {
            Canvas::new(self.width, self.height)?
        };
        if self.transparent_background && self.format == ExportFormat::Mp4 {
            return Err(WordbeatError::config(
                "mp4 cannot carry an alpha channel; use mov, avi or an image sequence",
            ));
        }
        Ok((fps, canvas))
    }
}

/// Display appearance: font, colors, aspect.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppearanceSettings {
    /// Path to a `.ttf`/`.otf` font file (export only; the terminal preview
    /// needs no font).
    pub font_path: Option<PathBuf>,
    /// Point size relative to a 1080-pixel-high canvas.
    pub font_size: u32,
    /// Word color.
    pub foreground: Rgb8,
    /// Background fill (ignored when exporting with transparency).
    pub background: Rgb8,
    /// `"W:H"` token used to derive a default export resolution.
    pub aspect_ratio: String,
}

impl Default for AppearanceSettings {
    fn default() -> Self {
        Self {
            font_path: None,
            font_size: 72,
            foreground: Rgb8::new(0xff, 0xff, 0xff),
            background: Rgb8::new(0x00, 0x00, 0x00),
            aspect_ratio: "16:9".to_owned(),
        }
    }
}

impl AppearanceSettings {
    /// Parse the `"W:H"` aspect token.
    pub fn parse_aspect_ratio(&self) -> WordbeatResult<(u32, u32)> {
        let err = || {
            WordbeatError::config(format!(
                "aspect ratio must be 'W:H', got '{}'",
                self.aspect_ratio
            ))
        };
        let (w, h) = self.aspect_ratio.split_once(':').ok_or_else(err)?;
        let w: u32 = w.trim().parse().map_err(|_| err())?;
        let h: u32 = h.trim().parse().map_err(|_| err())?;
        if w == 0 || h == 0 {
            return Err(err());
        }
        Ok((w, h))
    }

    /// Default export resolution for the aspect ratio: the short edge is
    /// 1080 pixels, the long edge rounded to an even pixel count.
    pub fn default_resolution(&self) -> WordbeatResult<Canvas> {
        let (aw, ah) = self.parse_aspect_ratio()?;
        let long = |short: u32, num: u32, den: u32| {
            let px = (f64::from(short) * f64::from(num) / f64::from(den)).round() as u32;
            px + (px & 1)
        };
        if aw >= ah {
            Canvas::new(long(1080, aw, ah), 1080)
        } else {
            Canvas::new(1080, long(1080, ah, aw))
        }
    }
}

/// Metronome click options for live playback.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MetronomeSettings {
    /// Play an audible click on each beat.
    pub enabled: bool,
    /// Click volume in [0, 1].
    pub volume: f32,
}

impl Default for MetronomeSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 0.5,
        }
    }
}

/// The complete flat option set, validated at the boundary before any
/// scheduler starts.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Musical timing.
    pub timing: TimingSettings,
    /// Section looping.
    pub looping: LoopSettings,
    /// Font, colors, aspect.
    pub appearance: AppearanceSettings,
    /// Offline export.
    pub export: ExportSettings,
    /// 1-based first word of each pass; clamped to the word count.
    pub start_word: u32,
    /// Play one silent count-in bar before the first pass.
    pub count_in: bool,
    /// Metronome click.
    pub metronome: MetronomeSettings,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            timing: TimingSettings::default(),
            looping: LoopSettings::default(),
            appearance: AppearanceSettings::default(),
            export: ExportSettings::default(),
            start_word: 1,
            count_in: true,
            metronome: MetronomeSettings::default(),
        }
    }
}

impl PlayerConfig {
    /// Load from a JSON file.
    pub fn from_json_path(path: &Path) -> WordbeatResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            WordbeatError::resource(format!("failed to read config '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    /// Parse from a JSON string.
    pub fn from_json_str(text: &str) -> WordbeatResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| WordbeatError::config(format!("invalid config JSON: {e}")))
    }

    /// Validate every section and resolve the timing plan.
    pub fn resolve_timing(&self) -> WordbeatResult<TimingPlan> {
        self.looping.validate()?;
        self.metronome_volume_check()?;
        self.timing.resolve()
    }

    fn metronome_volume_check(&self) -> WordbeatResult<()> {
        if !(0.0..=1.0).contains(&self.metronome.volume) {
            return Err(WordbeatError::config(format!(
                "metronome volume must be within [0, 1], got {}",
                self.metronome.volume
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/settings/model.rs"]
mod tests;
