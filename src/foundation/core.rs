//! Shared primitive types used across the crate.

use crate::foundation::error::{WordbeatError, WordbeatResult};

/// Absolute 0-based frame index in export timeline space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> WordbeatResult<Self> {
        if num == 0 {
            return Err(WordbeatError::config("fps num must be > 0"));
        }
        if den == 0 {
            return Err(WordbeatError::config("fps den must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Integer frame rate (`den == 1`).
    pub fn whole(fps: u32) -> WordbeatResult<Self> {
        Self::new(fps, 1)
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Nearest frame boundary for a timestamp (round-half-up, floored at 0).
    ///
    /// Timeline discretization uses differences of these boundaries so that
    /// rounding error never accumulates across segments.
    pub fn secs_to_frames_round(self, secs: f64) -> u64 {
        (secs * self.as_f64()).round().max(0.0) as u64
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create validated non-zero dimensions.
    pub fn new(width: u32, height: u32) -> WordbeatResult<Self> {
        if width == 0 || height == 0 {
            return Err(WordbeatError::config("canvas width/height must be non-zero"));
        }
        Ok(Self { width, height })
    }

    /// Pixel count as `usize`.
    pub fn pixels(self) -> usize {
        (self.width as usize) * (self.height as usize)
    }
}

/// Straight (non-premultiplied) RGB color, 8 bits per channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Construct from channel values.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#RRGGBB` hex triple (leading `#` optional).
    pub fn from_hex(s: &str) -> WordbeatResult<Self> {
        let h = s.trim().trim_start_matches('#');
        if h.len() != 6 || !h.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(WordbeatError::config(format!(
                "color must be #RRGGBB, got '{s}'"
            )));
        }
        let chan = |i: usize| u8::from_str_radix(&h[i..i + 2], 16).unwrap_or(0);
        Ok(Self {
            r: chan(0),
            g: chan(2),
            b: chan(4),
        })
    }
}

impl std::fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb8 {
    type Error = WordbeatError;

    fn try_from(s: String) -> WordbeatResult<Self> {
        Self::from_hex(&s)
    }
}

impl From<Rgb8> for String {
    fn from(c: Rgb8) -> String {
        c.to_string()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
