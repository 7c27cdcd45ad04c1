//! Glyph rasterization and text layout.

use std::collections::HashMap;
use std::path::Path;

use crate::foundation::error::{WordbeatError, WordbeatResult};

/// A single word rasterized to an 8-bit coverage bitmap.
///
/// Coverage is the glyph alpha mask fontdue produces, composited into one
/// word-sized bitmap; color is applied later by the compositor.
#[derive(Clone, Debug)]
pub struct WordRaster {
    /// Bitmap width in pixels.
    pub width: usize,
    /// Bitmap height in pixels.
    pub height: usize,
    /// Row-major coverage, one byte per pixel.
    pub coverage: Vec<u8>,
}

/// Rasterizes words at a fixed pixel size through a fontdue font.
pub struct TextRasterizer {
    font: fontdue::Font,
    px: f32,
    glyphs: HashMap<char, (fontdue::Metrics, Vec<u8>)>,
}

impl TextRasterizer {
    /// Load a `.ttf`/`.otf` font file for rasterization at `px` pixels.
    pub fn from_font_file(path: &Path, px: f32) -> WordbeatResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            WordbeatError::resource(format!("failed to read font '{}': {e}", path.display()))
        })?;
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| WordbeatError::resource(format!("failed to parse font: {e}")))?;
        if px <= 0.0 {
            return Err(WordbeatError::config("font pixel size must be > 0"));
        }
        Ok(Self {
            font,
            px,
            glyphs: HashMap::new(),
        })
    }

    fn glyph(&mut self, c: char) -> &(fontdue::Metrics, Vec<u8>) {
        let px = self.px;
        let font = &self.font;
        self.glyphs.entry(c).or_insert_with(|| font.rasterize(c, px))
    }

    /// Rasterize one word into a coverage bitmap with the glyphs laid out on
    /// a common baseline.
    ///
    /// Layout is a plain horizontal advance walk: single centered words only,
    /// no shaping or wrapping.
    pub fn raster_word(&mut self, word: &str) -> WordRaster {
        let line = self
            .font
            .horizontal_line_metrics(self.px)
            .unwrap_or(fontdue::LineMetrics {
                ascent: self.px,
                descent: 0.0,
                line_gap: 0.0,
                new_line_size: self.px,
            });
        let ascent = line.ascent;
        let height = (line.ascent - line.descent).ceil().max(1.0) as usize;

        // First walk: total advance width.
        let mut advance = 0.0f32;
        for c in word.chars() {
            advance += self.glyph(c).0.advance_width;
        }
        let width = advance.ceil().max(1.0) as usize;

        let mut coverage = vec![0u8; width * height];
        let mut pen = 0.0f32;
        for c in word.chars() {
            let (metrics, bitmap) = self.glyph(c).clone();
            let gx = (pen + metrics.xmin as f32).round() as i64;
            let gy = (ascent - metrics.height as f32 - metrics.ymin as f32).round() as i64;
            for row in 0..metrics.height {
                let y = gy + row as i64;
                if y < 0 || y >= height as i64 {
                    continue;
                }
                for col in 0..metrics.width {
                    let x = gx + col as i64;
                    if x < 0 || x >= width as i64 {
                        continue;
                    }
                    let dst = &mut coverage[y as usize * width + x as usize];
                    *dst = (*dst).max(bitmap[row * metrics.width + col]);
                }
            }
            pen += metrics.advance_width;
        }

        WordRaster {
            width,
            height,
            coverage,
        }
    }
}
