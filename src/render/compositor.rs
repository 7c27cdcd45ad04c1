//! The frame compositor that assembles a rendered canvas.

use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::{WordbeatError, WordbeatResult};
use crate::render::blend::blend;
use crate::render::text::{TextRasterizer, WordRaster};
use crate::settings::model::AppearanceSettings;
use crate::timeline::words::WordSequence;

/// What one frame shows: at most an incoming word and, during a negative-gap
/// cross-dissolve, the outgoing word underneath it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameContent {
    /// Current word (0-based index), `None` for a blank gap frame.
    pub word: Option<usize>,
    /// Current word opacity in [0, 1].
    pub opacity: f64,
    /// Outgoing word and its opacity during a cross-dissolve.
    pub previous: Option<(usize, f64)>,
}

impl FrameContent {
    /// A blank frame.
    pub const BLANK: FrameContent = FrameContent {
        word: None,
        opacity: 0.0,
        previous: None,
    };
}

/// A rendered frame as straight-alpha RGBA8 pixels, tightly packed,
/// row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgba {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, `width * height * 4` of them.
    pub data: Vec<u8>,
}

/// Renders [`FrameContent`] into raster frames.
///
/// Every word is rasterized once up front, so rendering is a pure function
/// of the content: byte-identical output for identical input, whatever
/// order or thread renders the frames.
pub struct Compositor {
    canvas: Canvas,
    foreground: Rgb8,
    background: Rgb8,
    transparent: bool,
    rasters: Vec<WordRaster>,
}

impl Compositor {
    /// Rasterize `words` and build a compositor for `canvas`.
    ///
    /// The font size from `appearance` is interpreted relative to a
    /// 1080-pixel-high canvas, as the live preview sizes it.
    pub fn new(
        canvas: Canvas,
        appearance: &AppearanceSettings,
        transparent: bool,
        words: &WordSequence,
    ) -> WordbeatResult<Self> {
        let font_path = appearance.font_path.as_deref().ok_or_else(|| {
            WordbeatError::config("a font file path is required to render frames")
        })?;
        let px = (appearance.font_size as f32 * canvas.height as f32 / 1080.0).max(1.0);
        let mut rasterizer = TextRasterizer::from_font_file(font_path, px)?;
        let rasters = words
            .words()
            .iter()
            .map(|w| rasterizer.raster_word(w))
            .collect();
        Ok(Self {
            canvas,
            foreground: appearance.foreground,
            background: appearance.background,
            transparent,
            rasters,
        })
    }

    /// Output dimensions.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Render one frame.
    pub fn render(&self, content: &FrameContent) -> FrameRgba {
        let mut frame = self.blank_frame();
        if let Some((prev, prev_opacity)) = content.previous
            && prev_opacity > 0.0
        {
            self.draw_word(&mut frame, prev, prev_opacity);
        }
        if let Some(word) = content.word
            && content.opacity > 0.0
        {
            self.draw_word(&mut frame, word, content.opacity);
        }
        frame
    }

    fn blank_frame(&self) -> FrameRgba {
        let mut data = vec![0u8; self.canvas.pixels() * 4];
        if !self.transparent {
            for px in data.chunks_exact_mut(4) {
                px[0] = self.background.r;
                px[1] = self.background.g;
                px[2] = self.background.b;
                px[3] = 0xff;
            }
        }
        FrameRgba {
            width: self.canvas.width,
            height: self.canvas.height,
            data,
        }
    }

    /// Draw a word centered on the canvas.
    ///
    /// Opaque mode paints antialiased text of color `blend(fg, bg, opacity)`
    /// over whatever is already on the frame, the same color the preview
    /// shows. Transparent mode keeps the foreground color and writes
    /// `opacity * coverage` into the alpha channel instead.
    fn draw_word(&self, frame: &mut FrameRgba, word_index: usize, opacity: f64) {
        let Some(raster) = self.rasters.get(word_index) else {
            return;
        };
        let fw = frame.width as i64;
        let fh = frame.height as i64;
        let x0 = (fw - raster.width as i64) / 2;
        let y0 = (fh - raster.height as i64) / 2;
        let word_color = blend(self.foreground, self.background, opacity);

        for row in 0..raster.height {
            let y = y0 + row as i64;
            if y < 0 || y >= fh {
                continue;
            }
            for col in 0..raster.width {
                let x = x0 + col as i64;
                if x < 0 || x >= fw {
                    continue;
                }
                let cov = raster.coverage[row * raster.width + col];
                if cov == 0 {
                    continue;
                }
                let cov = f64::from(cov) / 255.0;
                let at = ((y as usize) * frame.width as usize + x as usize) * 4;
                let px = &mut frame.data[at..at + 4];
                if self.transparent {
                    let src_a = opacity * cov;
                    let dst_a = f64::from(px[3]) / 255.0;
                    let out_a = src_a + dst_a * (1.0 - src_a);
                    px[0] = self.foreground.r;
                    px[1] = self.foreground.g;
                    px[2] = self.foreground.b;
                    px[3] = (out_a * 255.0).round() as u8;
                } else {
                    let under = Rgb8::new(px[0], px[1], px[2]);
                    let over = blend(word_color, under, cov);
                    px[0] = over.r;
                    px[1] = over.g;
                    px[2] = over.b;
                }
            }
        }
    }
}
