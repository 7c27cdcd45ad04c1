//! Color blending helpers shared by the renderer.

use crate::foundation::core::Rgb8;

/// Linearly interpolate `fg` over `bg` at `opacity` in [0, 1].
///
/// Per channel: `round(fg * opacity + bg * (1 - opacity))`.
///
/// This is the one and only color interpolation in the crate. The terminal
/// preview and the frame exporter both resolve display colors through it,
/// which is what makes the live view and the exported frames agree. A
/// correctness requirement, not an optimization.
pub fn blend(fg: Rgb8, bg: Rgb8, opacity: f64) -> Rgb8 {
    let op = opacity.clamp(0.0, 1.0);
    let channel = |f: u8, b: u8| (f64::from(f) * op + f64::from(b) * (1.0 - op)).round() as u8;
    Rgb8 {
        r: channel(fg.r, bg.r),
        g: channel(fg.g, bg.g),
        b: channel(fg.b, bg.b),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/blend.rs"]
mod tests;
