use std::path::Path;

use ta_core::charset::GlyphRamp;
use ta_core::config::{RenderConfig, RenderStyle};
use ta_core::error::CoreError;
use ta_core::frame::{Frame, FrameBuffer, PixelGrid};
use ta_source::resize::Resizer;

use crate::color_map;

/// `true` if a line break follows column `col` for an output `width`.
///
/// The rule is `col % (width - 1) == 0 && col != 0`, so a row of exactly
/// `width` cells breaks once, after its last cell. For `width == 1` every
/// cell ends a row.
///
/// # Example
/// ```
/// use ta_ascii::wraps_after;
/// assert!(!wraps_after(0, 5));
/// assert!(wraps_after(4, 5));
/// assert!(wraps_after(8, 5));
/// assert!(!wraps_after(5, 5));
/// ```
#[inline(always)]
#[must_use]
pub fn wraps_after(col: u32, width: u16) -> bool {
    let period = u32::from(width.saturating_sub(1));
    if period == 0 {
        return true;
    }
    col != 0 && col % period == 0
}

/// Transforme une image décodée en frame texte.
///
/// Stateless: every call builds a fresh [`Frame`], so one generator can be
/// shared between threads.
///
/// # Example
/// ```
/// use ta_ascii::FrameGenerator;
/// use ta_core::config::{RenderConfig, RenderStyle};
/// use ta_core::frame::PixelGrid;
///
/// let generator = FrameGenerator::new(RenderConfig::new(5, RenderStyle::Text).unwrap()).unwrap();
/// let black = PixelGrid::solid(4, 4, (0, 0, 0)).unwrap();
/// assert_eq!(generator.generate(&black).unwrap().as_str(), ".....\n.....\n");
/// ```
#[derive(Clone, Debug)]
pub struct FrameGenerator {
    config: RenderConfig,
    ramp: GlyphRamp,
}

impl FrameGenerator {
    /// Generator using the standard glyph ramp.
    ///
    /// # Errors
    /// `Configuration` if the config is invalid.
    pub fn new(config: RenderConfig) -> Result<Self, CoreError> {
        Self::with_ramp(config, GlyphRamp::standard())
    }

    /// Generator using a custom glyph ramp.
    ///
    /// # Errors
    /// `Configuration` if the config is invalid.
    pub fn with_ramp(config: RenderConfig, ramp: GlyphRamp) -> Result<Self, CoreError> {
        config.validate()?;
        Ok(Self { config, ramp })
    }

    /// Active render config.
    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Active glyph ramp.
    #[must_use]
    pub fn ramp(&self) -> &GlyphRamp {
        &self.ramp
    }

    /// Render a decoded grid: normalize, aspect-correct, map to glyphs.
    ///
    /// # Errors
    /// `Configuration` if the grid depth exceeds 16 bits (checked before any
    /// sample is read), `Resource` if resizing fails.
    pub fn generate(&self, grid: &PixelGrid) -> Result<Frame, CoreError> {
        let normalized = grid.normalize()?;
        let scaled = Resizer::new().aspect_correct(&normalized, self.config.width)?;
        Ok(self.render_buffer(&scaled))
    }

    /// Decode then render raw image bytes.
    ///
    /// # Errors
    /// `Resource` if the bytes are not a decodable image, plus the errors of
    /// [`FrameGenerator::generate`].
    pub fn generate_bytes(&self, bytes: &[u8]) -> Result<Frame, CoreError> {
        let grid = ta_source::image::decode_bytes(bytes)?;
        self.generate(&grid)
    }

    /// Load, decode and render an image file.
    ///
    /// # Errors
    /// `FileNotFound`/`Resource` if the file is missing or undecodable, plus
    /// the errors of [`FrameGenerator::generate`].
    pub fn generate_path(&self, path: &Path) -> Result<Frame, CoreError> {
        let grid = ta_source::image::load_image(path)?;
        self.generate(&grid)
    }

    /// Map an already-sized buffer to text, one cell per pixel, row-major.
    ///
    /// No resizing happens here; the wrap rule of [`wraps_after`] is applied
    /// to each pixel's column.
    #[must_use]
    pub fn render_buffer(&self, fb: &FrameBuffer) -> Frame {
        let cells = fb.width as usize * fb.height as usize;
        let per_cell = match self.config.style {
            RenderStyle::Text => 1,
            RenderStyle::Color { .. } => 24,
        };
        let mut out = String::with_capacity(cells * per_cell + fb.height as usize);

        for y in 0..fb.height {
            for x in 0..fb.width {
                let px = fb.sample(x, y);
                let glyph = self.ramp.glyph_for(px.brightness());
                color_map::push_cell(&mut out, glyph, px, self.config.style);
                if wraps_after(x, self.config.width) {
                    out.push('\n');
                }
            }
        }
        Frame::from(out)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use ta_core::config::ColorMode;

    use super::*;

    fn text_generator(width: u16) -> FrameGenerator {
        FrameGenerator::new(RenderConfig::new(width, RenderStyle::Text).unwrap()).unwrap()
    }

    fn solid_buffer(width: u32, height: u32, rgb: (u8, u8, u8)) -> FrameBuffer {
        let mut fb = FrameBuffer::new(width, height);
        for px in fb.data.chunks_exact_mut(4) {
            px.copy_from_slice(&[rgb.0, rgb.1, rgb.2, 255]);
        }
        fb
    }

    #[test]
    fn black_square_renders_two_dark_rows() {
        let grid = PixelGrid::solid(4, 4, (0, 0, 0)).unwrap();
        let generator = text_generator(5);
        let first = generator.generate(&grid).unwrap();
        assert_eq!(first.as_str(), ".....\n.....\n");
        // Pas d'état entre deux appels.
        assert_eq!(generator.generate(&grid).unwrap(), first);
    }

    #[test]
    fn solid_grey_uses_a_single_glyph() {
        let grid = PixelGrid::solid(16, 16, (128, 128, 128)).unwrap();
        let generator = text_generator(8);
        let expected = generator.ramp().glyph_for(128.0);
        let frame = generator.generate(&grid).unwrap();
        assert_eq!(frame.row_count(), 4);
        for line in frame.as_str().lines() {
            assert_eq!(line.chars().count(), 8);
            assert!(line.chars().all(|c| c == expected), "{line:?}");
        }
    }

    #[test]
    fn white_maps_to_brightest_glyph() {
        let fb = solid_buffer(3, 1, (255, 255, 255));
        let frame = text_generator(3).render_buffer(&fb);
        assert_eq!(frame.as_str(), "$$$\n");
    }

    #[test]
    fn wrap_follows_width_minus_one_period() {
        // 9 colonnes pour width=5 : coupures après les colonnes 4 et 8.
        let fb = solid_buffer(9, 1, (0, 0, 0));
        let frame = text_generator(5).render_buffer(&fb);
        assert_eq!(frame.as_str(), ".....\n....\n");
    }

    #[test]
    fn wrap_rule_edge_cases() {
        assert!(!wraps_after(0, 2));
        assert!(wraps_after(1, 2));
        assert!(wraps_after(2, 2));
        assert!(wraps_after(0, 1));
        assert!(wraps_after(7, 1));
        for col in 1..40 {
            assert_eq!(wraps_after(col, 5), col % 4 == 0);
        }
    }

    #[test]
    fn width_one_renders_a_column() {
        let fb = solid_buffer(1, 3, (0, 0, 0));
        assert_eq!(text_generator(1).render_buffer(&fb).as_str(), ".\n.\n.\n");
    }

    #[test]
    fn color_style_emits_escape_sequences() {
        let config = RenderConfig::new(
            2,
            RenderStyle::Color {
                mode: ColorMode::Full,
                block: false,
            },
        )
        .unwrap();
        let generator = FrameGenerator::new(config).unwrap();
        let frame = generator.render_buffer(&solid_buffer(2, 1, (200, 10, 10)));
        assert_eq!(frame.as_str().matches("\x1b[38;2;200;10;10m").count(), 2);
        assert!(frame.as_str().ends_with('\n'));
    }

    #[test]
    fn deep_grids_fail_before_rendering() {
        let grid = PixelGrid::new(2, 2, 32, vec![0; 12]).unwrap();
        let err = text_generator(4).generate(&grid).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn undecodable_bytes_are_a_resource_error() {
        let err = text_generator(4).generate_bytes(b"garbage").unwrap_err();
        assert!(err.is_resource());
    }

    #[test]
    fn png_bytes_round_through_the_generator() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([0, 0, 0])));
        let mut bytes = Cursor::new(Vec::new());
        img.write_to(&mut bytes, ImageFormat::Png).unwrap();
        let frame = text_generator(5).generate_bytes(bytes.get_ref()).unwrap();
        assert_eq!(frame.as_str(), ".....\n.....\n");
    }

    #[test]
    fn custom_ramp_is_honored() {
        let generator = FrameGenerator::with_ramp(
            RenderConfig::new(2, RenderStyle::Text).unwrap(),
            GlyphRamp::new(" @").unwrap(),
        )
        .unwrap();
        let frame = generator.render_buffer(&solid_buffer(2, 1, (255, 255, 255)));
        assert_eq!(frame.as_str(), "@@\n");
    }

    #[test]
    fn zero_width_config_is_rejected() {
        let config = RenderConfig {
            width: 0,
            style: RenderStyle::Text,
        };
        assert!(FrameGenerator::new(config).unwrap_err().is_configuration());
    }
}
