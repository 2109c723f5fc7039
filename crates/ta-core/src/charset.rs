use std::sync::Arc;

use crate::error::CoreError;

/// 69 caractères: rampe par défaut, du plus sombre au plus clair.
pub const RAMP_STANDARD: &str =
    ".'`^\",:;Il!i><~+_-?][}{1)(|\\/tfjrxnuvczXYUJCLQ0OZmwqpdbkhao*#MW&8%B@$";

/// 10 caractères: compact, bon contraste.
pub const RAMP_COMPACT: &str = " .:-=+*#%@";

/// Blocs Unicode: pseudo-pixels.
pub const RAMP_BLOCKS: &str = " ░▒▓█";

/// Ordered glyph set, darkest first.
///
/// Immutable once built; clones share the same backing storage so the ramp
/// can be handed to several generators (or threads) read-only.
///
/// # Example
/// ```
/// use ta_core::charset::GlyphRamp;
/// let ramp = GlyphRamp::new(" .:#@").unwrap();
/// assert_eq!(ramp.glyph_for(0.0), ' ');
/// assert_eq!(ramp.glyph_for(255.0), '@');
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphRamp {
    glyphs: Arc<[char]>,
}

impl GlyphRamp {
    /// Build a ramp from a string ordered darkest→brightest.
    ///
    /// # Errors
    /// Returns `CoreError::Configuration` if the string is empty.
    pub fn new(glyphs: &str) -> Result<Self, CoreError> {
        let glyphs: Arc<[char]> = glyphs.chars().collect();
        if glyphs.is_empty() {
            return Err(CoreError::Configuration(
                "la rampe de glyphes doit contenir au moins un caractère".into(),
            ));
        }
        Ok(Self { glyphs })
    }

    /// The default 69-glyph ramp.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            glyphs: RAMP_STANDARD.chars().collect(),
        }
    }

    /// Number of glyphs (`L`), always ≥ 1.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Always `false`; kept for API symmetry with slices.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Darkest glyph.
    #[must_use]
    pub fn darkest(&self) -> char {
        self.glyphs[0]
    }

    /// Brightest glyph.
    #[must_use]
    pub fn brightest(&self) -> char {
        self.glyphs[self.glyphs.len() - 1]
    }

    /// Glyph index for a brightness in `[0, 255]`: `floor(b * L / 255)`,
    /// clamped to `[0, L-1]`.
    ///
    /// Out-of-range and NaN inputs are clamped as well.
    ///
    /// # Example
    /// ```
    /// use ta_core::charset::GlyphRamp;
    /// let ramp = GlyphRamp::new("ab").unwrap();
    /// assert_eq!(ramp.index_for(127.0), 0);
    /// assert_eq!(ramp.index_for(128.0), 1);
    /// assert_eq!(ramp.index_for(255.0), 1);
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn index_for(&self, brightness: f64) -> usize {
        let len = self.glyphs.len();
        let raw = (brightness.max(0.0) * len as f64 / 255.0).floor();
        (raw as usize).min(len - 1)
    }

    /// Glyph for a brightness in `[0, 255]`.
    #[inline(always)]
    #[must_use]
    pub fn glyph_for(&self, brightness: f64) -> char {
        self.glyphs[self.index_for(brightness)]
    }
}

impl Default for GlyphRamp {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_ramp_has_69_glyphs() {
        let ramp = GlyphRamp::standard();
        assert_eq!(ramp.len(), 69);
        assert_eq!(ramp.darkest(), '.');
        assert_eq!(ramp.brightest(), '$');
    }

    #[test]
    fn empty_ramp_is_rejected() {
        let err = GlyphRamp::new("").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn index_stays_in_range_for_every_length_and_brightness() {
        for len in 1..=80usize {
            let glyphs: String = (0..len).map(|i| char::from(b'!' + (i % 90) as u8)).collect();
            let ramp = GlyphRamp::new(&glyphs).unwrap();
            for b in 0..=255u32 {
                let idx = ramp.index_for(f64::from(b));
                assert!(idx < len, "index {idx} hors bornes pour L={len}, b={b}");
            }
            assert_eq!(ramp.index_for(255.0), len - 1);
            assert_eq!(ramp.index_for(0.0), 0);
        }
    }

    #[test]
    fn index_clamps_out_of_range_inputs() {
        let ramp = GlyphRamp::new(" .:#@").unwrap();
        assert_eq!(ramp.index_for(-12.0), 0);
        assert_eq!(ramp.index_for(255.000_001), 4);
        assert_eq!(ramp.index_for(1e9), 4);
        assert_eq!(ramp.index_for(f64::NAN), 0);
    }

    #[test]
    fn index_is_monotonic() {
        let ramp = GlyphRamp::standard();
        let mut prev = 0usize;
        for b in 0..=255u32 {
            let idx = ramp.index_for(f64::from(b));
            assert!(idx >= prev, "rampe non monotone à b={b}");
            prev = idx;
        }
    }

    #[test]
    fn single_glyph_ramp_always_maps_to_it() {
        let ramp = GlyphRamp::new("#").unwrap();
        assert_eq!(ramp.glyph_for(0.0), '#');
        assert_eq!(ramp.glyph_for(255.0), '#');
    }
}
