use std::fmt::Write;

use ta_core::config::{ColorMode, RenderStyle};
use ta_core::frame::PixelSample;

/// Map a pixel color according to the selected color mode.
///
/// `Greyscale` replicates the red channel, it does not use luminance.
///
/// # Example
/// ```
/// use ta_ascii::color_map::map_color;
/// use ta_core::config::ColorMode;
/// use ta_core::frame::PixelSample;
/// let px = PixelSample { r: 200, g: 50, b: 10 };
/// assert_eq!(map_color(px, ColorMode::Full), (200, 50, 10));
/// assert_eq!(map_color(px, ColorMode::Greyscale), (200, 200, 200));
/// ```
#[inline(always)]
#[must_use]
pub fn map_color(px: PixelSample, mode: ColorMode) -> (u8, u8, u8) {
    match mode {
        ColorMode::Full => (px.r, px.g, px.b),
        ColorMode::Greyscale => (px.r, px.r, px.r),
    }
}

/// Append one output cell for `glyph` to `out`.
///
/// - `Text`: the bare glyph.
/// - `Color` without block: the glyph with a truecolor foreground.
/// - `Color` with block: a space with a truecolor background.
///
/// SGR sequences are written as-is; `NO_COLOR` is not consulted, the style
/// alone decides.
pub fn push_cell(out: &mut String, glyph: char, px: PixelSample, style: RenderStyle) {
    match style {
        RenderStyle::Text => out.push(glyph),
        RenderStyle::Color { mode, block } => {
            let (r, g, b) = map_color(px, mode);
            // Écrire dans une String ne peut pas échouer.
            let _ = if block {
                write!(out, "\x1b[48;2;{r};{g};{b}m \x1b[49m")
            } else {
                write!(out, "\x1b[38;2;{r};{g};{b}m{glyph}\x1b[39m")
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PX: PixelSample = PixelSample { r: 10, g: 20, b: 30 };

    #[test]
    fn text_cell_is_bare() {
        let mut out = String::new();
        push_cell(&mut out, '#', PX, RenderStyle::Text);
        assert_eq!(out, "#");
    }

    #[test]
    fn color_cell_sets_foreground() {
        let mut out = String::new();
        let style = RenderStyle::Color {
            mode: ColorMode::Full,
            block: false,
        };
        push_cell(&mut out, '#', PX, style);
        assert_eq!(out, "\x1b[38;2;10;20;30m#\x1b[39m");
    }

    #[test]
    fn block_cell_paints_background_space() {
        let mut out = String::new();
        let style = RenderStyle::Color {
            mode: ColorMode::Greyscale,
            block: true,
        };
        push_cell(&mut out, '#', PX, style);
        assert_eq!(out, "\x1b[48;2;10;10;10m \x1b[49m");
    }

    #[test]
    #[allow(unsafe_code)]
    fn escapes_survive_no_color() {
        // SAFETY: aucune autre lecture de NO_COLOR dans ce crate.
        unsafe { std::env::set_var("NO_COLOR", "1") };
        let mut out = String::new();
        let block = RenderStyle::Color {
            mode: ColorMode::Full,
            block: true,
        };
        push_cell(&mut out, '#', PX, block);
        let glyph = RenderStyle::Color {
            mode: ColorMode::Full,
            block: false,
        };
        push_cell(&mut out, '#', PX, glyph);
        // SAFETY: idem.
        unsafe { std::env::remove_var("NO_COLOR") };
        assert_eq!(
            out,
            "\x1b[48;2;10;20;30m \x1b[49m\x1b[38;2;10;20;30m#\x1b[39m"
        );
    }
}
