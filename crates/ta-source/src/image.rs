use std::path::Path;

use image::DynamicImage;
use ta_core::error::CoreError;
use ta_core::frame::PixelGrid;

/// Décode une image depuis des octets bruts.
///
/// 16-bit sources keep their depth so that normalization divides by 257;
/// float sources report 32 bits and are rejected at generation time.
///
/// # Errors
/// `Resource` if the bytes are empty or cannot be decoded.
///
/// # Example
/// ```
/// use ta_source::image::decode_bytes;
/// assert!(decode_bytes(b"not an image").is_err());
/// ```
pub fn decode_bytes(bytes: &[u8]) -> Result<PixelGrid, CoreError> {
    if bytes.is_empty() {
        return Err(CoreError::Resource("aucune donnée image".into()));
    }
    let img = image::load_from_memory(bytes)
        .map_err(|e| CoreError::Resource(format!("image indécodable : {e}")))?;
    grid_from_image(&img)
}

/// Charge et décode une image depuis le disque.
///
/// # Errors
/// `FileNotFound` if the path does not exist, `Resource` if it cannot be
/// read or decoded.
///
/// # Example
/// ```no_run
/// use ta_source::image::load_image;
/// use std::path::Path;
/// let grid = load_image(Path::new("test.png")).unwrap();
/// ```
pub fn load_image(path: &Path) -> Result<PixelGrid, CoreError> {
    if !path.exists() {
        return Err(CoreError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let bytes = std::fs::read(path)
        .map_err(|e| CoreError::Resource(format!("Impossible de lire {} : {e}", path.display())))?;
    log::debug!("load_image: {} ({} octets)", path.display(), bytes.len());
    decode_bytes(&bytes)
}

/// Convert a decoded image into an RGB grid at its native channel depth.
///
/// # Errors
/// Propagates [`PixelGrid`] construction errors (zero-sized images).
pub fn grid_from_image(img: &DynamicImage) -> Result<PixelGrid, CoreError> {
    let color = img.color();
    let depth = (color.bits_per_pixel() / u16::from(color.channel_count().max(1))) as u8;
    let (width, height) = (img.width(), img.height());

    if depth > 8 {
        // Valeurs 16 bits ; au-delà, seule la profondeur compte (rejet en aval).
        let rgb = img.to_rgb16();
        PixelGrid::new(
            width,
            height,
            depth,
            rgb.as_raw().iter().map(|&c| u32::from(c)).collect(),
        )
    } else {
        let rgb = img.to_rgb8();
        PixelGrid::from_rgb8(width, height, rgb.as_raw())
    }
}
