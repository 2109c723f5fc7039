/// Pixel sources for termascii: image decoding, aspect-correcting resize,
/// and frame folder scanning.

pub mod folder;
pub mod image;
pub mod resize;
