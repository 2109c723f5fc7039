/// ASCII conversion engine for termascii.
///
/// Converts decoded pixel grids to rendered text frames.
pub mod color_map;
pub mod generator;

pub use generator::{FrameGenerator, wraps_after};
