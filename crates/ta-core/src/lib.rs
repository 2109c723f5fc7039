/// Configuration, types, and shared structures for termascii.
///
/// This crate contains the shared data model (glyph ramp, pixel grids,
/// frames, frame sequences), configuration loading and the error type
/// used across the termascii workspace.

pub mod charset;
pub mod clock;
pub mod config;
pub mod error;
pub mod frame;

pub use charset::GlyphRamp;
pub use clock::MediaClock;
pub use config::{ColorMode, PlaybackConfig, RenderConfig, RenderStyle, Settings};
pub use error::CoreError;
pub use frame::{Frame, FrameBuffer, FrameSequence, PixelGrid, PixelSample};
