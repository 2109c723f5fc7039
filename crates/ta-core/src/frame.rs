use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::error::CoreError;

/// Profondeur maximale supportée par canal.
pub const MAX_CHANNEL_DEPTH: u8 = 16;

/// Pas maximal entre deux frames.
pub const MAX_STEP: Duration = Duration::from_secs(3600);

/// One pixel, channels normalized to `[0, 255]`.
///
/// # Example
/// ```
/// use ta_core::frame::PixelSample;
/// let white = PixelSample { r: 255, g: 255, b: 255 };
/// assert!((white.brightness() - 255.0).abs() < 1e-9);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PixelSample {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

impl PixelSample {
    /// Relative luminance (BT.709 weights) in `[0, 255]`.
    #[inline(always)]
    #[must_use]
    pub fn brightness(&self) -> f64 {
        0.2126 * f64::from(self.r) + 0.7152 * f64::from(self.g) + 0.0722 * f64::from(self.b)
    }
}

/// Decoded pixel grid at its source bit depth.
///
/// Samples are RGB triplets, row-major. Values are kept raw; use
/// [`PixelGrid::normalize`] to bring them into the 0–255 range.
///
/// # Example
/// ```
/// use ta_core::frame::PixelGrid;
/// let grid = PixelGrid::new(1, 1, 16, vec![65535, 0, 257]).unwrap();
/// let fb = grid.normalize().unwrap();
/// assert_eq!(fb.sample(0, 0).r, 255);
/// assert_eq!(fb.sample(0, 0).b, 1);
/// ```
#[derive(Clone, Debug)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    depth: u8,
    samples: Vec<u32>,
}

impl PixelGrid {
    /// Wrap raw RGB samples.
    ///
    /// Depth is stored as given and only checked by [`PixelGrid::normalize`],
    /// so unsupported depths surface at generation time.
    ///
    /// # Errors
    /// `InvalidDimensions` if a dimension is zero, `Resource` if the sample
    /// count does not match `width * height * 3`.
    pub fn new(width: u32, height: u32, depth: u8, samples: Vec<u32>) -> Result<Self, CoreError> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidDimensions { width, height });
        }
        let expected = width as usize * height as usize * 3;
        if samples.len() != expected {
            return Err(CoreError::Resource(format!(
                "{} échantillons reçus, {expected} attendus pour {width}×{height}",
                samples.len()
            )));
        }
        Ok(Self {
            width,
            height,
            depth,
            samples,
        })
    }

    /// Build an 8-bit grid from packed RGB bytes.
    ///
    /// # Errors
    /// Same as [`PixelGrid::new`].
    pub fn from_rgb8(width: u32, height: u32, rgb: &[u8]) -> Result<Self, CoreError> {
        Self::new(width, height, 8, rgb.iter().map(|&c| u32::from(c)).collect())
    }

    /// Build a 16-bit grid from RGB words.
    ///
    /// # Errors
    /// Same as [`PixelGrid::new`].
    pub fn from_rgb16(width: u32, height: u32, rgb: &[u16]) -> Result<Self, CoreError> {
        Self::new(width, height, 16, rgb.iter().map(|&c| u32::from(c)).collect())
    }

    /// A grid filled with one 8-bit color.
    ///
    /// # Errors
    /// `InvalidDimensions` if a dimension is zero.
    pub fn solid(width: u32, height: u32, rgb: (u8, u8, u8)) -> Result<Self, CoreError> {
        let count = width as usize * height as usize;
        let mut samples = Vec::with_capacity(count * 3);
        for _ in 0..count {
            samples.extend([u32::from(rgb.0), u32::from(rgb.1), u32::from(rgb.2)]);
        }
        Self::new(width, height, 8, samples)
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bits per channel of the source.
    #[must_use]
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Divisor mapping the source depth into 0–255: 257 for 16-bit, 1 otherwise.
    ///
    /// # Errors
    /// `Configuration` if the depth exceeds 16 bits.
    pub fn quantum_factor(&self) -> Result<u32, CoreError> {
        match self.depth {
            d if d > MAX_CHANNEL_DEPTH => Err(CoreError::Configuration(format!(
                "profondeur de canal {d} bits non supportée (16 maximum)"
            ))),
            16 => Ok(257),
            _ => Ok(1),
        }
    }

    /// Normalize into an 8-bit RGBA buffer.
    ///
    /// The depth is validated before any sample is read.
    ///
    /// # Errors
    /// `Configuration` if the depth exceeds 16 bits.
    pub fn normalize(&self) -> Result<FrameBuffer, CoreError> {
        let factor = self.quantum_factor()?;
        let mut fb = FrameBuffer::new(self.width, self.height);
        for (dst, src) in fb.data.chunks_exact_mut(4).zip(self.samples.chunks_exact(3)) {
            dst[0] = (src[0] / factor).min(255) as u8;
            dst[1] = (src[1] / factor).min(255) as u8;
            dst[2] = (src[2] / factor).min(255) as u8;
            dst[3] = 255;
        }
        Ok(fb)
    }
}

/// Buffer de pixels normalisés 8 bits.
///
/// Stocke les pixels en RGBA row-major, 4 bytes par pixel.
///
/// # Example
/// ```
/// use ta_core::frame::FrameBuffer;
/// let fb = FrameBuffer::new(10, 10);
/// assert_eq!(fb.data.len(), 400);
/// ```
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    /// Pixels RGBA, row-major, 4 bytes par pixel.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameBuffer {
    /// Crée un buffer noir aux dimensions données.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; width as usize * height as usize * 4],
            width,
            height,
        }
    }

    /// Accès au pixel (x, y).
    ///
    /// Out-of-bounds reads return black.
    #[inline(always)]
    #[must_use]
    pub fn sample(&self, x: u32, y: u32) -> PixelSample {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        if idx + 3 >= self.data.len() {
            return PixelSample::default();
        }
        PixelSample {
            r: self.data[idx],
            g: self.data[idx + 1],
            b: self.data[idx + 2],
        }
    }
}

/// One rendered image: printable rows joined by `\n`, possibly with color
/// escape sequences.
///
/// Immutable; clones share the same text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    text: Arc<str>,
}

impl Frame {
    /// Wrap rendered text.
    #[must_use]
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self { text: text.into() }
    }

    /// The rendered text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.text.lines().count()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<String> for Frame {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// Ordered, non-empty list of frames played at a fixed step.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use ta_core::frame::{Frame, FrameSequence};
/// let seq = FrameSequence::new(vec![Frame::new("a"), Frame::new("b")], Duration::from_millis(100))
///     .unwrap();
/// assert_eq!(seq.total_duration(), Duration::from_millis(200));
/// ```
#[derive(Clone, Debug)]
pub struct FrameSequence {
    frames: Vec<Frame>,
    step: Duration,
    looping: bool,
    audio: Option<PathBuf>,
}

impl FrameSequence {
    /// Build a non-looping, silent sequence.
    ///
    /// # Errors
    /// `Resource` if `frames` is empty, `Configuration` if `step` is zero
    /// or exceeds [`MAX_STEP`].
    pub fn new(frames: Vec<Frame>, step: Duration) -> Result<Self, CoreError> {
        if frames.is_empty() {
            return Err(CoreError::Resource(
                "la séquence doit contenir au moins une frame".into(),
            ));
        }
        if step.is_zero() || step > MAX_STEP {
            return Err(CoreError::Configuration(format!(
                "la durée d'un pas doit être dans ]0, {}s] (reçu {step:?})",
                MAX_STEP.as_secs()
            )));
        }
        Ok(Self {
            frames,
            step,
            looping: false,
            audio: None,
        })
    }

    /// Set the loop flag.
    #[must_use]
    pub fn with_loop(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Attach an audio asset played alongside the frames.
    #[must_use]
    pub fn with_audio(mut self, audio: Option<PathBuf>) -> Self {
        self.audio = audio;
        self
    }

    /// Frames in display order.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Frame at `index`, wrapped into range.
    #[must_use]
    pub fn frame(&self, index: usize) -> &Frame {
        &self.frames[index % self.frames.len()]
    }

    /// Number of frames, always ≥ 1.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always `false`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Display time of one frame.
    #[must_use]
    pub fn step(&self) -> Duration {
        self.step
    }

    /// Whether playback restarts after the last frame.
    #[must_use]
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Audio asset, if any.
    #[must_use]
    pub fn audio(&self) -> Option<&Path> {
        self.audio.as_deref()
    }

    /// `frame_count * step`, saturating at [`Duration::MAX`].
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        u32::try_from(self.frames.len())
            .ok()
            .and_then(|n| self.step.checked_mul(n))
            .unwrap_or(Duration::MAX)
    }
}
