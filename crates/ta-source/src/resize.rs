use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer as FirResizer};
use ta_core::error::CoreError;
use ta_core::frame::FrameBuffer;

/// Output grid size for a source image rendered `columns` wide.
///
/// The image is scaled uniformly to `columns`, then its rows are halved:
/// terminal cells are roughly twice as tall as they are wide.
///
/// # Example
/// ```
/// use ta_source::resize::corrected_dimensions;
/// assert_eq!(corrected_dimensions(4, 4, 5), (5, 2));
/// assert_eq!(corrected_dimensions(200, 100, 80), (80, 20));
/// ```
#[must_use]
pub fn corrected_dimensions(src_width: u32, src_height: u32, columns: u16) -> (u32, u32) {
    let cols = u32::from(columns).max(1);
    let scaled_rows = (f64::from(src_height) * f64::from(cols) / f64::from(src_width.max(1)))
        .round()
        .max(1.0) as u32;
    (cols, (scaled_rows / 2).max(1))
}

/// Resizer réutilisable wrappant fast_image_resize.
///
/// Box filter: every output pixel averages the source area it covers.
///
/// # Example
/// ```
/// use ta_source::resize::Resizer;
/// let r = Resizer::new();
/// ```
pub struct Resizer {
    inner: FirResizer,
    options: ResizeOptions,
    /// Scratch image for source (owned buffer to avoid the mut borrow issue).
    src_buf: Vec<u8>,
}

impl Resizer {
    /// Create a new resizer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: FirResizer::new(),
            options: ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Box)),
            src_buf: Vec::new(),
        }
    }

    /// Resize `src` into `dst`. Dimensions of `dst` determine output size.
    ///
    /// # Errors
    /// Returns `Resource` if the resize operation fails.
    ///
    /// # Example
    /// ```
    /// use ta_source::resize::Resizer;
    /// use ta_core::frame::FrameBuffer;
    /// let mut r = Resizer::new();
    /// let src = FrameBuffer::new(100, 100);
    /// let mut dst = FrameBuffer::new(50, 50);
    /// r.resize_into(&src, &mut dst).unwrap();
    /// ```
    pub fn resize_into(&mut self, src: &FrameBuffer, dst: &mut FrameBuffer) -> Result<(), CoreError> {
        if src.width == dst.width && src.height == dst.height {
            dst.data.copy_from_slice(&src.data);
            return Ok(());
        }

        // fast_image_resize exige &mut sur la source
        self.src_buf.clear();
        self.src_buf.extend_from_slice(&src.data);

        let src_image =
            Image::from_slice_u8(src.width, src.height, &mut self.src_buf, PixelType::U8x4)
                .map_err(|e| CoreError::Resource(format!("dimensions source invalides : {e}")))?;

        let mut dst_image =
            Image::from_slice_u8(dst.width, dst.height, &mut dst.data, PixelType::U8x4)
                .map_err(|e| CoreError::Resource(format!("dimensions cible invalides : {e}")))?;

        self.inner
            .resize(&src_image, &mut dst_image, Some(&self.options))
            .map_err(|e| CoreError::Resource(format!("redimensionnement impossible : {e}")))?;

        Ok(())
    }

    /// Scale `src` to `columns` wide with halved rows.
    ///
    /// # Errors
    /// Returns `Resource` if the resize operation fails.
    pub fn aspect_correct(&mut self, src: &FrameBuffer, columns: u16) -> Result<FrameBuffer, CoreError> {
        let (w, h) = corrected_dimensions(src.width, src.height, columns);
        let mut dst = FrameBuffer::new(w, h);
        self.resize_into(src, &mut dst)?;
        log::trace!("aspect_correct: {}x{} -> {w}x{h}", src.width, src.height);
        Ok(dst)
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new()
    }
}
