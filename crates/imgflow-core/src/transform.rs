//! Object transformations.
//!
//! [`Transformer`] is the seam between the worker and the domain-specific
//! work done on an object body. [`Downscaler`] is the image implementation:
//! it divides both sides of the image by a fixed divisor and re-encodes the
//! result in a fixed format. Encoding is deterministic, so transforming the
//! same input twice yields byte-identical output.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};

use crate::config::{OutputFormat, WorkerConfig};
use crate::error::TransformError;

/// Output of a transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    /// Encoded result.
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`.
    pub content_type: &'static str,
    /// Result width in pixels.
    pub width: u32,
    /// Result height in pixels.
    pub height: u32,
}

/// A pure, synchronous transformation of an object body.
///
/// Implementations may be CPU-heavy; the worker runs them on the blocking
/// thread pool.
pub trait Transformer: Send + Sync + std::fmt::Debug + 'static {
    /// Transform `input` into a new object body.
    fn transform(&self, input: &[u8]) -> Result<Transformed, TransformError>;
}

/// Proportional image downscaler.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
///
/// use image::{DynamicImage, ImageFormat};
/// use imgflow_core::config::OutputFormat;
/// use imgflow_core::transform::{Downscaler, Transformer};
///
/// let mut png = Vec::new();
/// DynamicImage::new_rgb8(10, 6)
///     .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
///     .unwrap();
///
/// let result = Downscaler::new(2, OutputFormat::Png).transform(&png).unwrap();
/// assert_eq!((result.width, result.height), (5, 3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Downscaler {
    divisor: u32,
    format: OutputFormat,
    jpeg_quality: u8,
    max_pixels: u64,
}

impl Downscaler {
    /// Create a downscaler with the default JPEG quality and pixel limit.
    #[must_use]
    pub fn new(divisor: u32, format: OutputFormat) -> Self {
        let defaults = WorkerConfig::default();
        Self {
            divisor: divisor.max(1),
            format,
            jpeg_quality: defaults.jpeg_quality,
            max_pixels: defaults.max_pixels,
        }
    }

    /// Create a downscaler from worker configuration.
    #[must_use]
    pub fn from_config(config: &WorkerConfig) -> Self {
        Self {
            divisor: config.scale_divisor.max(1),
            format: config.output_format,
            jpeg_quality: config.jpeg_quality,
            max_pixels: config.max_pixels,
        }
    }

    /// Set the pixel limit.
    #[must_use]
    pub fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = max_pixels;
        self
    }

    /// Result dimensions for an input of `width` x `height`.
    ///
    /// Each side is divided (rounding down) and kept at least one pixel.
    #[must_use]
    pub fn target_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        ((width / self.divisor).max(1), (height / self.divisor).max(1))
    }

    fn encode(&self, img: &DynamicImage) -> Result<Vec<u8>, TransformError> {
        let mut buf = Cursor::new(Vec::new());
        match self.format {
            OutputFormat::Png => img
                .write_to(&mut buf, self.format.image_format())
                .map_err(|e| TransformError::Encode(format!("PNG encode failed: {e}")))?,
            OutputFormat::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut buf, self.jpeg_quality);
                img.to_rgb8()
                    .write_with_encoder(encoder)
                    .map_err(|e| TransformError::Encode(format!("JPEG encode failed: {e}")))?;
            }
        }
        Ok(buf.into_inner())
    }
}

impl Transformer for Downscaler {
    fn transform(&self, input: &[u8]) -> Result<Transformed, TransformError> {
        let (width, height) = reader(input)?
            .into_dimensions()
            .map_err(|e| TransformError::Decode(e.to_string()))?;
        if u64::from(width) * u64::from(height) > self.max_pixels {
            return Err(TransformError::TooLarge {
                width,
                height,
                max_pixels: self.max_pixels,
            });
        }

        let img = reader(input)?
            .decode()
            .map_err(|e| TransformError::Decode(e.to_string()))?;

        let (target_w, target_h) = self.target_dimensions(width, height);
        let resized = img.resize_exact(target_w, target_h, FilterType::Lanczos3);
        let bytes = self.encode(&resized)?;

        Ok(Transformed {
            bytes,
            content_type: self.format.content_type(),
            width: target_w,
            height: target_h,
        })
    }
}

/// Open `input` with its format guessed from the magic bytes.
fn reader(input: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, TransformError> {
    let reader = ImageReader::new(Cursor::new(input))
        .with_guessed_format()
        .map_err(|e| TransformError::Decode(format!("failed to guess format: {e}")))?;
    if reader.format().is_none() {
        return Err(TransformError::Decode("unrecognized image format".to_owned()));
    }
    Ok(reader)
}
