//! Image output
//!
//! Writing acquired images to disk. Gray images are expanded to RGB so every
//! file has the same layout.

use std::path::Path;

use image::{ImageFormat, RgbImage};

use crate::scanner::error::{ScanError, ScanResult};
use crate::scanner::types::RawImage;

/// Destination for acquired images.
pub trait ImageSink {
    fn write(&self, image: &RawImage, path: &Path) -> ScanResult<()>;
}

/// Writes 8-bit RGB PNG files.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngSink;

impl PngSink {
    /// RGB pixel data for `image`, expanding single-channel pixels.
    pub fn rgb_pixels(image: &RawImage) -> Result<Vec<u8>, String> {
        match image.bytes_per_pixel {
            3 => Ok(image.pixels.clone()),
            1 => Ok(image
                .pixels
                .iter()
                .flat_map(|value| [*value; 3])
                .collect()),
            other => Err(format!("{} bytes per pixel cannot be encoded", other)),
        }
    }
}

impl ImageSink for PngSink {
    fn write(&self, image: &RawImage, path: &Path) -> ScanResult<()> {
        let failed = |message: String| ScanError::Output {
            path: path.to_path_buf(),
            message,
        };

        let pixels = Self::rgb_pixels(image).map_err(failed)?;
        let buffer = RgbImage::from_raw(image.width, image.height, pixels)
            .ok_or_else(|| failed("pixel buffer does not match the image size".to_string()))?;
        buffer
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| failed(e.to_string()))?;

        log::info!(
            "Wrote {}x{} image to '{}'",
            image.width,
            image.height,
            path.display()
        );
        Ok(())
    }
}
