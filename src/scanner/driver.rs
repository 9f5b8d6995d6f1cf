//! Scan Driver
//!
//! Runs one acquisition on an open device: start, read frame parameters,
//! pull data in fixed-size chunks until the backend reports end of data,
//! then cancel. Cancel runs on every path once the acquisition started.

use crate::backend::{FrameFormat, FrameParameters, NativeHandle, ScanBackend};
use crate::scanner::error::{ScanError, ScanResult};
use crate::scanner::types::RawImage;

/// Write position inside the destination image.
///
/// Pixels may straddle chunk boundaries, so the channel index is carried
/// from one chunk to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelCursor {
    width: usize,
    height: usize,
    bytes_per_pixel: usize,
    x: usize,
    y: usize,
    channel: usize,
}

impl PixelCursor {
    pub fn new(width: usize, height: usize, bytes_per_pixel: usize) -> Self {
        Self {
            width,
            height,
            bytes_per_pixel,
            x: 0,
            y: 0,
            channel: 0,
        }
    }

    pub fn position(&self) -> (usize, usize, usize) {
        (self.x, self.y, self.channel)
    }

    pub fn is_complete(&self) -> bool {
        self.y >= self.height
    }

    fn offset(&self) -> usize {
        (self.y * self.width + self.x) * self.bytes_per_pixel + self.channel
    }

    /// Copy `bytes` into `pixels` at the cursor and advance.
    ///
    /// Returns the number of bytes stored; bytes past the last row are
    /// dropped.
    pub fn fill(&mut self, pixels: &mut [u8], bytes: &[u8]) -> usize {
        if self.is_complete() || self.width == 0 || self.bytes_per_pixel == 0 {
            return 0;
        }
        let offset = self.offset();
        let stored = bytes.len().min(pixels.len().saturating_sub(offset));
        pixels[offset..offset + stored].copy_from_slice(&bytes[..stored]);

        let position = offset + stored;
        let pixel = position / self.bytes_per_pixel;
        self.channel = position % self.bytes_per_pixel;
        self.x = pixel % self.width;
        self.y = pixel / self.width;
        stored
    }
}

/// Channels per pixel for the frame layouts the driver assembles.
pub fn bytes_per_pixel(frame: &FrameParameters) -> ScanResult<u32> {
    match (frame.format, frame.depth) {
        (FrameFormat::Rgb, 8) => Ok(3),
        (FrameFormat::Gray, 8) => Ok(1),
        (format, depth) => Err(ScanError::invalid_frame(format!(
            "{:?} frames with {} bits per sample are not supported",
            format, depth
        ))),
    }
}

pub struct ScanDriver<'a> {
    backend: &'a mut dyn ScanBackend,
    handle: NativeHandle,
    device: &'a str,
    chunk_size: usize,
}

impl<'a> ScanDriver<'a> {
    pub fn new(
        backend: &'a mut dyn ScanBackend,
        handle: NativeHandle,
        device: &'a str,
        chunk_size: usize,
    ) -> Self {
        Self {
            backend,
            handle,
            device,
            chunk_size,
        }
    }

    /// Acquire one image.
    ///
    /// `Ok(None)` when the device delivered no data at all.
    pub fn scan(&mut self) -> ScanResult<Option<RawImage>> {
        log::info!("Starting acquisition on '{}'", self.device);
        self.backend
            .start(self.handle)
            .map_err(|e| ScanError::native("start", self.device, e))?;

        let result = self.acquire();

        self.backend.cancel(self.handle);
        log::debug!("Acquisition on '{}' finished", self.device);
        result
    }

    fn acquire(&mut self) -> ScanResult<Option<RawImage>> {
        let frame = self
            .backend
            .frame_parameters(self.handle)
            .map_err(|e| ScanError::native("get parameters", self.device, e))?;
        let bytes_per_pixel = bytes_per_pixel(&frame)?;

        let (width, height) = match (
            u32::try_from(frame.pixels_per_line),
            u32::try_from(frame.lines),
        ) {
            (Ok(width), Ok(height)) if width > 0 && height > 0 => (width, height),
            _ => {
                return Err(ScanError::invalid_frame(format!(
                    "frame of {}x{} pixels",
                    frame.pixels_per_line, frame.lines
                )))
            }
        };
        let mut image = RawImage::blank(width, height, bytes_per_pixel).ok_or_else(|| {
            ScanError::invalid_frame(format!("frame of {}x{} pixels is too large", width, height))
        })?;
        log::debug!(
            "Frame on '{}': {}x{} pixels, {} bytes per pixel",
            self.device,
            width,
            height,
            bytes_per_pixel
        );

        let mut cursor = PixelCursor::new(width as usize, height as usize, bytes_per_pixel as usize);
        let mut chunk = vec![0u8; self.chunk_size];
        let mut received = 0usize;
        loop {
            match self.backend.read(self.handle, &mut chunk) {
                Ok(length) => {
                    received += length;
                    cursor.fill(&mut image.pixels, &chunk[..length]);
                }
                Err(e) if e.is_eof() => break,
                Err(e) => return Err(ScanError::native("read", self.device, e)),
            }
        }

        if received == 0 {
            log::warn!("Device '{}' delivered no image data", self.device);
            return Ok(None);
        }
        if !cursor.is_complete() {
            let (x, y, _) = cursor.position();
            log::warn!(
                "Device '{}' ended the frame early at pixel ({}, {}); the rest is blank",
                self.device,
                x,
                y
            );
        }
        log::info!("Acquired {} bytes from '{}'", received, self.device);
        Ok(Some(image))
    }
}
