// SPDX-License-Identifier: GPL-3.0-only

//! Frame geometry and pixel-format types shared across the pipeline

use crate::errors::{ViewportError, ViewportResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Width/height pair in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total pixel count
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Width over height
    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// The same size with width and height exchanged
    pub fn transposed(&self) -> Self {
        Self::new(self.height, self.width)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Pixel layouts accepted from the capture source
///
/// Rows are tightly packed; there is no per-row padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 8-bit RGBA, 4 bytes per pixel
    Rgba,
    /// 8-bit RGB, 3 bytes per pixel
    Rgb24,
    /// 8-bit grayscale, 1 byte per pixel
    Gray8,
    /// Packed 4:2:2 YUV (Y0 U Y1 V), 2 bytes per pixel, even width
    Yuyv,
    /// Planar Y followed by an interleaved half-resolution UV plane,
    /// even width and height
    Nv12,
}

impl PixelFormat {
    /// Whether this format carries YUV samples
    pub fn is_yuv(&self) -> bool {
        matches!(self, PixelFormat::Yuyv | PixelFormat::Nv12)
    }

    /// Exact byte length of one frame of `size` in this format
    pub fn buffer_len(&self, size: Size) -> usize {
        let pixels = size.pixel_count();
        match self {
            PixelFormat::Rgba => pixels * 4,
            PixelFormat::Rgb24 => pixels * 3,
            PixelFormat::Gray8 => pixels,
            PixelFormat::Yuyv => pixels * 2,
            PixelFormat::Nv12 => pixels + pixels / 2,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelFormat::Rgba => "RGBA",
            PixelFormat::Rgb24 => "RGB24",
            PixelFormat::Gray8 => "GRAY8",
            PixelFormat::Yuyv => "YUYV",
            PixelFormat::Nv12 => "NV12",
        };
        write!(f, "{}", name)
    }
}

/// Borrowed view of one captured frame
///
/// Valid only for the duration of a `post` call; the pipeline copies the
/// pixels into pooled storage before returning.
#[derive(Debug, Clone, Copy)]
pub struct FrameRef<'a> {
    pub data: &'a [u8],
    pub size: Size,
    pub format: PixelFormat,
}

impl<'a> FrameRef<'a> {
    pub fn new(data: &'a [u8], size: Size, format: PixelFormat) -> Self {
        Self { data, size, format }
    }

    pub(crate) fn validate(&self) -> ViewportResult<()> {
        if self.size.width == 0 || self.size.height == 0 {
            return Err(ViewportError::InvalidFrame(format!(
                "zero dimension: {}",
                self.size
            )));
        }
        match self.format {
            PixelFormat::Yuyv if self.size.width % 2 != 0 => {
                return Err(ViewportError::InvalidFrame(format!(
                    "YUYV requires even width, got {}",
                    self.size.width
                )));
            }
            PixelFormat::Nv12 if self.size.width % 2 != 0 || self.size.height % 2 != 0 => {
                return Err(ViewportError::InvalidFrame(format!(
                    "NV12 requires even dimensions, got {}",
                    self.size
                )));
            }
            _ => {}
        }
        let expected = self.format.buffer_len(self.size);
        if self.data.len() < expected {
            return Err(ViewportError::InvalidFrame(format!(
                "{} byte buffer is short for {} {} (need {})",
                self.data.len(),
                self.format,
                self.size,
                expected
            )));
        }
        Ok(())
    }
}
