// SPDX-License-Identifier: GPL-3.0-only

//! RGBA canvas the render worker composites into

use crate::compose::policy::ViewRotation;
use crate::frame::Size;
use bytemuck::{Pod, Zeroable};

/// One RGBA pixel
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

impl From<[u8; 4]> for Rgba {
    fn from(c: [u8; 4]) -> Self {
        Rgba::new(c[0], c[1], c[2], c[3])
    }
}

/// Pixel rectangle; origin may be negative, drawing is clipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Owned RGBA pixel grid
#[derive(Debug, Clone)]
pub struct Canvas {
    size: Size,
    data: Vec<u8>,
}

impl Canvas {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            data: vec![0u8; size.pixel_count() * 4],
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixels(&self) -> &[Rgba] {
        bytemuck::cast_slice(&self.data)
    }

    pub fn pixels_mut(&mut self) -> &mut [Rgba] {
        bytemuck::cast_slice_mut(&mut self.data)
    }

    /// Adopt a new geometry, reusing the allocation where possible
    pub fn resize(&mut self, size: Size) {
        if size != self.size {
            self.size = size;
            self.data.resize(size.pixel_count() * 4, 0);
        }
    }

    /// Pixel at (x, y), clamped to the canvas edge
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        let x = x.min(self.size.width.saturating_sub(1));
        let y = y.min(self.size.height.saturating_sub(1));
        self.pixels()[(y * self.size.width + x) as usize]
    }

    /// Write one pixel; out-of-bounds coordinates are ignored
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || y < 0 || x as u32 >= self.size.width || y as u32 >= self.size.height {
            return;
        }
        let width = self.size.width;
        self.pixels_mut()[(y as u32 * width + x as u32) as usize] = color;
    }

    pub fn fill(&mut self, color: Rgba) {
        self.pixels_mut().fill(color);
    }

    /// Fill a rectangle, clipped to the canvas
    pub fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        let x0 = rect.x.max(0) as u32;
        let y0 = rect.y.max(0) as u32;
        let x1 = (rect.x.saturating_add(rect.width as i32)).max(0) as u32;
        let y1 = (rect.y.saturating_add(rect.height as i32)).max(0) as u32;
        let x1 = x1.min(self.size.width);
        let y1 = y1.min(self.size.height);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        let width = self.size.width;
        let pixels = self.pixels_mut();
        for y in y0..y1 {
            let row = (y * width) as usize;
            pixels[row + x0 as usize..row + x1 as usize].fill(color);
        }
    }

    /// Nearest-neighbor scale of `src` into `dst` of this canvas, clipped
    pub fn blit_scaled(&mut self, src: &Canvas, dst: Rect) {
        if dst.width == 0 || dst.height == 0 {
            return;
        }
        let x_scale = src.size.width as f64 / dst.width as f64;
        let y_scale = src.size.height as f64 / dst.height as f64;
        for dy in 0..dst.height {
            let py = dst.y + dy as i32;
            if py < 0 || py as u32 >= self.size.height {
                continue;
            }
            let sy = (dy as f64 * y_scale) as u32;
            for dx in 0..dst.width {
                let px = dst.x + dx as i32;
                if px < 0 || px as u32 >= self.size.width {
                    continue;
                }
                let sx = (dx as f64 * x_scale) as u32;
                let color = src.pixel(sx, sy);
                self.set_pixel(px, py, color);
            }
        }
    }

    /// Map `src` onto this canvas through a clockwise rotation
    ///
    /// For quarter turns `src` must have this canvas's transposed
    /// dimensions; for the half turn and none, the same dimensions.
    pub fn blit_rotated(&mut self, src: &Canvas, rotation: ViewRotation) {
        let expected = if rotation.swaps_dimensions() {
            self.size.transposed()
        } else {
            self.size
        };
        debug_assert_eq!(src.size, expected, "rotation source dimensions");

        let width = self.size.width;
        let height = self.size.height;
        match rotation {
            ViewRotation::None => {
                let pixels = self.pixels_mut();
                pixels.copy_from_slice(src.pixels());
            }
            ViewRotation::Rotate90 => {
                for py in 0..height {
                    for px in 0..width {
                        let color = src.pixel(py, width - 1 - px);
                        self.set_pixel(px as i32, py as i32, color);
                    }
                }
            }
            ViewRotation::Rotate180 => {
                for py in 0..height {
                    for px in 0..width {
                        let color = src.pixel(width - 1 - px, height - 1 - py);
                        self.set_pixel(px as i32, py as i32, color);
                    }
                }
            }
            ViewRotation::Rotate270 => {
                for py in 0..height {
                    for px in 0..width {
                        let color = src.pixel(height - 1 - py, px);
                        self.set_pixel(px as i32, py as i32, color);
                    }
                }
            }
        }
    }
}
