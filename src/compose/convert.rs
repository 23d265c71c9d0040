// SPDX-License-Identifier: MPL-2.0

//! Source pixel-format expansion into the RGBA compositing canvas

use crate::compose::canvas::{Canvas, Rgba};
use crate::frame::PixelFormat;
use crate::pipeline::pool::PooledFrame;

/// Expand a pooled frame into `dst`
///
/// `dst` is resized to the frame geometry if needed.
pub fn frame_to_rgba(frame: &PooledFrame, dst: &mut Canvas) {
    let size = frame.size();
    dst.resize(size);
    let width = size.width as usize;
    let height = size.height as usize;
    let data = frame.data();
    let pixels = dst.pixels_mut();

    match frame.format() {
        PixelFormat::Rgba => {
            bytemuck::cast_slice_mut::<Rgba, u8>(pixels).copy_from_slice(data);
        }
        PixelFormat::Rgb24 => {
            for (dst_px, src) in pixels.iter_mut().zip(data.chunks_exact(3)) {
                *dst_px = Rgba::opaque(src[0], src[1], src[2]);
            }
        }
        PixelFormat::Gray8 => {
            for (dst_px, &v) in pixels.iter_mut().zip(data.iter()) {
                *dst_px = Rgba::opaque(v, v, v);
            }
        }
        PixelFormat::Yuyv => {
            // Packed 4:2:2: two pixels share chroma (Y0 U Y1 V)
            for (dst_pair, src) in pixels.chunks_exact_mut(2).zip(data.chunks_exact(4)) {
                let (u, v) = (src[1], src[3]);
                let (r0, g0, b0) = yuv_to_rgb(src[0], u, v);
                let (r1, g1, b1) = yuv_to_rgb(src[2], u, v);
                dst_pair[0] = Rgba::opaque(r0, g0, b0);
                dst_pair[1] = Rgba::opaque(r1, g1, b1);
            }
        }
        PixelFormat::Nv12 => {
            // Y plane followed by interleaved UV at half resolution
            let uv_offset = width * height;
            for y in 0..height {
                let uv_row = uv_offset + (y / 2) * width;
                for x in 0..width {
                    let luma = data[y * width + x];
                    let uv_idx = uv_row + (x & !1);
                    let (r, g, b) = if uv_idx + 1 < data.len() {
                        yuv_to_rgb(luma, data[uv_idx], data[uv_idx + 1])
                    } else {
                        (luma, luma, luma)
                    };
                    pixels[y * width + x] = Rgba::opaque(r, g, b);
                }
            }
        }
    }
}

/// Convert YUV (BT.601) to RGB
fn yuv_to_rgb(y: u8, u: u8, v: u8) -> (u8, u8, u8) {
    let y = y as f32;
    let u = u as f32 - 128.0;
    let v = v as f32 - 128.0;

    let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
    let g = (y - 0.344136 * u - 0.714136 * v).clamp(0.0, 255.0) as u8;
    let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;

    (r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{FrameRef, Size};
    use crate::pipeline::pool::FramePool;
    use std::time::Duration;

    fn filled_frame(data: &[u8], size: Size, format: PixelFormat) -> (FramePool, PooledFrame) {
        let pool = FramePool::new(size, 1);
        let mut frame = pool.take(Duration::from_millis(10)).unwrap();
        frame.copy_from(&FrameRef::new(data, size, format), 1);
        (pool, frame)
    }

    #[test]
    fn test_rgba_copies_through() {
        let size = Size::new(2, 1);
        let data = [1, 2, 3, 4, 5, 6, 7, 8];
        let (pool, frame) = filled_frame(&data, size, PixelFormat::Rgba);
        let mut dst = Canvas::new(size);
        frame_to_rgba(&frame, &mut dst);
        assert_eq!(dst.pixel(0, 0), Rgba::new(1, 2, 3, 4));
        assert_eq!(dst.pixel(1, 0), Rgba::new(5, 6, 7, 8));
        pool.recycle(frame);
    }

    #[test]
    fn test_gray8_expands() {
        let size = Size::new(2, 1);
        let (pool, frame) = filled_frame(&[0, 200], size, PixelFormat::Gray8);
        let mut dst = Canvas::new(size);
        frame_to_rgba(&frame, &mut dst);
        assert_eq!(dst.pixel(0, 0), Rgba::opaque(0, 0, 0));
        assert_eq!(dst.pixel(1, 0), Rgba::opaque(200, 200, 200));
        pool.recycle(frame);
    }

    #[test]
    fn test_yuyv_neutral_chroma_is_gray() {
        // U = V = 128 cancels the chroma terms
        let size = Size::new(2, 1);
        let (pool, frame) = filled_frame(&[50, 128, 180, 128], size, PixelFormat::Yuyv);
        let mut dst = Canvas::new(size);
        frame_to_rgba(&frame, &mut dst);
        assert_eq!(dst.pixel(0, 0), Rgba::opaque(50, 50, 50));
        assert_eq!(dst.pixel(1, 0), Rgba::opaque(180, 180, 180));
        pool.recycle(frame);
    }

    #[test]
    fn test_nv12_neutral_chroma_is_gray() {
        let size = Size::new(2, 2);
        // 4 luma bytes then one interleaved UV pair for the 2x2 block
        let data = [10, 20, 30, 40, 128, 128];
        let (pool, frame) = filled_frame(&data, size, PixelFormat::Nv12);
        let mut dst = Canvas::new(size);
        frame_to_rgba(&frame, &mut dst);
        assert_eq!(dst.pixel(0, 0), Rgba::opaque(10, 10, 10));
        assert_eq!(dst.pixel(1, 1), Rgba::opaque(40, 40, 40));
        pool.recycle(frame);
    }

    #[test]
    fn test_red_yuv_sample() {
        // Pure red in BT.601: Y=76, U=85, V=255
        let size = Size::new(2, 1);
        let (pool, frame) = filled_frame(&[76, 85, 76, 255], size, PixelFormat::Yuyv);
        let mut dst = Canvas::new(size);
        frame_to_rgba(&frame, &mut dst);
        let px = dst.pixel(0, 0);
        assert!(px.r > 240, "red channel {}", px.r);
        assert!(px.g < 40, "green channel {}", px.g);
        assert!(px.b < 40, "blue channel {}", px.b);
        pool.recycle(frame);
    }
}
