// SPDX-License-Identifier: MPL-2.0

//! Integration tests for composited render output
//!
//! Frames are pushed through a live pipeline onto a recording surface and
//! the presented canvases checked pixel by pixel.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use viewfinder::compose::{Canvas, Rgba};
use viewfinder::frame::{FrameRef, PixelFormat, Size};
use viewfinder::pipeline::Viewport;
use viewfinder::surface::{HeadlessSurface, Surface};
use viewfinder::{RenderingPolicy, ViewRotation};

const RED: Rgba = Rgba::opaque(255, 0, 0);
const BLUE: Rgba = Rgba::opaque(0, 0, 255);
const BACKGROUND: Rgba = Rgba::opaque(0, 0, 0);

fn solid(size: Size, color: Rgba) -> Vec<u8> {
    let mut data = Vec::with_capacity(size.pixel_count() * 4);
    for _ in 0..size.pixel_count() {
        data.extend_from_slice(&[color.r, color.g, color.b, color.a]);
    }
    data
}

/// Left half `left`, right half `right`
fn split_horizontal(size: Size, left: Rgba, right: Rgba) -> Vec<u8> {
    let mut data = Vec::with_capacity(size.pixel_count() * 4);
    for _ in 0..size.height {
        for x in 0..size.width {
            let color = if x < size.width / 2 { left } else { right };
            data.extend_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }
    data
}

/// Push one frame through a live worker and return the presented canvas
fn render_once(
    display: Size,
    frame_size: Size,
    pixels: &[u8],
    configure: impl FnOnce(&Viewport),
) -> Canvas {
    let viewport = Viewport::new();
    viewport.set_size(frame_size).unwrap();
    viewport.set_fps_meter_enabled(false);
    configure(&viewport);
    let surface = Arc::new(HeadlessSurface::recording(display));
    viewport.on_surface_ready(Arc::clone(&surface) as Arc<dyn Surface>);
    viewport.activate().unwrap();

    let frame = FrameRef::new(pixels, frame_size, PixelFormat::Rgba);
    let deadline = Instant::now() + Duration::from_secs(5);
    // The first present is the idle placeholder
    while surface.presented() < 2 {
        viewport.post(&frame).unwrap();
        assert!(Instant::now() < deadline, "no frame presented within 5s");
        thread::sleep(Duration::from_millis(2));
    }
    viewport.deactivate();
    surface
        .last_frame()
        .expect("recording surface keeps the last canvas")
}

#[test]
fn test_matched_aspect_fills_the_surface() {
    // 32x24 and 64x48 share a 4:3 aspect, so the fit is exact
    let frame_size = Size::new(32, 24);
    let canvas = render_once(Size::new(64, 48), frame_size, &solid(frame_size, RED), |_| {});
    assert_eq!(canvas.size(), Size::new(64, 48));
    for y in [0, 23, 47] {
        for x in [0, 31, 63] {
            assert_eq!(canvas.pixel(x, y), RED, "pixel ({x}, {y})");
        }
    }
}

#[test]
fn test_wide_frame_letterboxes_below() {
    // 64x24 into 64x48 leaves the bottom half as background
    let frame_size = Size::new(64, 24);
    let canvas = render_once(Size::new(64, 48), frame_size, &solid(frame_size, RED), |_| {});
    assert_eq!(canvas.pixel(0, 0), RED);
    assert_eq!(canvas.pixel(63, 23), RED);
    assert_eq!(canvas.pixel(0, 24), BACKGROUND);
    assert_eq!(canvas.pixel(63, 47), BACKGROUND);
}

#[test]
fn test_tall_frame_pillarboxes_right() {
    // 32x48 into 64x48 keeps the frame at the left edge
    let frame_size = Size::new(32, 48);
    let canvas = render_once(Size::new(64, 48), frame_size, &solid(frame_size, RED), |_| {});
    assert_eq!(canvas.pixel(0, 0), RED);
    assert_eq!(canvas.pixel(31, 47), RED);
    assert_eq!(canvas.pixel(32, 0), BACKGROUND);
    assert_eq!(canvas.pixel(63, 47), BACKGROUND);
}

#[test]
fn test_both_policies_share_the_aspect_fit_rectangle() {
    // 320x240 into 400x240 fits to height: a 320-wide image, background
    // filling the strip to its right, identically for both policies
    let display = Size::new(400, 240);
    let frame_size = Size::new(320, 240);
    let pixels = solid(frame_size, RED);

    for policy in [
        RenderingPolicy::MaximizeEfficiency,
        RenderingPolicy::OptimizeView,
    ] {
        let canvas = render_once(display, frame_size, &pixels, |viewport| {
            viewport.set_rendering_policy(policy);
        });
        assert_eq!(canvas.pixel(0, 0), RED, "{policy}");
        assert_eq!(canvas.pixel(319, 239), RED, "{policy}");
        assert_eq!(canvas.pixel(320, 0), BACKGROUND, "{policy}");
        assert_eq!(canvas.pixel(399, 239), BACKGROUND, "{policy}");
    }
}

#[test]
fn test_rotate90_maps_left_edge_to_top() {
    // Portrait 24x32 scales exactly onto the transposed 48x64 canvas; the
    // clockwise turn then lands the left half of the image on the top rows
    let frame_size = Size::new(24, 32);
    let pixels = split_horizontal(frame_size, RED, BLUE);
    let canvas = render_once(Size::new(64, 48), frame_size, &pixels, |viewport| {
        viewport.set_rendering_policy(RenderingPolicy::OptimizeView);
        viewport.set_optimized_rotation(ViewRotation::Rotate90);
    });
    assert_eq!(canvas.pixel(0, 0), RED);
    assert_eq!(canvas.pixel(63, 23), RED);
    assert_eq!(canvas.pixel(0, 24), BLUE);
    assert_eq!(canvas.pixel(63, 47), BLUE);
}

#[test]
fn test_rotate180_flips_both_axes() {
    let frame_size = Size::new(32, 24);
    let pixels = split_horizontal(frame_size, RED, BLUE);
    let canvas = render_once(Size::new(64, 48), frame_size, &pixels, |viewport| {
        viewport.set_rendering_policy(RenderingPolicy::OptimizeView);
        viewport.set_optimized_rotation(ViewRotation::Rotate180);
    });
    // The left half of the image now shows on the right
    assert_eq!(canvas.pixel(0, 0), BLUE);
    assert_eq!(canvas.pixel(63, 47), RED);
}

#[test]
fn test_fps_meter_draws_text_on_efficiency_path() {
    // A black frame makes the white overlay glyphs the only white pixels
    let display = Size::new(500, 200);
    let frame_size = Size::new(500, 200);
    let black = solid(frame_size, Rgba::opaque(0, 0, 0));

    let plain = render_once(display, frame_size, &black, |_| {});
    assert_eq!(count_white(&plain), 0, "text drawn with the meter disabled");

    let metered = render_once(display, frame_size, &black, |viewport| {
        viewport.set_fps_meter_enabled(true);
    });
    assert!(count_white(&metered) > 0, "no overlay text drawn");
}

#[test]
fn test_optimize_view_boxes_the_overlay() {
    // The stat box darkens the bottom-left corner so the overlay stays
    // readable after rotation
    let display = Size::new(500, 200);
    let frame_size = Size::new(500, 200);
    let white = solid(frame_size, Rgba::WHITE);
    let canvas = render_once(display, frame_size, &white, |viewport| {
        viewport.set_rendering_policy(RenderingPolicy::OptimizeView);
        viewport.set_fps_meter_enabled(true);
    });
    // Inside the 450x120 box, left of the text inset
    assert_eq!(canvas.pixel(2, 198), Rgba::new(0, 0, 0, 200));
    // Outside the box the frame shows through
    assert_eq!(canvas.pixel(460, 198), Rgba::WHITE);
    assert_eq!(canvas.pixel(250, 40), Rgba::WHITE);
}

fn count_white(canvas: &Canvas) -> usize {
    canvas.pixels().iter().filter(|p| **p == Rgba::WHITE).count()
}
