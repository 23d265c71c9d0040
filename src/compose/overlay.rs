// SPDX-License-Identifier: GPL-3.0-only

//! Stats readout and pause banner drawn onto the composited canvas
//!
//! Text uses a small built-in uppercase 5x7 glyph set; the overlay only
//! needs digits, basic latin and a little punctuation, so there is no
//! font dependency.

use crate::compose::canvas::{Canvas, Rect, Rgba};
use crate::constants::overlay::{
    BANNER_HEIGHT, BOX_FILL, FPS_LINE_FROM_BOTTOM, LATENCY_LINE_FROM_BOTTOM, PAUSE_FILL,
    STAT_BOX_HEIGHT, STAT_BOX_WIDTH, TEXT_COLOR, TEXT_INSET_X, TEXT_SCALE,
};
use crate::frame::Size;
use crate::pipeline::stats::RenderStats;

pub const GLYPH_WIDTH: u32 = 5;
pub const GLYPH_HEIGHT: u32 = 7;
/// Horizontal advance per character, including the inter-glyph gap
pub const GLYPH_ADVANCE: u32 = GLYPH_WIDTH + 1;

/// First overlay line: build version, frame geometry and smoothed fps
pub fn fps_line(stats: RenderStats, frame_size: Size) -> String {
    format!(
        "{}:FPS@{}x{}: {:.2}",
        env!("GIT_VERSION"),
        frame_size.width,
        frame_size.height,
        stats.fps
    )
}

/// Second overlay line: the caller-reported latency split
pub fn latency_line(stats: RenderStats) -> String {
    format!(
        "Pipeline: {}ms - Overhead: {}ms",
        stats.pipeline_ms, stats.overhead_ms
    )
}

/// Draw the two stat lines near the canvas bottom
///
/// `boxed` additionally paints a backing box, used on the view-optimized
/// path where the overlay is composited before rotation.
pub fn draw_stats(canvas: &mut Canvas, stats: RenderStats, frame_size: Size, boxed: bool) {
    let height = canvas.size().height as i32;
    if boxed {
        canvas.fill_rect(
            Rect::new(
                0,
                height - STAT_BOX_HEIGHT as i32,
                STAT_BOX_WIDTH,
                STAT_BOX_HEIGHT,
            ),
            BOX_FILL.into(),
        );
    }
    draw_text_above(
        canvas,
        TEXT_INSET_X as i32,
        FPS_LINE_FROM_BOTTOM,
        &fps_line(stats, frame_size),
    );
    draw_text_above(
        canvas,
        TEXT_INSET_X as i32,
        LATENCY_LINE_FROM_BOTTOM,
        &latency_line(stats),
    );
}

/// Paint the full paused placeholder: fill plus banner strip
pub fn draw_paused_banner(canvas: &mut Canvas) {
    canvas.fill(PAUSE_FILL.into());
    let size = canvas.size();
    let height = size.height as i32;
    canvas.fill_rect(
        Rect::new(0, height - BANNER_HEIGHT as i32, size.width, BANNER_HEIGHT),
        BOX_FILL.into(),
    );
    let text_height = GLYPH_HEIGHT * TEXT_SCALE;
    let inset = (BANNER_HEIGHT.saturating_sub(text_height)) / 2;
    draw_text_above(canvas, TEXT_INSET_X as i32, inset + text_height, "PREVIEW PAUSED");
}

/// Draw a line with its bottom edge `from_bottom` pixels above the canvas
/// bottom
fn draw_text_above(canvas: &mut Canvas, x: i32, from_bottom: u32, text: &str) {
    let top = canvas.size().height as i32 - from_bottom as i32 - (GLYPH_HEIGHT * TEXT_SCALE) as i32;
    draw_text(canvas, x, top, text, TEXT_COLOR.into(), TEXT_SCALE);
}

/// Render `text` with the built-in glyphs; lowercase input is uppercased,
/// unknown characters advance without drawing
pub fn draw_text(canvas: &mut Canvas, x: i32, y: i32, text: &str, color: Rgba, scale: u32) {
    let scale = scale.max(1);
    let mut pen_x = x;
    for ch in text.chars() {
        if let Some(rows) = glyph(ch.to_ascii_uppercase()) {
            for (row_idx, row) in rows.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if row & (0b1_0000 >> col) == 0 {
                        continue;
                    }
                    for sy in 0..scale {
                        for sx in 0..scale {
                            canvas.set_pixel(
                                pen_x + (col * scale + sx) as i32,
                                y + (row_idx as u32 * scale + sy) as i32,
                                color,
                            );
                        }
                    }
                }
            }
        }
        pen_x += (GLYPH_ADVANCE * scale) as i32;
    }
}

/// Rendered width of `text` in pixels
pub fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH_ADVANCE * scale.max(1)
}

/// 5x7 bitmap per character, one byte per row, low five bits used
fn glyph(ch: char) -> Option<[u8; 7]> {
    let rows = match ch {
        ' ' => [0b00000; 7],
        ':' => [0b00000, 0b00100, 0b00100, 0b00000, 0b00100, 0b00100, 0b00000],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00110, 0b00110],
        '-' => [0b00000, 0b00000, 0b00000, 0b01110, 0b00000, 0b00000, 0b00000],
        '@' => [0b01110, 0b10001, 0b10111, 0b10101, 0b10110, 0b10000, 0b01111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        _ => return None,
    };
    Some(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyphs_cover_overlay_strings() {
        let stats = RenderStats {
            fps: 29.97,
            pipeline_ms: 12,
            overhead_ms: 3,
        };
        let mut all = fps_line(stats, Size::new(640, 480));
        all.push_str(&latency_line(stats));
        all.push_str("PREVIEW PAUSED");
        for ch in all.chars() {
            assert!(
                glyph(ch.to_ascii_uppercase()).is_some(),
                "missing glyph for {:?}",
                ch
            );
        }
    }

    #[test]
    fn test_fps_line_format() {
        let stats = RenderStats {
            fps: 30.0,
            pipeline_ms: 0,
            overhead_ms: 0,
        };
        let line = fps_line(stats, Size::new(320, 240));
        assert!(line.contains("FPS@320x240: 30.00"), "line was {:?}", line);
    }

    #[test]
    fn test_latency_line_format() {
        let stats = RenderStats {
            fps: 0.0,
            pipeline_ms: 7,
            overhead_ms: 2,
        };
        assert_eq!(latency_line(stats), "Pipeline: 7ms - Overhead: 2ms");
    }

    #[test]
    fn test_draw_text_marks_pixels() {
        let mut canvas = Canvas::new(crate::frame::Size::new(8, 8));
        canvas.fill(Rgba::BLACK);
        draw_text(&mut canvas, 0, 0, "I", Rgba::WHITE, 1);
        // Top row of 'I' is the centered bar 01110
        assert_eq!(canvas.pixel(0, 0), Rgba::BLACK);
        assert_eq!(canvas.pixel(1, 0), Rgba::WHITE);
        assert_eq!(canvas.pixel(2, 0), Rgba::WHITE);
        assert_eq!(canvas.pixel(3, 0), Rgba::WHITE);
        assert_eq!(canvas.pixel(4, 0), Rgba::BLACK);
    }

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("FPS", 2), 36);
    }

    #[test]
    fn test_overlay_tolerates_tiny_canvas() {
        let mut canvas = Canvas::new(Size::new(4, 4));
        let stats = RenderStats::default();
        draw_stats(&mut canvas, stats, Size::new(320, 240), true);
        draw_paused_banner(&mut canvas);
    }
}
