// SPDX-License-Identifier: GPL-3.0-only

//! Deterministic RGBA test patterns
//!
//! Output depends only on pattern, geometry and frame index, so renders
//! are reproducible across runs.

use serde::{Deserialize, Serialize};

use crate::frame::Size;

/// Scrolling bar colors, left to right before animation
const BAR_COLORS: [[u8; 3]; 8] = [
    [255, 255, 255],
    [255, 255, 0],
    [0, 255, 255],
    [0, 255, 0],
    [255, 0, 255],
    [255, 0, 0],
    [0, 0, 255],
    [0, 0, 0],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestPattern {
    /// Scrolling color bars
    #[default]
    Bars,
    /// Horizontal/vertical ramp with a slow color phase
    Gradient,
    /// Single color sweeping through a blue-to-red range
    Solid,
}

impl TestPattern {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Bars => "bars",
            Self::Gradient => "gradient",
            Self::Solid => "solid",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bars" => Some(Self::Bars),
            "gradient" => Some(Self::Gradient),
            "solid" => Some(Self::Solid),
            _ => None,
        }
    }
}

impl std::fmt::Display for TestPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Writes one pattern frame per call, advancing the animation each time
pub struct PatternGenerator {
    pattern: TestPattern,
    size: Size,
    frame_index: u64,
}

impl PatternGenerator {
    pub fn new(pattern: TestPattern, size: Size) -> Self {
        Self {
            pattern,
            size,
            frame_index: 0,
        }
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Fill `data` with the next RGBA frame
    ///
    /// `data` must hold exactly `width * height * 4` bytes.
    pub fn fill(&mut self, data: &mut [u8]) {
        debug_assert_eq!(data.len(), self.size.pixel_count() * 4);
        if self.size.pixel_count() == 0 {
            return;
        }
        match self.pattern {
            TestPattern::Bars => self.fill_bars(data),
            TestPattern::Gradient => self.fill_gradient(data),
            TestPattern::Solid => self.fill_solid(data),
        }
        self.frame_index += 1;
    }

    fn fill_bars(&self, data: &mut [u8]) {
        let width = self.size.width;
        let offset = ((self.frame_index * 2) % u64::from(width)) as u32;
        for row_data in data.chunks_exact_mut(width as usize * 4) {
            for (x, px) in row_data.chunks_exact_mut(4).enumerate() {
                let shifted = (x as u32 + width - offset) % width;
                let bar = &BAR_COLORS[(shifted * 8 / width) as usize];
                px[0] = bar[0];
                px[1] = bar[1];
                px[2] = bar[2];
                px[3] = 255;
            }
        }
    }

    fn fill_gradient(&self, data: &mut [u8]) {
        let width = self.size.width;
        let height = self.size.height;
        let phase = (self.frame_index % 256) as u8;
        for (y, row_data) in data.chunks_exact_mut(width as usize * 4).enumerate() {
            let g = ramp(y as u32, height);
            for (x, px) in row_data.chunks_exact_mut(4).enumerate() {
                px[0] = ramp(x as u32, width);
                px[1] = g;
                px[2] = phase;
                px[3] = 255;
            }
        }
    }

    fn fill_solid(&self, data: &mut [u8]) {
        // Triangle wave over two phases of 255 frames
        let phase = self.frame_index % 510;
        let level = if phase < 255 { phase } else { 510 - phase } as u8;
        for px in data.chunks_exact_mut(4) {
            px[0] = level;
            px[1] = 80;
            px[2] = 255 - level;
            px[3] = 255;
        }
    }
}

/// Map position 0..extent to 0..=255
fn ramp(position: u32, extent: u32) -> u8 {
    if extent <= 1 {
        return 0;
    }
    (position * 255 / (extent - 1)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(pattern: TestPattern, size: Size, frames: usize) -> Vec<u8> {
        let mut generator = PatternGenerator::new(pattern, size);
        let mut data = vec![0u8; size.pixel_count() * 4];
        for _ in 0..frames {
            generator.fill(&mut data);
        }
        data
    }

    #[test]
    fn test_deterministic_output() {
        let size = Size::new(64, 16);
        for pattern in [TestPattern::Bars, TestPattern::Gradient, TestPattern::Solid] {
            assert_eq!(
                render(pattern, size, 3),
                render(pattern, size, 3),
                "{pattern} differs between runs"
            );
        }
    }

    #[test]
    fn test_bars_animate() {
        let size = Size::new(64, 4);
        assert_ne!(render(TestPattern::Bars, size, 1), render(TestPattern::Bars, size, 5));
    }

    #[test]
    fn test_bars_first_frame_starts_white() {
        let size = Size::new(64, 4);
        let data = render(TestPattern::Bars, size, 1);
        assert_eq!(&data[0..4], &[255, 255, 255, 255]);
    }

    #[test]
    fn test_gradient_corners() {
        let size = Size::new(32, 16);
        let data = render(TestPattern::Gradient, size, 1);
        // Top-left is dark, top-right fully red
        assert_eq!(data[0], 0);
        let top_right = (size.width as usize - 1) * 4;
        assert_eq!(data[top_right], 255);
        // Bottom row fully green
        let bottom_left = (size.height as usize - 1) * size.width as usize * 4;
        assert_eq!(data[bottom_left + 1], 255);
    }

    #[test]
    fn test_degenerate_sizes_are_no_ops() {
        for size in [Size::new(0, 0), Size::new(0, 8), Size::new(8, 0)] {
            for pattern in [TestPattern::Bars, TestPattern::Gradient, TestPattern::Solid] {
                assert!(render(pattern, size, 2).is_empty());
            }
        }
    }

    #[test]
    fn test_pattern_names_round_trip() {
        for pattern in [TestPattern::Bars, TestPattern::Gradient, TestPattern::Solid] {
            assert_eq!(TestPattern::from_name(pattern.display_name()), Some(pattern));
        }
        assert_eq!(TestPattern::from_name("plasma"), None);
    }
}
