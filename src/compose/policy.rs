// SPDX-License-Identifier: GPL-3.0-only

//! Compositing policy: scaling strategy and view rotation

use crate::compose::canvas::Rect;
use crate::frame::Size;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategy for fitting the source frame onto the output canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RenderingPolicy {
    /// Aspect-fit without any rotation transform; cheapest path
    #[default]
    MaximizeEfficiency,
    /// Rotate the composited output so a physically rotated camera appears
    /// upright, at the cost of an extra full-canvas transform
    OptimizeView,
}

impl RenderingPolicy {
    /// Get display name for the policy
    pub fn display_name(&self) -> &'static str {
        match self {
            RenderingPolicy::MaximizeEfficiency => "efficiency",
            RenderingPolicy::OptimizeView => "view",
        }
    }

    /// Parse a policy from its display name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "efficiency" => Some(RenderingPolicy::MaximizeEfficiency),
            "view" => Some(RenderingPolicy::OptimizeView),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            RenderingPolicy::MaximizeEfficiency => RenderingPolicy::OptimizeView,
            RenderingPolicy::OptimizeView => RenderingPolicy::MaximizeEfficiency,
        }
    }
}

impl fmt::Display for RenderingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Clockwise rotation applied to the composited output under
/// [`RenderingPolicy::OptimizeView`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewRotation {
    /// No rotation
    #[default]
    None,
    /// 90 degrees clockwise
    Rotate90,
    /// 180 degrees (upside down)
    Rotate180,
    /// 270 degrees clockwise (90 degrees counter-clockwise)
    Rotate270,
}

impl ViewRotation {
    /// Create rotation from an integer degree value (normalised to 0-360)
    ///
    /// Only quarter turns exist; anything not a multiple of 90 is `None`.
    pub fn from_degrees_int(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(ViewRotation::None),
            90 => Some(ViewRotation::Rotate90),
            180 => Some(ViewRotation::Rotate180),
            270 => Some(ViewRotation::Rotate270),
            _ => None,
        }
    }

    /// Get the rotation in degrees
    pub fn degrees(&self) -> u32 {
        match self {
            ViewRotation::None => 0,
            ViewRotation::Rotate90 => 90,
            ViewRotation::Rotate180 => 180,
            ViewRotation::Rotate270 => 270,
        }
    }

    /// Check if rotation swaps width and height
    pub fn swaps_dimensions(&self) -> bool {
        matches!(self, ViewRotation::Rotate90 | ViewRotation::Rotate270)
    }

    /// Next quarter turn clockwise
    pub fn next(&self) -> Self {
        match self {
            ViewRotation::None => ViewRotation::Rotate90,
            ViewRotation::Rotate90 => ViewRotation::Rotate180,
            ViewRotation::Rotate180 => ViewRotation::Rotate270,
            ViewRotation::Rotate270 => ViewRotation::None,
        }
    }
}

impl fmt::Display for ViewRotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Top-left anchored aspect-fit of `src` into `bounds`
///
/// The larger dimension is clamped to the bounds and the other scaled to
/// preserve the source aspect ratio.
pub fn aspect_fit(src: Size, bounds: Size) -> Rect {
    if src.width == 0 || src.height == 0 || bounds.width == 0 || bounds.height == 0 {
        return Rect::new(0, 0, 0, 0);
    }
    let aspect = src.aspect();
    if (bounds.height as f64) * aspect < bounds.width as f64 {
        // Bounds are wider than the source: fit to height
        let width = ((bounds.height as f64) * aspect).round() as u32;
        Rect::new(0, 0, width, bounds.height)
    } else {
        // Bounds are taller: fit to width
        let height = ((bounds.width as f64) / aspect).round() as u32;
        Rect::new(0, 0, bounds.width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_fit_exact() {
        let rect = aspect_fit(Size::new(320, 240), Size::new(640, 480));
        assert_eq!(rect, Rect::new(0, 0, 640, 480));
    }

    #[test]
    fn test_aspect_fit_wide_bounds() {
        // 4:3 source in wider bounds fits to height
        let rect = aspect_fit(Size::new(320, 240), Size::new(500, 240));
        assert_eq!(rect, Rect::new(0, 0, 320, 240));
    }

    #[test]
    fn test_aspect_fit_tall_bounds() {
        // 4:3 source in taller bounds fits to width
        let rect = aspect_fit(Size::new(320, 240), Size::new(240, 500));
        assert_eq!(rect, Rect::new(0, 0, 240, 180));
    }

    #[test]
    fn test_aspect_fit_degenerate() {
        assert_eq!(
            aspect_fit(Size::new(0, 240), Size::new(100, 100)),
            Rect::new(0, 0, 0, 0)
        );
    }

    #[test]
    fn test_rotation_helpers() {
        assert_eq!(ViewRotation::from_degrees_int(-90), Some(ViewRotation::Rotate270));
        assert_eq!(ViewRotation::from_degrees_int(450), Some(ViewRotation::Rotate90));
        assert_eq!(ViewRotation::from_degrees_int(360), Some(ViewRotation::None));
        assert_eq!(ViewRotation::from_degrees_int(45), None);
        assert!(ViewRotation::Rotate90.swaps_dimensions());
        assert!(!ViewRotation::Rotate180.swaps_dimensions());
        assert_eq!(ViewRotation::Rotate270.next(), ViewRotation::None);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            RenderingPolicy::from_name("Efficiency"),
            Some(RenderingPolicy::MaximizeEfficiency)
        );
        assert_eq!(
            RenderingPolicy::from_name("view"),
            Some(RenderingPolicy::OptimizeView)
        );
        assert_eq!(RenderingPolicy::from_name("fast"), None);
    }
}
