// SPDX-License-Identifier: GPL-3.0-only

//! Surface with no output device
//!
//! Counts presents and optionally keeps a copy of the last canvas. Used by
//! the bench and snapshot commands and throughout the test suite.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::compose::Canvas;
use crate::frame::Size;
use crate::surface::{PresentError, Surface};

pub struct HeadlessSurface {
    size: Size,
    presented: AtomicU64,
    unavailable: AtomicBool,
    // Slot is allocated lazily on first present when recording is enabled
    recorded: Mutex<Option<Canvas>>,
    record: bool,
}

impl HeadlessSurface {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            presented: AtomicU64::new(0),
            unavailable: AtomicBool::new(false),
            recorded: Mutex::new(None),
            record: false,
        }
    }

    /// Like [`Self::new`] but keeps a copy of the most recent canvas
    pub fn recording(size: Size) -> Self {
        Self {
            record: true,
            ..Self::new(size)
        }
    }

    /// Number of canvases presented so far
    pub fn presented(&self) -> u64 {
        self.presented.load(Ordering::Relaxed)
    }

    /// Make subsequent presents fail with [`PresentError::Unavailable`]
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    /// Copy of the most recently presented canvas, if recording
    pub fn last_frame(&self) -> Option<Canvas> {
        self.recorded
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Surface for HeadlessSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn present(&self, canvas: &Canvas) -> Result<(), PresentError> {
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(PresentError::Unavailable);
        }
        if self.record {
            let mut slot = self.recorded.lock().unwrap_or_else(|e| e.into_inner());
            match slot.as_mut() {
                Some(kept) => kept.clone_from(canvas),
                None => *slot = Some(canvas.clone()),
            }
        }
        self.presented.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::Rgba;

    #[test]
    fn test_present_counts() {
        let surface = HeadlessSurface::new(Size::new(4, 4));
        let canvas = Canvas::new(Size::new(4, 4));
        assert_eq!(surface.presented(), 0);
        surface.present(&canvas).unwrap();
        surface.present(&canvas).unwrap();
        assert_eq!(surface.presented(), 2);
    }

    #[test]
    fn test_unavailable_rejects() {
        let surface = HeadlessSurface::new(Size::new(4, 4));
        surface.set_unavailable(true);
        let canvas = Canvas::new(Size::new(4, 4));
        assert!(matches!(
            surface.present(&canvas),
            Err(PresentError::Unavailable)
        ));
        assert_eq!(surface.presented(), 0);
    }

    #[test]
    fn test_recording_keeps_last_canvas() {
        let surface = HeadlessSurface::recording(Size::new(2, 2));
        assert!(surface.last_frame().is_none());

        let mut canvas = Canvas::new(Size::new(2, 2));
        canvas.fill(Rgba::new(10, 20, 30, 255));
        surface.present(&canvas).unwrap();
        canvas.fill(Rgba::new(40, 50, 60, 255));
        surface.present(&canvas).unwrap();

        let kept = surface.last_frame().unwrap();
        assert_eq!(kept.pixel(0, 0), Rgba::new(40, 50, 60, 255));
    }

    #[test]
    fn test_plain_surface_does_not_record() {
        let surface = HeadlessSurface::new(Size::new(2, 2));
        let canvas = Canvas::new(Size::new(2, 2));
        surface.present(&canvas).unwrap();
        assert!(surface.last_frame().is_none());
    }
}
