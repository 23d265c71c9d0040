// SPDX-License-Identifier: MPL-2.0

//! Presentation surfaces the render worker draws to
//!
//! A surface is the final consumer of a composited canvas. Implementations
//! stay deliberately thin: all scaling, rotation and overlay work happens
//! in [`crate::compose`] before `present` is called, so a surface only has
//! to report its pixel bounds and push finished RGBA out.
//!
//! # Modules
//!
//! - [`headless`]: counting/recording surface for tests, bench and snapshot
//! - [`terminal`]: half-block terminal surface built on ratatui

pub mod headless;
pub mod terminal;

pub use headless::HeadlessSurface;
pub use terminal::TerminalSurface;

use std::fmt;

use crate::compose::Canvas;
use crate::frame::Size;

/// Target for composited frames
///
/// Implementations must be callable from the render worker thread while
/// other threads query them, hence the `Send + Sync` bound.
pub trait Surface: Send + Sync {
    /// Current drawable bounds in pixels
    ///
    /// Queried before every composition pass; implementations may return a
    /// different value between frames (for example after a terminal
    /// resize) and the next pass adapts.
    fn size(&self) -> Size;

    /// Push a finished canvas to the output
    ///
    /// The canvas dimensions match a recent return value of [`Self::size`]
    /// but not necessarily the current one. A failed present only skips
    /// this frame; the render worker keeps running.
    fn present(&self, canvas: &Canvas) -> Result<(), PresentError>;
}

/// Why a present call did not reach the output
#[derive(Debug)]
pub enum PresentError {
    /// The surface has been torn down or refuses frames
    Unavailable,
    /// The backend failed to draw
    Draw(String),
}

impl fmt::Display for PresentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "surface is unavailable"),
            Self::Draw(reason) => write!(f, "surface draw failed: {reason}"),
        }
    }
}

impl std::error::Error for PresentError {}
