// SPDX-License-Identifier: MPL-2.0

//! Viewfinder - a camera preview pipeline with a terminal viewfinder
//!
//! This library provides the core functionality for the viewfinder
//! application, including frame delivery, compositing, and surface
//! presentation.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`pipeline`]: Viewport lifecycle, frame queue, and the render worker
//! - [`compose`]: Canvas compositing, scaling, rotation, and the stats overlay
//! - [`surface`]: Output surfaces, with terminal and headless implementations
//! - [`source`]: Test pattern generation and the paced capture loop
//! - [`frame`]: Frame geometry and pixel format descriptions
//! - [`config`]: User configuration handling
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use viewfinder::frame::{FrameRef, PixelFormat, Size};
//! use viewfinder::pipeline::Viewport;
//! use viewfinder::surface::HeadlessSurface;
//!
//! # fn main() -> viewfinder::errors::ViewportResult<()> {
//! let viewport = Viewport::new();
//! let size = Size::new(64, 48);
//! viewport.set_size(size)?;
//! viewport.on_surface_ready(Arc::new(HeadlessSurface::new(size)));
//! viewport.activate()?;
//!
//! let pixels = vec![0u8; size.pixel_count() * 4];
//! viewport.post(&FrameRef::new(&pixels, size, PixelFormat::Rgba))?;
//!
//! viewport.deactivate();
//! # Ok(())
//! # }
//! ```

pub mod compose;
pub mod config;
pub mod constants;
pub mod errors;
pub mod frame;
pub mod pipeline;
pub mod source;
pub mod surface;

// Re-export commonly used types
pub use compose::{RenderingPolicy, ViewRotation};
pub use errors::{ViewportError, ViewportResult};
pub use frame::{FrameRef, PixelFormat, Size};
pub use pipeline::{RenderStats, RenderingState, Viewport};
pub use surface::{HeadlessSurface, PresentError, Surface, TerminalSurface};
