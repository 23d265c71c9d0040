// SPDX-License-Identifier: MPL-2.0

//! CPU composition of camera frames into presentable RGBA canvases
//!
//! Everything here operates on plain byte buffers; no GPU or toolkit types
//! are involved, so the same code backs the terminal surface, headless
//! rendering and snapshot export.
//!
//! # Composition stages
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────┐     ┌──────────────────┐
//! │ Source frame │ ──▶ │  frame_to_rgba   │ ──▶ │  scale / rotate  │
//! │ (YUYV, NV12, │     │  (BT.601 for     │     │  per rendering   │
//! │  RGB, ...)   │     │   YUV inputs)    │     │  policy          │
//! └──────────────┘     └──────────────────┘     └───────┬──────────┘
//!                                                       │
//!                                              ┌────────┴─────────┐
//!                                              │  stats overlay   │
//!                                              │  (optional)      │
//!                                              └──────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`canvas`]: RGBA pixel buffer with scaled and rotated blits
//! - [`convert`]: source pixel format expansion to RGBA
//! - [`overlay`]: fps/latency readout and the pause banner
//! - [`policy`]: rendering policy, view rotation and aspect-fit layout

pub mod canvas;
pub mod convert;
pub mod overlay;
pub mod policy;

pub use canvas::{Canvas, Rect, Rgba};
pub use policy::{RenderingPolicy, ViewRotation, aspect_fit};
