// SPDX-License-Identifier: MPL-2.0

//! Frame delivery pipeline from producer thread to render worker
//!
//! The pipeline decouples the frame producer from presentation so that a
//! slow surface can never stall capture: the producer always returns
//! promptly and stale frames are dropped in favor of fresh ones.
//!
//! # Data flow
//!
//! ```text
//! ┌──────────────┐  post   ┌─────────────────┐  take   ┌───────────────┐
//! │   Producer   │ ──────▶ │  EvictingQueue  │ ──────▶ │ Render worker │
//! │   thread     │  copy   │  (capacity 2)   │  block  │  (per start)  │
//! └──────┬───────┘         └─────────────────┘         └───────┬───────┘
//!        │ take                                        recycle │
//!        │           ┌─────────────────┐                       │
//!        └─────────▶ │    FramePool    │ ◀─────────────────────┘
//!                    │  (fixed size)   │
//!                    └─────────────────┘
//! ```
//!
//! Pool buffers circulate for the lifetime of a geometry; after the pool
//! warms up, steady-state delivery performs no allocation.
//!
//! # Modules
//!
//! - [`pool`]: fixed set of reusable frame buffers
//! - [`queue`]: bounded evicting handoff between producer and worker
//! - [`render_loop`]: the per-activation render worker thread
//! - [`stats`]: render statistics published to producers
//! - [`viewport`]: lifecycle state machine tying the pieces together

pub mod pool;
pub mod queue;
pub mod render_loop;
pub mod stats;
pub mod viewport;

pub use stats::RenderStats;
pub use viewport::{RenderingState, Viewport};
