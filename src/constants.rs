// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Pipeline sizing constants
pub mod pipeline {
    /// Frame hand-off queue capacity (keep small for low latency)
    pub const FRAME_QUEUE_CAPACITY: usize = 2;

    /// Pool buffers beyond the queue capacity: one checked out by the render
    /// worker plus one so an incoming post can proceed without waiting
    pub const POOL_HEADROOM: usize = 2;

    /// Bytes per pixel of the widest supported source format; pool buffers
    /// are sized for it so any supported format fits the same storage
    pub const MAX_BYTES_PER_PIXEL: usize = 4;

    /// Upper bound on either frame dimension; anything larger is treated
    /// as caller error rather than allocated
    pub const MAX_DIMENSION: u32 = 16_384;
}

/// Timing constants
pub mod timing {
    use std::time::Duration;

    /// Sleep slice while paused; exit and state changes are re-checked
    /// between slices
    pub const PAUSE_POLL: Duration = Duration::from_millis(50);

    /// Bound on how long `post` waits for a pool buffer before dropping
    /// the frame
    pub const POST_TAKE_TIMEOUT: Duration = Duration::from_millis(100);

    /// Frame counter modulo for periodic render-loop logging
    pub const FRAME_LOG_INTERVAL: u64 = 30;

    /// Sample window for the demo source's fps smoothing
    pub const FPS_WINDOW: usize = 30;
}

/// Overlay geometry and colors
///
/// The stat box and banner sizes are plain tunables; nothing downstream
/// derives layout from them.
pub mod overlay {
    /// Stat box width in pixels (view-optimized compositing)
    pub const STAT_BOX_WIDTH: u32 = 450;

    /// Stat box height in pixels (view-optimized compositing)
    pub const STAT_BOX_HEIGHT: u32 = 120;

    /// Paused banner strip height in pixels
    pub const BANNER_HEIGHT: u32 = 40;

    /// Left inset for overlay text
    pub const TEXT_INSET_X: u32 = 5;

    /// Distance from the canvas bottom to the fps line
    pub const FPS_LINE_FROM_BOTTOM: u32 = 45;

    /// Distance from the canvas bottom to the latency line
    pub const LATENCY_LINE_FROM_BOTTOM: u32 = 10;

    /// Integer scale applied to the built-in glyphs
    pub const TEXT_SCALE: u32 = 2;

    /// Fill shown between activation and the first frame
    pub const IDLE_FILL: [u8; 4] = [26, 58, 110, 255];

    /// Fill shown while the pipeline is paused
    pub const PAUSE_FILL: [u8; 4] = [255, 166, 0, 255];

    /// Letterbox background behind composited frames
    pub const BACKGROUND_FILL: [u8; 4] = [0, 0, 0, 255];

    /// Stat box and banner backing color
    pub const BOX_FILL: [u8; 4] = [0, 0, 0, 200];

    /// Overlay text color
    pub const TEXT_COLOR: [u8; 4] = [255, 255, 255, 255];
}
