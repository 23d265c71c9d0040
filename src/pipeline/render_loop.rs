// SPDX-License-Identifier: GPL-3.0-only

//! Render worker thread
//!
//! One worker runs per activation. It blocks on the frame queue, composites
//! each frame for the current surface bounds and recycles the buffer when
//! presentation is done. Lifecycle changes reach it through the queue's
//! interrupt mechanism, so a blocked worker never has to time out.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, trace, warn};

use crate::compose::canvas::Canvas;
use crate::compose::convert::frame_to_rgba;
use crate::compose::overlay;
use crate::compose::policy::{RenderingPolicy, aspect_fit};
use crate::constants::overlay::{BACKGROUND_FILL, IDLE_FILL};
use crate::constants::timing::{FRAME_LOG_INTERVAL, PAUSE_POLL};
use crate::frame::Size;
use crate::pipeline::pool::{FramePool, PooledFrame};
use crate::pipeline::queue::{EvictingQueue, TakeError};
use crate::pipeline::viewport::{PipelineShared, RenderingState};

/// Handle to the render worker thread
pub(crate) struct RenderWorker {
    handle: Option<JoinHandle<()>>,
    exit: Arc<AtomicBool>,
    queue: Arc<EvictingQueue<PooledFrame>>,
}

impl RenderWorker {
    pub(crate) fn spawn(
        shared: Arc<PipelineShared>,
        queue: Arc<EvictingQueue<PooledFrame>>,
        pool: Arc<FramePool>,
    ) -> Self {
        let exit = Arc::new(AtomicBool::new(false));
        let exit_for_thread = Arc::clone(&exit);
        let queue_for_thread = Arc::clone(&queue);

        info!("Starting render worker");

        let handle = thread::spawn(move || {
            debug!("Render worker thread started");
            run(&shared, &queue_for_thread, &pool, &exit_for_thread);
            info!("Render worker thread exiting");
        });

        Self {
            handle: Some(handle),
            exit,
            queue,
        }
    }

    /// Signal the worker to exit (non-blocking)
    pub(crate) fn request_exit(&self) {
        self.exit.store(true, Ordering::SeqCst);
        self.queue.interrupt();
    }

    /// Wake the worker so it re-reads the lifecycle state
    pub(crate) fn interrupt(&self) {
        self.queue.interrupt();
    }

    /// Wait for the worker thread to finish
    pub(crate) fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("Waiting for render worker to finish");
            if let Err(e) = handle.join() {
                warn!("Render worker thread panicked: {:?}", e);
            } else {
                debug!("Render worker thread finished");
            }
        }
    }
}

impl Drop for RenderWorker {
    fn drop(&mut self) {
        if self.handle.is_some() {
            debug!("RenderWorker dropped, stopping");
            self.request_exit();
            self.join();
        }
    }
}

fn run(
    shared: &PipelineShared,
    queue: &EvictingQueue<PooledFrame>,
    pool: &FramePool,
    exit: &AtomicBool,
) {
    // Entries left over from a previous activation would be stale
    queue.clear();

    let mut composed = Canvas::new(Size::new(1, 1));
    let mut expanded = Canvas::new(Size::new(1, 1));
    let mut upright = Canvas::new(Size::new(1, 1));
    let mut frames_rendered: u64 = 0;
    let mut pause_painted = false;

    paint_idle(shared, &mut composed);

    loop {
        if exit.load(Ordering::SeqCst) {
            debug!("Exit signal received");
            break;
        }

        match shared.state() {
            RenderingState::Active => {
                pause_painted = false;
                match queue.take() {
                    Ok(frame) => {
                        present_frame(shared, &frame, &mut composed, &mut expanded, &mut upright);
                        pool.recycle(frame);
                        frames_rendered += 1;
                        if frames_rendered % FRAME_LOG_INTERVAL == 0 {
                            trace!(frames = frames_rendered, "Render worker progress");
                        }
                    }
                    Err(TakeError::Interrupted) => {}
                }
            }
            RenderingState::Paused => {
                // Painted once per pause, retried until a present succeeds;
                // a swapped surface requests a fresh paint explicitly
                if shared.take_repaint() || !pause_painted {
                    pause_painted = paint_paused(shared, &mut composed);
                }
                thread::sleep(PAUSE_POLL);
            }
            RenderingState::Stopped => break,
        }
    }
}

/// Composite one frame and push it to the surface
///
/// Runs without any pipeline locks held; surface access goes through a
/// cloned handle so teardown never waits on a present in flight.
fn present_frame(
    shared: &PipelineShared,
    frame: &PooledFrame,
    composed: &mut Canvas,
    expanded: &mut Canvas,
    upright: &mut Canvas,
) {
    let Some(surface) = shared.surface() else {
        return;
    };
    let bounds = surface.size();
    if bounds.width == 0 || bounds.height == 0 {
        return;
    }

    let policy = shared.rendering_policy();
    let rotation = shared.optimized_rotation();
    let fps_meter = shared.fps_meter_enabled();
    let stats = shared.stats();

    frame_to_rgba(frame, expanded);

    composed.resize(bounds);
    composed.fill(BACKGROUND_FILL.into());

    match policy {
        RenderingPolicy::MaximizeEfficiency => {
            let dest = aspect_fit(expanded.size(), bounds);
            composed.blit_scaled(expanded, dest);
            if fps_meter {
                overlay::draw_stats(composed, stats, frame.size(), false);
            }
        }
        RenderingPolicy::OptimizeView => {
            // Compose in the frame's own orientation on a virtual canvas,
            // then rotate the finished result into the surface bounds. The
            // overlay rides along with the rotation, hence the backing box.
            let virtual_bounds = if rotation.swaps_dimensions() {
                bounds.transposed()
            } else {
                bounds
            };
            upright.resize(virtual_bounds);
            upright.fill(BACKGROUND_FILL.into());
            let dest = aspect_fit(expanded.size(), virtual_bounds);
            upright.blit_scaled(expanded, dest);
            if fps_meter {
                overlay::draw_stats(upright, stats, frame.size(), true);
            }
            composed.blit_rotated(upright, rotation);
        }
    }

    if let Err(e) = surface.present(composed) {
        debug!(error = %e, "Surface present failed, skipping frame");
    }
}

/// Fill the surface with the idle placeholder shown before the first frame
fn paint_idle(shared: &PipelineShared, composed: &mut Canvas) {
    let Some(surface) = shared.surface() else {
        return;
    };
    let bounds = surface.size();
    if bounds.width == 0 || bounds.height == 0 {
        return;
    }
    composed.resize(bounds);
    composed.fill(IDLE_FILL.into());
    if let Err(e) = surface.present(composed) {
        debug!(error = %e, "Idle paint failed");
    }
}

fn paint_paused(shared: &PipelineShared, composed: &mut Canvas) -> bool {
    let Some(surface) = shared.surface() else {
        return false;
    };
    let bounds = surface.size();
    if bounds.width == 0 || bounds.height == 0 {
        return false;
    }
    composed.resize(bounds);
    overlay::draw_paused_banner(composed);
    match surface.present(composed) {
        Ok(()) => true,
        Err(e) => {
            debug!(error = %e, "Pause banner present failed");
            false
        }
    }
}
