// SPDX-License-Identifier: GPL-3.0-only

//! Viewport lifecycle management
//!
//! [`Viewport`] owns the whole delivery pipeline: the buffer pool, the
//! evicting queue and the render worker. Callers interact with it from
//! three directions, each with its own concurrency contract:
//!
//! - lifecycle calls (`activate`, `deactivate`, `pause`, `resume`, surface
//!   callbacks) serialize on an internal mutex and may block while the
//!   worker shuts down
//! - `post` runs on the producer thread and never takes the lifecycle
//!   lock; its worst case is the bounded pool wait
//! - presentation preferences and statistics are plain atomic publishes
//!
//! The published rendering state is derived, never set directly: user
//! intent and surface availability are recorded first and the state
//! machine re-derives the target on every change.

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info};

use crate::compose::policy::{RenderingPolicy, ViewRotation};
use crate::constants::pipeline::{FRAME_QUEUE_CAPACITY, MAX_DIMENSION, POOL_HEADROOM};
use crate::constants::timing::POST_TAKE_TIMEOUT;
use crate::errors::{ViewportError, ViewportResult};
use crate::frame::{FrameRef, Size};
use crate::pipeline::pool::{FramePool, PooledFrame};
use crate::pipeline::queue::EvictingQueue;
use crate::pipeline::render_loop::RenderWorker;
use crate::pipeline::stats::{RenderStats, StatsCell};
use crate::surface::Surface;

/// Rendering state of a viewport
///
/// Derived from user intent and surface availability, never assigned
/// directly.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderingState {
    /// No render worker is running; posted frames are dropped
    #[default]
    Stopped = 0,
    /// Frames are being taken from the queue and presented
    Active = 1,
    /// The worker is alive but showing the pause banner instead of frames
    Paused = 2,
}

impl RenderingState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Active,
            2 => Self::Paused,
            _ => Self::Stopped,
        }
    }
}

impl std::fmt::Display for RenderingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Stopped => "stopped",
            Self::Active => "active",
            Self::Paused => "paused",
        };
        write!(f, "{name}")
    }
}

/// State shared with the render worker without any locking
///
/// Everything here is either atomic or behind its own short-lived mutex.
/// Readers may observe a value one frame stale; the next composition pass
/// picks up the current one.
pub(crate) struct PipelineShared {
    state: AtomicU8,
    optimize_view: AtomicBool,
    rotation_degrees: AtomicU32,
    fps_meter: AtomicBool,
    repaint: AtomicBool,
    stats: StatsCell,
    // Mutated only while the lifecycle lock is held; the worker clones the
    // Arc out and presents without holding this mutex
    surface: Mutex<Option<Arc<dyn Surface>>>,
}

impl PipelineShared {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(RenderingState::Stopped as u8),
            optimize_view: AtomicBool::new(false),
            rotation_degrees: AtomicU32::new(0),
            fps_meter: AtomicBool::new(true),
            repaint: AtomicBool::new(false),
            stats: StatsCell::default(),
            surface: Mutex::new(None),
        }
    }

    pub(crate) fn state(&self) -> RenderingState {
        RenderingState::from_raw(self.state.load(Ordering::SeqCst))
    }

    fn set_state(&self, state: RenderingState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    pub(crate) fn rendering_policy(&self) -> RenderingPolicy {
        if self.optimize_view.load(Ordering::Relaxed) {
            RenderingPolicy::OptimizeView
        } else {
            RenderingPolicy::MaximizeEfficiency
        }
    }

    fn set_rendering_policy(&self, policy: RenderingPolicy) {
        self.optimize_view
            .store(policy == RenderingPolicy::OptimizeView, Ordering::Relaxed);
    }

    pub(crate) fn optimized_rotation(&self) -> ViewRotation {
        // The cell only ever holds a canonical quarter-turn value
        ViewRotation::from_degrees_int(self.rotation_degrees.load(Ordering::Relaxed) as i32)
            .unwrap_or_default()
    }

    fn set_optimized_rotation(&self, rotation: ViewRotation) {
        self.rotation_degrees
            .store(rotation.degrees(), Ordering::Relaxed);
    }

    pub(crate) fn fps_meter_enabled(&self) -> bool {
        self.fps_meter.load(Ordering::Relaxed)
    }

    fn set_fps_meter_enabled(&self, enabled: bool) {
        self.fps_meter.store(enabled, Ordering::Relaxed);
    }

    fn request_repaint(&self) {
        self.repaint.store(true, Ordering::SeqCst);
    }

    pub(crate) fn take_repaint(&self) -> bool {
        self.repaint.swap(false, Ordering::SeqCst)
    }

    pub(crate) fn stats(&self) -> RenderStats {
        self.stats.snapshot()
    }

    pub(crate) fn surface(&self) -> Option<Arc<dyn Surface>> {
        self.surface
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set_surface(&self, surface: Option<Arc<dyn Surface>>) {
        *self.surface.lock().unwrap_or_else(|e| e.into_inner()) = surface;
    }
}

/// Pool and queue built as a pair for one geometry
#[derive(Clone)]
struct Delivery {
    size: Size,
    pool: Arc<FramePool>,
    queue: Arc<EvictingQueue<PooledFrame>>,
}

impl Delivery {
    fn new(size: Size) -> Self {
        let pool = Arc::new(FramePool::new(size, FRAME_QUEUE_CAPACITY + POOL_HEADROOM));
        let evict_pool = Arc::clone(&pool);
        let queue = Arc::new(EvictingQueue::new(FRAME_QUEUE_CAPACITY, move |frame| {
            evict_pool.recycle(frame);
        }));
        Self { size, pool, queue }
    }
}

/// Lifecycle inputs the rendering state is derived from
struct Inner {
    worker: Option<RenderWorker>,
    user_requested_active: bool,
    user_requested_pause: bool,
    surface_ready: bool,
    force_deactivate: bool,
}

impl Inner {
    fn target_state(&self) -> RenderingState {
        if !self.user_requested_active || !self.surface_ready || self.force_deactivate {
            RenderingState::Stopped
        } else if self.user_requested_pause {
            RenderingState::Paused
        } else {
            RenderingState::Active
        }
    }
}

/// Frame delivery and rendering pipeline for one preview
///
/// Lock order is `inner` before `delivery`; no code path acquires them the
/// other way around.
pub struct Viewport {
    inner: Mutex<Inner>,
    delivery: Mutex<Option<Delivery>>,
    shared: Arc<PipelineShared>,
    frames_posted: AtomicU64,
}

impl Viewport {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                worker: None,
                user_requested_active: false,
                user_requested_pause: false,
                surface_ready: false,
                force_deactivate: false,
            }),
            delivery: Mutex::new(None),
            shared: Arc::new(PipelineShared::new()),
            frames_posted: AtomicU64::new(0),
        }
    }

    /// Set the frame geometry and rebuild the pool and queue for it
    ///
    /// Only legal while stopped; buffers of the old geometry cannot be
    /// reinterpreted in place.
    ///
    /// # Errors
    /// * [`ViewportError::NotStopped`] if a worker is running
    /// * [`ViewportError::InvalidSize`] for zero or oversized dimensions
    pub fn set_size(&self, size: Size) -> ViewportResult<()> {
        if size.width == 0 || size.height == 0 {
            return Err(ViewportError::InvalidSize(format!(
                "{size} has a zero dimension"
            )));
        }
        if size.width > MAX_DIMENSION || size.height > MAX_DIMENSION {
            return Err(ViewportError::InvalidSize(format!(
                "{size} exceeds the {MAX_DIMENSION} pixel dimension limit"
            )));
        }

        let inner = self.lock_inner();
        if self.shared.state() != RenderingState::Stopped {
            return Err(ViewportError::NotStopped);
        }

        let mut delivery = self.lock_delivery();
        if let Some(old) = delivery.take() {
            old.queue.clear();
        }
        *delivery = Some(Delivery::new(size));
        drop(delivery);
        drop(inner);

        info!(%size, "Viewport geometry set");
        Ok(())
    }

    /// Frame geometry from the last successful [`Self::set_size`]
    pub fn geometry(&self) -> Option<Size> {
        self.lock_delivery().as_ref().map(|d| d.size)
    }

    /// Record that the user wants rendering to run
    ///
    /// Rendering starts once a surface is available; calling this before
    /// the surface callback is fine.
    ///
    /// # Errors
    /// * [`ViewportError::NoGeometry`] if [`Self::set_size`] was never called
    pub fn activate(&self) -> ViewportResult<()> {
        let mut inner = self.lock_inner();
        if self.lock_delivery().is_none() {
            return Err(ViewportError::NoGeometry);
        }
        inner.user_requested_active = true;
        self.reevaluate(&mut inner);
        Ok(())
    }

    /// Stop rendering and wait for the worker to finish
    ///
    /// When this returns with the state at stopped, no further present can
    /// occur until the next activation.
    pub fn deactivate(&self) {
        let mut inner = self.lock_inner();
        inner.user_requested_active = false;
        self.reevaluate(&mut inner);
    }

    /// Suspend frame consumption and show the pause banner
    ///
    /// Remembered across activations: pausing a stopped viewport makes the
    /// next activation come up paused.
    pub fn pause(&self) {
        let mut inner = self.lock_inner();
        inner.user_requested_pause = true;
        self.reevaluate(&mut inner);
    }

    /// Resume frame consumption after [`Self::pause`]
    pub fn resume(&self) {
        let mut inner = self.lock_inner();
        inner.user_requested_pause = false;
        self.reevaluate(&mut inner);
    }

    /// Attach a surface and start rendering if the user already asked for it
    pub fn on_surface_ready(&self, surface: Arc<dyn Surface>) {
        let mut inner = self.lock_inner();
        self.shared.set_surface(Some(surface));
        inner.surface_ready = true;
        inner.force_deactivate = false;
        self.shared.request_repaint();
        self.reevaluate(&mut inner);
    }

    /// Swap the surface while rendering continues
    ///
    /// Used when the output is replaced or resized without a teardown in
    /// between; the next composition pass targets the new surface.
    pub fn on_surface_changed(&self, surface: Arc<dyn Surface>) {
        let mut inner = self.lock_inner();
        self.shared.set_surface(Some(surface));
        inner.surface_ready = true;
        inner.force_deactivate = false;
        self.shared.request_repaint();
        self.reevaluate(&mut inner);
    }

    /// Detach the surface, stopping the worker first
    ///
    /// Returns only after the worker has exited, so the caller may release
    /// the surface's resources immediately afterwards. User intent is
    /// preserved: a later [`Self::on_surface_ready`] resumes rendering
    /// without another `activate` call.
    pub fn on_surface_destroyed(&self) {
        let mut inner = self.lock_inner();
        inner.force_deactivate = true;
        self.reevaluate(&mut inner);
        inner.surface_ready = false;
        self.shared.set_surface(None);
    }

    /// Hand a frame to the pipeline
    ///
    /// Copies the frame into a pooled buffer and queues it for rendering.
    /// Returns promptly in every case: when the viewport is not active the
    /// frame is dropped silently, and when the pool stays empty past the
    /// bounded wait the frame is dropped with a debug log.
    ///
    /// # Errors
    /// * [`ViewportError::InvalidFrame`] for malformed buffers or a
    ///   geometry that does not match [`Self::set_size`]
    pub fn post(&self, frame: &FrameRef<'_>) -> ViewportResult<()> {
        frame.validate()?;

        if self.shared.state() != RenderingState::Active {
            return Ok(());
        }

        let delivery = match self.lock_delivery().as_ref() {
            Some(delivery) => delivery.clone(),
            // Active without geometry cannot happen; a post racing a
            // teardown lands here at worst
            None => return Ok(()),
        };

        if frame.size != delivery.size {
            return Err(ViewportError::InvalidFrame(format!(
                "frame is {} but the viewport geometry is {}",
                frame.size, delivery.size
            )));
        }

        let Some(mut pooled) = delivery.pool.take(POST_TAKE_TIMEOUT) else {
            debug!("Frame pool exhausted, dropping posted frame");
            return Ok(());
        };

        let seq = self.frames_posted.fetch_add(1, Ordering::Relaxed);
        pooled.copy_from(frame, seq);
        delivery.queue.offer(pooled);

        // A stop that landed between the state check above and the offer
        // has already drained the queue, and a geometry change may have
        // replaced the pair entirely; sweep the late entry back into its
        // own pool so no buffer stays checked out in a queue no worker
        // will drain
        if self.shared.state() == RenderingState::Stopped || !self.delivery_is_current(&delivery) {
            delivery.queue.clear();
        }
        Ok(())
    }

    /// Publish the latest producer-side statistics for the overlay
    ///
    /// Lock-free; safe to call at frame rate from any thread.
    pub fn notify_statistics(&self, stats: RenderStats) {
        self.shared
            .stats
            .publish(stats.fps, stats.pipeline_ms, stats.overhead_ms);
    }

    /// Most recently published statistics
    pub fn statistics(&self) -> RenderStats {
        self.shared.stats()
    }

    /// Choose how frames are composited; takes effect on the next frame
    pub fn set_rendering_policy(&self, policy: RenderingPolicy) {
        self.shared.set_rendering_policy(policy);
    }

    /// Rotation applied on the view-optimized path; takes effect on the
    /// next frame
    pub fn set_optimized_rotation(&self, rotation: ViewRotation) {
        self.shared.set_optimized_rotation(rotation);
    }

    /// Toggle the fps/latency overlay
    pub fn set_fps_meter_enabled(&self, enabled: bool) {
        self.shared.set_fps_meter_enabled(enabled);
    }

    pub fn state(&self) -> RenderingState {
        self.shared.state()
    }

    pub fn rendering_policy(&self) -> RenderingPolicy {
        self.shared.rendering_policy()
    }

    pub fn optimized_rotation(&self) -> ViewRotation {
        self.shared.optimized_rotation()
    }

    pub fn fps_meter_enabled(&self) -> bool {
        self.shared.fps_meter_enabled()
    }

    /// Re-derive the rendering state and reconcile the worker with it
    ///
    /// The stop path joins the worker before publishing, so an observed
    /// stopped state guarantees the worker is gone. The start path
    /// publishes before spawning, so the worker's first state read never
    /// sees a stale stopped.
    fn reevaluate(&self, inner: &mut Inner) {
        let target = inner.target_state();
        let current = self.shared.state();
        if target == current {
            return;
        }

        debug!(from = %current, to = %target, "Rendering state change");

        match target {
            RenderingState::Stopped => {
                if let Some(mut worker) = inner.worker.take() {
                    worker.request_exit();
                    worker.join();
                }
                self.shared.set_state(RenderingState::Stopped);
                if let Some(delivery) = self.lock_delivery().as_ref() {
                    delivery.queue.clear();
                }
            }
            RenderingState::Active | RenderingState::Paused => {
                self.shared.set_state(target);
                match &inner.worker {
                    Some(worker) => worker.interrupt(),
                    None => {
                        let Some(delivery) = self.lock_delivery().clone() else {
                            return;
                        };
                        inner.worker = Some(RenderWorker::spawn(
                            Arc::clone(&self.shared),
                            delivery.queue,
                            delivery.pool,
                        ));
                    }
                }
            }
        }
    }

    fn lock_inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_delivery(&self) -> MutexGuard<'_, Option<Delivery>> {
        self.delivery.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Whether `held` is still the pair frames are delivered through
    ///
    /// A post that observes the reactivated state after a geometry change
    /// also observes the swapped pair here; the swap is ordered before the
    /// state publish.
    fn delivery_is_current(&self, held: &Delivery) -> bool {
        self.lock_delivery()
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(&current.queue, &held.queue))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Viewport {
    fn drop(&mut self) {
        self.deactivate();
        // Frames still queued must drain through the evict hook so they
        // check back into the pool before it goes away
        if let Some(delivery) = self.lock_delivery().take() {
            delivery.queue.clear();
        }
    }
}
