// SPDX-License-Identifier: GPL-3.0-only

//! Frame producers
//!
//! A source is anything that calls [`Viewport::post`] on its own thread.
//! [`CaptureLoop`] provides the thread lifecycle: a named loop with a stop
//! signal, frame pacing and a joining stop. [`start_test_source`] runs the
//! built-in pattern generator through it, measuring the per-frame split
//! the overlay reports.

pub mod test_pattern;

pub use test_pattern::{PatternGenerator, TestPattern};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::constants::timing::FPS_WINDOW;
use crate::frame::{FrameRef, PixelFormat, Size};
use crate::pipeline::stats::{MovingAverage, RenderStats};
use crate::pipeline::viewport::Viewport;

/// Action returned by a capture tick to control the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    /// Keep producing
    Continue,
    /// Stop the loop gracefully
    Stop,
}

/// Controller for a producer loop running in its own thread
///
/// The tick closure runs repeatedly until it returns [`LoopAction::Stop`]
/// or a stop is requested; between ticks the loop sleeps out the remainder
/// of the pacing interval.
pub struct CaptureLoop {
    handle: Option<JoinHandle<()>>,
    stop_signal: Arc<AtomicBool>,
    name: String,
}

impl CaptureLoop {
    /// Start a paced producer loop
    ///
    /// # Arguments
    /// * `name` - descriptive name used in logging
    /// * `interval` - target time per tick; `Duration::ZERO` runs unpaced
    /// * `tick` - one production step
    pub fn start<F>(name: &str, interval: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> LoopAction + Send + 'static,
    {
        let stop_signal = Arc::new(AtomicBool::new(false));
        let stop_for_thread = Arc::clone(&stop_signal);
        let thread_name = name.to_string();

        info!(name = %name, "Starting capture loop");

        let handle = thread::spawn(move || {
            debug!(name = %thread_name, "Capture loop thread started");

            loop {
                if stop_for_thread.load(Ordering::SeqCst) {
                    debug!(name = %thread_name, "Stop signal received");
                    break;
                }

                let tick_started = Instant::now();
                match tick() {
                    LoopAction::Continue => {}
                    LoopAction::Stop => {
                        debug!(name = %thread_name, "Loop requested stop");
                        break;
                    }
                }

                if let Some(remaining) = interval.checked_sub(tick_started.elapsed())
                    && !remaining.is_zero()
                {
                    thread::sleep(remaining);
                }
            }

            info!(name = %thread_name, "Capture loop thread exiting");
        });

        Self {
            handle: Some(handle),
            stop_signal,
            name: name.to_string(),
        }
    }

    /// Check if the loop is still running
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }

    /// Clone of the stop signal, for wiring into signal handlers
    pub fn stop_signal(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_signal)
    }

    /// Signal the loop to stop without waiting for it
    pub fn request_stop(&self) {
        debug!(name = %self.name, "Requesting capture loop stop");
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Stop the loop and wait for the thread to finish
    pub fn stop(&mut self) {
        self.request_stop();
        self.join();
    }

    /// Wait for the thread to finish without signalling a stop
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!(name = %self.name, "Waiting for capture loop thread to finish");
            if let Err(e) = handle.join() {
                warn!(name = %self.name, "Capture loop thread panicked: {:?}", e);
            } else {
                debug!(name = %self.name, "Capture loop thread finished");
            }
        }
    }
}

impl Drop for CaptureLoop {
    fn drop(&mut self) {
        if self.handle.is_some() {
            debug!(name = %self.name, "CaptureLoop dropped, stopping loop");
            self.stop();
        }
    }
}

/// Configuration for the built-in test source
#[derive(Debug, Clone, Copy)]
pub struct SourceOptions {
    pub size: Size,
    pub fps: u32,
    pub pattern: TestPattern,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            size: Size::new(640, 480),
            fps: 30,
            pattern: TestPattern::default(),
        }
    }
}

impl SourceOptions {
    /// Pacing interval for the configured rate; zero fps runs unpaced
    pub fn interval(&self) -> Duration {
        if self.fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(1.0 / f64::from(self.fps))
        }
    }
}

/// Run the pattern generator against a viewport
///
/// Generates one RGBA frame per tick into a reused scratch buffer, posts
/// it, and publishes the measured split: generation time as the pipeline
/// number, post time as the overhead number. The fps figure is smoothed
/// over [`FPS_WINDOW`] ticks.
pub fn start_test_source(viewport: Arc<Viewport>, options: SourceOptions) -> CaptureLoop {
    let mut generator = PatternGenerator::new(options.pattern, options.size);
    let mut scratch = vec![0u8; options.size.pixel_count() * 4];
    let mut fps_avg = MovingAverage::new(FPS_WINDOW);
    let mut last_tick: Option<Instant> = None;

    CaptureLoop::start("test-source", options.interval(), move || {
        let generation_started = Instant::now();
        generator.fill(&mut scratch);
        let pipeline_ms = generation_started.elapsed().as_millis() as u32;

        let frame = FrameRef::new(&scratch, options.size, PixelFormat::Rgba);
        let post_started = Instant::now();
        if let Err(e) = viewport.post(&frame) {
            warn!(error = %e, "Posting generated frame failed");
            return LoopAction::Stop;
        }
        let overhead_ms = post_started.elapsed().as_millis() as u32;

        if let Some(previous) = last_tick {
            let elapsed = previous.elapsed().as_secs_f32();
            if elapsed > 0.0 {
                fps_avg.push(1.0 / elapsed);
            }
        }
        last_tick = Some(Instant::now());

        viewport.notify_statistics(RenderStats {
            fps: fps_avg.average(),
            pipeline_ms,
            overhead_ms,
        });
        LoopAction::Continue
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{HeadlessSurface, Surface};
    use std::sync::atomic::AtomicU32;

    #[test]
    fn test_basic_loop() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_for_loop = Arc::clone(&counter);

        let mut capture = CaptureLoop::start("test-loop", Duration::ZERO, move || {
            let count = counter_for_loop.fetch_add(1, Ordering::SeqCst);
            if count >= 10 {
                LoopAction::Stop
            } else {
                LoopAction::Continue
            }
        });

        capture.join();
        assert_eq!(counter.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn test_stop_signal() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_for_loop = Arc::clone(&counter);

        let mut capture = CaptureLoop::start("test-loop", Duration::from_millis(5), move || {
            counter_for_loop.fetch_add(1, Ordering::SeqCst);
            LoopAction::Continue
        });

        thread::sleep(Duration::from_millis(50));
        capture.stop();
        assert!(counter.load(Ordering::SeqCst) > 0);
        assert!(!capture.is_running());
    }

    #[test]
    fn test_pacing_limits_tick_rate() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_for_loop = Arc::clone(&counter);

        let mut capture = CaptureLoop::start("test-paced", Duration::from_millis(50), move || {
            counter_for_loop.fetch_add(1, Ordering::SeqCst);
            LoopAction::Continue
        });

        thread::sleep(Duration::from_millis(220));
        capture.stop();

        // ~4-5 ticks expected; allow slop for a loaded machine
        let ticks = counter.load(Ordering::SeqCst);
        assert!((2..=8).contains(&ticks), "ticks = {ticks}");
    }

    #[test]
    fn test_source_feeds_viewport() {
        let viewport = Arc::new(Viewport::new());
        let size = Size::new(32, 24);
        viewport.set_size(size).unwrap();

        let surface = Arc::new(HeadlessSurface::new(Size::new(64, 48)));
        viewport.on_surface_ready(Arc::clone(&surface) as Arc<dyn Surface>);
        viewport.activate().unwrap();

        let mut source = start_test_source(
            Arc::clone(&viewport),
            SourceOptions {
                size,
                fps: 0,
                pattern: TestPattern::Gradient,
            },
        );

        let deadline = Instant::now() + Duration::from_secs(5);
        while surface.presented() < 5 {
            assert!(Instant::now() < deadline, "source produced no frames");
            thread::sleep(Duration::from_millis(5));
        }

        source.stop();
        // fps becomes nonzero from the second tick; five presents imply
        // at least five ticks
        assert!(viewport.statistics().fps > 0.0, "fps stayed at zero");

        viewport.deactivate();
    }
}
