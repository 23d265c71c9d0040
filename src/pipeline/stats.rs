// SPDX-License-Identifier: GPL-3.0-only

//! Render statistics published by the caller and read by the overlay

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};

/// Latest statistics snapshot
///
/// The two latency figures are whatever the caller reported; the pipeline
/// stores and displays them without reinterpreting their meaning.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderStats {
    pub fps: f32,
    pub pipeline_ms: u32,
    pub overhead_ms: u32,
}

/// Last-writer-wins statistics cell
///
/// Written from any thread by `notify_statistics`, read without
/// synchronization by the render worker. Fields are independent relaxed
/// atomics; a torn snapshot across fields only mixes two adjacent updates
/// and is acceptable for an on-screen readout.
#[derive(Debug, Default)]
pub struct StatsCell {
    fps_bits: AtomicU32,
    pipeline_ms: AtomicU32,
    overhead_ms: AtomicU32,
}

impl StatsCell {
    pub fn publish(&self, fps: f32, pipeline_ms: u32, overhead_ms: u32) {
        self.fps_bits.store(fps.to_bits(), Ordering::Relaxed);
        self.pipeline_ms.store(pipeline_ms, Ordering::Relaxed);
        self.overhead_ms.store(overhead_ms, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RenderStats {
        RenderStats {
            fps: f32::from_bits(self.fps_bits.load(Ordering::Relaxed)),
            pipeline_ms: self.pipeline_ms.load(Ordering::Relaxed),
            overhead_ms: self.overhead_ms.load(Ordering::Relaxed),
        }
    }
}

/// Fixed-window moving average
#[derive(Debug)]
pub struct MovingAverage {
    samples: VecDeque<f32>,
    window: usize,
    sum: f32,
}

impl MovingAverage {
    pub fn new(window: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(window.max(1)),
            window: window.max(1),
            sum: 0.0,
        }
    }

    pub fn push(&mut self, sample: f32) {
        if self.samples.len() == self.window {
            if let Some(oldest) = self.samples.pop_front() {
                self.sum -= oldest;
            }
        }
        self.samples.push_back(sample);
        self.sum += sample;
    }

    /// Average over the current window; 0.0 before the first sample
    pub fn average(&self) -> f32 {
        if self.samples.is_empty() {
            0.0
        } else {
            self.sum / self.samples.len() as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_cell_last_writer_wins() {
        let cell = StatsCell::default();
        cell.publish(30.0, 12, 3);
        cell.publish(29.5, 14, 2);
        let snap = cell.snapshot();
        assert_eq!(snap.fps, 29.5);
        assert_eq!(snap.pipeline_ms, 14);
        assert_eq!(snap.overhead_ms, 2);
    }

    #[test]
    fn test_stats_cell_default_is_zero() {
        let snap = StatsCell::default().snapshot();
        assert_eq!(snap.fps, 0.0);
        assert_eq!(snap.pipeline_ms, 0);
        assert_eq!(snap.overhead_ms, 0);
    }

    #[test]
    fn test_moving_average_empty() {
        assert_eq!(MovingAverage::new(4).average(), 0.0);
    }

    #[test]
    fn test_moving_average_window_slides() {
        let mut avg = MovingAverage::new(3);
        avg.push(1.0);
        avg.push(2.0);
        avg.push(3.0);
        assert!((avg.average() - 2.0).abs() < 1e-6);
        avg.push(7.0);
        // window now holds 2, 3, 7
        assert!((avg.average() - 4.0).abs() < 1e-6);
    }
}
