// SPDX-License-Identifier: GPL-3.0-only

//! Fixed pool of reusable frame buffers
//!
//! All buffers are allocated once, when the pipeline geometry is set, and
//! reused for the life of the pool. A checked-out buffer is owned by
//! exactly one component at a time and travels by move: pool, sink, queue,
//! render worker, back to the pool. Steady-state operation allocates
//! nothing.

use crate::constants::pipeline::MAX_BYTES_PER_PIXEL;
use crate::frame::{FrameRef, PixelFormat, Size};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// One pooled frame buffer
///
/// Storage is sized for the widest supported pixel format, so a buffer can
/// hold a frame in any format of the pool's geometry. The handle cannot be
/// cloned; give it back with [`FramePool::recycle`] when done. Dropping a
/// checked-out handle instead of recycling it trips a debug assertion.
pub struct PooledFrame {
    data: Box<[u8]>,
    size: Size,
    format: PixelFormat,
    /// Bytes of `data` valid for `format`
    len: usize,
    /// Serial of the post that last filled this buffer
    seq: u64,
    #[cfg(debug_assertions)]
    checked_out: bool,
}

impl PooledFrame {
    fn new(size: Size) -> Self {
        let bytes = size.pixel_count() * MAX_BYTES_PER_PIXEL;
        Self {
            data: vec![0u8; bytes].into_boxed_slice(),
            size,
            format: PixelFormat::Rgba,
            len: bytes,
            seq: 0,
            #[cfg(debug_assertions)]
            checked_out: false,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Serial of the post that filled this buffer
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Pixel bytes valid for the current format
    pub fn data(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Copy a posted frame in, stamping format and serial
    ///
    /// The frame must match the pool geometry and already be validated.
    pub(crate) fn copy_from(&mut self, frame: &FrameRef<'_>, seq: u64) {
        let len = frame.format.buffer_len(frame.size);
        self.data[..len].copy_from_slice(&frame.data[..len]);
        self.format = frame.format;
        self.len = len;
        self.seq = seq;
    }

    fn set_checked_out(&mut self, _value: bool) {
        #[cfg(debug_assertions)]
        {
            self.checked_out = _value;
        }
    }
}

impl Drop for PooledFrame {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        if !std::thread::panicking() {
            assert!(
                !self.checked_out,
                "pooled frame dropped while checked out; recycle it instead"
            );
        }
    }
}

struct PoolShared {
    available: Vec<PooledFrame>,
    checked_out: usize,
}

/// Fixed-capacity pool of frame buffers
///
/// `checked_out + available == capacity` holds at all times. Geometry is
/// fixed for the life of the pool; a new geometry means a new pool.
pub struct FramePool {
    shared: Mutex<PoolShared>,
    returned: Condvar,
    size: Size,
    capacity: usize,
}

impl FramePool {
    /// Preallocate `capacity` buffers of the given geometry
    pub fn new(size: Size, capacity: usize) -> Self {
        let available = (0..capacity).map(|_| PooledFrame::new(size)).collect();
        Self {
            shared: Mutex::new(PoolShared {
                available,
                checked_out: 0,
            }),
            returned: Condvar::new(),
            size,
            capacity,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Buffers currently waiting in the pool
    pub fn available(&self) -> usize {
        self.lock().available.len()
    }

    /// Check out a buffer, waiting up to `timeout` for one to come back
    ///
    /// Returns `None` when the wait timed out. Every `Some` must be paired
    /// with exactly one [`recycle`](Self::recycle).
    pub fn take(&self, timeout: Duration) -> Option<PooledFrame> {
        let deadline = Instant::now() + timeout;
        let mut shared = self.lock();
        loop {
            if let Some(mut frame) = shared.available.pop() {
                shared.checked_out += 1;
                frame.set_checked_out(true);
                return Some(frame);
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            let (guard, _timed_out) = self
                .returned
                .wait_timeout(shared, deadline - now)
                .unwrap_or_else(|e| e.into_inner());
            shared = guard;
        }
    }

    /// Put a checked-out buffer back and wake one waiting `take`
    pub fn recycle(&self, mut frame: PooledFrame) {
        frame.set_checked_out(false);
        let mut shared = self.lock();
        debug_assert!(
            shared.checked_out > 0,
            "recycle without a matching take"
        );
        shared.checked_out = shared.checked_out.saturating_sub(1);
        shared.available.push(frame);
        self.returned.notify_one();
    }

    fn lock(&self) -> MutexGuard<'_, PoolShared> {
        self.shared.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::mpsc;
    use std::thread;

    const GEO: Size = Size::new(8, 8);

    #[test]
    fn test_preallocates_capacity() {
        let pool = FramePool::new(GEO, 4);
        assert_eq!(pool.capacity(), 4);
        assert_eq!(pool.available(), 4);
    }

    #[test]
    fn test_take_and_recycle_accounting() {
        let pool = FramePool::new(GEO, 3);
        let a = pool.take(Duration::from_millis(10)).unwrap();
        let b = pool.take(Duration::from_millis(10)).unwrap();
        assert_eq!(pool.available(), 1);
        pool.recycle(a);
        assert_eq!(pool.available(), 2);
        pool.recycle(b);
        assert_eq!(pool.available(), 3);
    }

    #[test]
    fn test_exhausted_pool_times_out() {
        let pool = FramePool::new(GEO, 1);
        let held = pool.take(Duration::from_millis(10)).unwrap();
        assert!(pool.take(Duration::from_millis(20)).is_none());
        pool.recycle(held);
        let retaken = pool.take(Duration::from_millis(10));
        assert!(retaken.is_some());
        pool.recycle(retaken.unwrap());
    }

    #[test]
    fn test_recycle_wakes_blocked_take() {
        let pool = Arc::new(FramePool::new(GEO, 1));
        let held = pool.take(Duration::from_millis(10)).unwrap();

        let (tx, rx) = mpsc::channel();
        let waiter = Arc::clone(&pool);
        let handle = thread::spawn(move || {
            tx.send(()).unwrap();
            let taken = waiter.take(Duration::from_secs(5));
            let woke = taken.is_some();
            if let Some(frame) = taken {
                waiter.recycle(frame);
            }
            woke
        });
        rx.recv().unwrap();
        thread::sleep(Duration::from_millis(50));

        pool.recycle(held);
        assert!(handle.join().unwrap());
    }

    #[test]
    fn test_copy_from_stamps_format_and_len() {
        let pool = FramePool::new(Size::new(2, 2), 1);
        let mut frame = pool.take(Duration::from_millis(10)).unwrap();
        let gray = [10u8, 20, 30, 40];
        frame.copy_from(
            &FrameRef::new(&gray, Size::new(2, 2), PixelFormat::Gray8),
            7,
        );
        assert_eq!(frame.format(), PixelFormat::Gray8);
        assert_eq!(frame.data(), &gray);
        assert_eq!(frame.seq(), 7);
        pool.recycle(frame);
    }

    #[test]
    #[should_panic(expected = "checked out")]
    fn test_dropping_checked_out_frame_panics_in_debug() {
        let pool = FramePool::new(GEO, 1);
        let frame = pool.take(Duration::from_millis(10)).unwrap();
        drop(frame);
    }
}
