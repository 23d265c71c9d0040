// SPDX-License-Identifier: GPL-3.0-only

//! Bounded hand-off queue with evict-oldest admission
//!
//! The producer side never blocks: offering to a full queue pushes the
//! oldest entry out through the eviction hook before the new one is
//! appended. The consumer side blocks until an entry arrives or the wait
//! is interrupted.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use tracing::trace;

/// Why a blocking [`EvictingQueue::take`] returned without an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TakeError {
    /// The wait was cut short by [`EvictingQueue::interrupt`]
    Interrupted,
}

struct Shared<T> {
    entries: VecDeque<T>,
    /// Bumped by `interrupt`; waiters that observe a change give up once.
    interrupt_serial: u64,
}

/// FIFO queue of at most `capacity` entries
///
/// Every entry that leaves through eviction (a full `offer` or a `clear`)
/// passes through the hook exactly once. Entries returned by `take` do not.
pub struct EvictingQueue<T> {
    shared: Mutex<Shared<T>>,
    available: Condvar,
    capacity: usize,
    evict: Box<dyn Fn(T) + Send + Sync>,
}

impl<T> EvictingQueue<T> {
    /// Create a queue with the given capacity and eviction hook
    pub fn new<F>(capacity: usize, evict: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        assert!(capacity > 0, "queue capacity must be at least 1");
        Self {
            shared: Mutex::new(Shared {
                entries: VecDeque::with_capacity(capacity),
                interrupt_serial: 0,
            }),
            available: Condvar::new(),
            capacity,
            evict: Box::new(evict),
        }
    }

    /// Append an entry, evicting the oldest one first if the queue is full
    ///
    /// Never blocks beyond the internal lock.
    pub fn offer(&self, entry: T) {
        let mut shared = self.lock();
        if shared.entries.len() == self.capacity {
            if let Some(oldest) = shared.entries.pop_front() {
                trace!("Queue full, evicting oldest entry");
                (self.evict)(oldest);
            }
        }
        shared.entries.push_back(entry);
        self.available.notify_one();
    }

    /// Remove and return the head, blocking until one exists
    ///
    /// An `interrupt` issued while waiting wakes the call with
    /// [`TakeError::Interrupted`]; interrupts issued before the call have
    /// no effect on it.
    pub fn take(&self) -> Result<T, TakeError> {
        let mut shared = self.lock();
        let observed_serial = shared.interrupt_serial;
        loop {
            if let Some(entry) = shared.entries.pop_front() {
                return Ok(entry);
            }
            if shared.interrupt_serial != observed_serial {
                return Err(TakeError::Interrupted);
            }
            shared = self
                .available
                .wait(shared)
                .unwrap_or_else(|e| e.into_inner());
        }
    }

    /// Wake all blocked `take` calls
    pub fn interrupt(&self) {
        let mut shared = self.lock();
        shared.interrupt_serial += 1;
        self.available.notify_all();
    }

    /// Evict every queued entry through the hook
    pub fn clear(&self) {
        let mut shared = self.lock();
        while let Some(entry) = shared.entries.pop_front() {
            (self.evict)(entry);
        }
    }

    /// Number of queued entries
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Shared<T>> {
        self.shared.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    fn collecting_queue(capacity: usize) -> (Arc<EvictingQueue<u32>>, Arc<Mutex<Vec<u32>>>) {
        let evicted = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&evicted);
        let queue = Arc::new(EvictingQueue::new(capacity, move |entry| {
            log.lock().unwrap().push(entry);
        }));
        (queue, evicted)
    }

    #[test]
    fn test_fifo_order() {
        let (queue, _) = collecting_queue(4);
        queue.offer(1);
        queue.offer(2);
        queue.offer(3);
        assert_eq!(queue.take(), Ok(1));
        assert_eq!(queue.take(), Ok(2));
        assert_eq!(queue.take(), Ok(3));
    }

    #[test]
    fn test_offer_beyond_capacity_evicts_oldest_exactly_once() {
        let (queue, evicted) = collecting_queue(3);
        for n in 0..20 {
            queue.offer(n);
            assert!(queue.len() <= 3);
        }
        assert_eq!(queue.len(), 3);
        assert_eq!(*evicted.lock().unwrap(), (0..17).collect::<Vec<_>>());
        assert_eq!(queue.take(), Ok(17));
        assert_eq!(queue.take(), Ok(18));
        assert_eq!(queue.take(), Ok(19));
    }

    #[test]
    fn test_five_offers_at_capacity_two() {
        let (queue, evicted) = collecting_queue(2);
        for n in 1..=5 {
            queue.offer(n);
        }
        assert_eq!(*evicted.lock().unwrap(), vec![1, 2, 3]);
        assert_eq!(queue.take(), Ok(4));
        assert_eq!(queue.take(), Ok(5));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_clear_evicts_everything() {
        let (queue, evicted) = collecting_queue(4);
        queue.offer(7);
        queue.offer(8);
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(*evicted.lock().unwrap(), vec![7, 8]);
    }

    #[test]
    fn test_offer_wakes_blocked_take() {
        let (queue, _) = collecting_queue(2);
        let (tx, rx) = mpsc::channel();
        let taker = Arc::clone(&queue);
        let handle = thread::spawn(move || {
            tx.send(()).unwrap();
            taker.take()
        });
        rx.recv().unwrap();
        thread::sleep(Duration::from_millis(50));
        queue.offer(42);
        assert_eq!(handle.join().unwrap(), Ok(42));
    }

    #[test]
    fn test_interrupt_wakes_blocked_take() {
        let (queue, _) = collecting_queue(2);
        let (tx, rx) = mpsc::channel();
        let taker = Arc::clone(&queue);
        let handle = thread::spawn(move || {
            tx.send(()).unwrap();
            taker.take()
        });
        rx.recv().unwrap();
        thread::sleep(Duration::from_millis(50));
        queue.interrupt();
        assert_eq!(handle.join().unwrap(), Err(TakeError::Interrupted));
    }

    #[test]
    fn test_stale_interrupt_does_not_affect_later_take() {
        let (queue, _) = collecting_queue(2);
        queue.interrupt();
        queue.offer(9);
        assert_eq!(queue.take(), Ok(9));
    }

    #[test]
    fn test_take_prefers_entry_over_pending_interrupt() {
        let (queue, _) = collecting_queue(2);
        queue.offer(1);
        queue.interrupt();
        assert_eq!(queue.take(), Ok(1));
    }
}
