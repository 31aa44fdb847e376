//! Bounded event mailbox between interrupt/driver context and the main loop.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;

/// Multi-producer, single-consumer queue guarded by a critical section.
///
/// Producers are driver callbacks that must never block. When the queue is
/// full the oldest event is discarded so the consumer always sees the most
/// recent history.
pub struct EventMailbox<T, const N: usize> {
    queue: Mutex<RefCell<Deque<T, N>>>,
}

impl<T, const N: usize> EventMailbox<T, N> {
    pub const fn new() -> Self {
        Self {
            queue: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Queues `event`. Returns `false` if an older event had to be dropped.
    pub fn post(&self, event: T) -> bool {
        critical_section::with(|cs| {
            let mut queue = self.queue.borrow_ref_mut(cs);
            let mut kept_all = true;
            if queue.is_full() {
                let _ = queue.pop_front();
                kept_all = false;
            }
            let _ = queue.push_back(event);
            kept_all
        })
    }

    pub fn take(&self) -> Option<T> {
        critical_section::with(|cs| self.queue.borrow_ref_mut(cs).pop_front())
    }

    pub fn clear(&self) {
        critical_section::with(|cs| self.queue.borrow_ref_mut(cs).clear());
    }

    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.queue.borrow_ref(cs).len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T, const N: usize> Default for EventMailbox<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
