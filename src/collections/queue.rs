/*!
 * Bounded Blocking Queue
 *
 * Multi-producer, multi-consumer FIFO with an optional capacity bound.
 *
 * # Blocking
 *
 * Producers park on `not_full`, consumers on `not_empty`; both release the
 * queue lock while parked. Every successful put wakes one consumer and every
 * successful get wakes one producer, after the queue lock is dropped.
 *
 * A capacity of 0 means unbounded: puts never block.
 */

use crate::core::errors::{FullError, QueueError};
use crate::core::sync::{deadline_after, Condition};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// FIFO queue shared between threads
///
/// # Example
///
/// ```ignore
/// let queue = BoundedBlockingQueue::new(2);
/// queue.put(1);
/// queue.put_nowait(2)?;
/// assert!(queue.put_nowait(3).is_err());
/// assert_eq!(queue.get(), 1);
/// ```
pub struct BoundedBlockingQueue<T> {
    items: Mutex<VecDeque<T>>,
    capacity: usize,
    not_empty: Condition,
    not_full: Condition,
}

impl<T> BoundedBlockingQueue<T> {
    /// Create a queue holding at most `capacity` items (0 = unbounded)
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
            not_empty: Condition::new(),
            not_full: Condition::new(),
        }
    }

    /// Create an unbounded queue
    pub fn unbounded() -> Self {
        Self::new(0)
    }

    /// Enqueue, blocking while the queue is full
    pub fn put(&self, item: T) {
        let mut pending = item;
        loop {
            match self.enqueue(pending, None) {
                Ok(()) => return,
                Err(FullError(item)) => pending = item,
            }
        }
    }

    /// Enqueue, giving up after `timeout`
    ///
    /// On timeout the item is handed back and the queue is unchanged.
    pub fn put_timeout(&self, item: T, timeout: Duration) -> Result<(), FullError<T>> {
        self.enqueue(item, deadline_after(timeout).or(Some(far_future())))
    }

    /// Enqueue only if there is room right now
    pub fn put_nowait(&self, item: T) -> Result<(), FullError<T>> {
        let mut items = self.items.lock();
        if self.full(&items) {
            return Err(FullError(item));
        }
        items.push_back(item);
        drop(items);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Dequeue, blocking while the queue is empty
    pub fn get(&self) -> T {
        loop {
            if let Ok(item) = self.dequeue(None) {
                return item;
            }
        }
    }

    /// Dequeue, giving up after `timeout` with `QueueError::Empty`
    pub fn get_timeout(&self, timeout: Duration) -> Result<T, QueueError> {
        self.dequeue(deadline_after(timeout).or(Some(far_future())))
    }

    /// Dequeue only if an item is available right now
    pub fn get_nowait(&self) -> Result<T, QueueError> {
        let item = self.items.lock().pop_front().ok_or(QueueError::Empty)?;
        self.not_full.notify_one();
        Ok(item)
    }

    /// Current number of items (advisory)
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Whether a put would block right now (never true when unbounded)
    pub fn is_full(&self) -> bool {
        self.full(&self.items.lock())
    }

    /// Configured bound; 0 means unbounded
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Producers parked on a full queue (diagnostics)
    pub fn waiting_producers(&self) -> usize {
        self.not_full.waiter_count()
    }

    /// Consumers parked on an empty queue (diagnostics)
    pub fn waiting_consumers(&self) -> usize {
        self.not_empty.waiter_count()
    }

    #[inline]
    fn full(&self, items: &VecDeque<T>) -> bool {
        self.capacity != 0 && items.len() >= self.capacity
    }

    fn enqueue(&self, item: T, deadline: Option<Instant>) -> Result<(), FullError<T>> {
        let capacity = self.capacity;
        let mut items = self.items.lock();
        let admitted = self.not_full.wait_while(&mut items, deadline, |q| {
            capacity != 0 && q.len() >= capacity
        });
        if admitted.is_err() {
            drop(items);
            tracing::trace!(capacity, "queue put timed out");
            return Err(FullError(item));
        }
        items.push_back(item);
        drop(items);
        self.not_empty.notify_one();
        Ok(())
    }

    fn dequeue(&self, deadline: Option<Instant>) -> Result<T, QueueError> {
        let mut items = self.items.lock();
        if self
            .not_empty
            .wait_while(&mut items, deadline, |q| q.is_empty())
            .is_err()
        {
            drop(items);
            tracing::trace!("queue get timed out");
            return Err(QueueError::Empty);
        }
        let item = items.pop_front().ok_or(QueueError::Empty)?;
        drop(items);
        self.not_full.notify_one();
        Ok(item)
    }
}

/// Stand-in deadline for timeouts too large to add to `Instant::now()`
///
/// Keeps a timed call timed, so it still reports `Full`/`Empty` rather than
/// silently becoming an untimed wait.
fn far_future() -> Instant {
    let now = Instant::now();
    now.checked_add(Duration::from_secs(60 * 60 * 24 * 365 * 30))
        .unwrap_or(now)
}

impl<T> Default for BoundedBlockingQueue<T> {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<T> std::fmt::Debug for BoundedBlockingQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedBlockingQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("waiting_producers", &self.waiting_producers())
            .field("waiting_consumers", &self.waiting_consumers())
            .finish()
    }
}
