/*!
 * Synchronized Queue
 * FIFO hand-off between producer and consumer threads
 */

use crate::config::ContainerConfig;
use crate::sync::joint;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::fmt;
use tracing::trace;

/// FIFO queue guarded by a single mutex with a "non-empty" condition
///
/// Every operation, including `len` and `is_empty`, takes the mutex
/// exclusively. Push order defines pop order.
///
/// # Example
///
/// ```
/// use threadsafe_containers::SyncQueue;
/// use std::sync::Arc;
/// use std::thread;
///
/// let queue = Arc::new(SyncQueue::<u32>::new());
/// let consumer = {
///     let queue = queue.clone();
///     thread::spawn(move || queue.wait_and_pop())
/// };
///
/// queue.push(42);
/// assert_eq!(consumer.join().unwrap(), 42);
/// ```
pub struct SyncQueue<T> {
    inner: Mutex<VecDeque<T>>,
    available: Condvar,
    label: String,
}

impl<T> SyncQueue<T> {
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(config.initial_capacity)),
            available: Condvar::new(),
            label: config.label,
        }
    }

    fn from_deque(items: VecDeque<T>, label: String) -> Self {
        Self {
            inner: Mutex::new(items),
            available: Condvar::new(),
            label,
        }
    }

    /// Label attached to this queue's log events
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Append to the back and wake one blocked consumer
    pub fn push(&self, value: T) {
        let mut queue = self.inner.lock();
        queue.push_back(value);
        self.available.notify_one();
    }

    /// Append a batch under one lock acquisition
    pub fn extend<I>(&self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        let mut queue = self.inner.lock();
        let before = queue.len();
        queue.extend(values);
        match queue.len() - before {
            0 => {}
            1 => {
                self.available.notify_one();
            }
            _ => {
                self.available.notify_all();
            }
        }
    }

    /// Remove the front element without blocking
    pub fn try_pop(&self) -> Option<T> {
        self.inner.lock().pop_front()
    }

    /// Remove the front element, blocking until one is available
    ///
    /// There is no timeout: the call returns only once some other thread
    /// pushes. The predicate is re-checked after every wake.
    pub fn wait_and_pop(&self) -> T {
        let mut queue = self.inner.lock();
        loop {
            if let Some(value) = queue.pop_front() {
                return value;
            }
            trace!(label = %self.label, "queue empty, parking consumer");
            self.available.wait(&mut queue);
        }
    }

    /// Remove every element, front first
    pub fn drain(&self) -> Vec<T> {
        self.inner.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Exchange contents with another queue
    ///
    /// Both mutexes are taken jointly. Consumers blocked on either side are
    /// woken if their queue ends up non-empty.
    pub fn swap(&self, other: &Self) {
        if std::ptr::eq(self, other) {
            return;
        }

        let (mut mine, mut theirs) = joint::lock_both(&self.inner, &other.inner);
        std::mem::swap(&mut *mine, &mut *theirs);
        trace!(
            label = %self.label,
            other = %other.label,
            len = mine.len(),
            other_len = theirs.len(),
            "swapped queues"
        );

        if !mine.is_empty() {
            self.available.notify_all();
        }
        if !theirs.is_empty() {
            other.available.notify_all();
        }
    }

    /// Run `f` over the queued elements, front first, under the lock
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&VecDeque<T>) -> R,
    {
        f(&*self.inner.lock())
    }
}

impl<T: Clone> SyncQueue<T> {
    /// Copy of the current contents, front first
    pub fn snapshot(&self) -> Vec<T> {
        self.inner.lock().iter().cloned().collect()
    }
}

impl<T: Clone> Clone for SyncQueue<T> {
    fn clone(&self) -> Self {
        let items = self.inner.lock().clone();
        Self::from_deque(items, self.label.clone())
    }
}

impl<T> Default for SyncQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for SyncQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_deque(iter.into_iter().collect(), ContainerConfig::default().label)
    }
}

impl<T> From<Vec<T>> for SyncQueue<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_deque(items.into(), ContainerConfig::default().label)
    }
}

impl<T: fmt::Debug> fmt::Debug for SyncQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let queue = self.inner.lock();
        f.debug_struct("SyncQueue")
            .field("label", &self.label)
            .field("items", &*queue)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn test_fifo_order() {
        let queue = SyncQueue::new();
        queue.push(1);
        queue.push(2);
        queue.push(3);

        assert_eq!(queue.try_pop(), Some(1));
        assert_eq!(queue.try_pop(), Some(2));
        assert_eq!(queue.try_pop(), Some(3));
        assert_eq!(queue.try_pop(), None);
    }

    #[test]
    fn test_try_pop_empty_does_not_block() {
        let queue: SyncQueue<u8> = SyncQueue::new();
        let start = Instant::now();
        assert!(queue.try_pop().is_none());
        assert!(start.elapsed() < Duration::from_secs(1));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_wait_and_pop_wakes_on_push() {
        let queue = Arc::new(SyncQueue::<&'static str>::new());
        let consumer = {
            let queue = queue.clone();
            thread::spawn(move || {
                let start = Instant::now();
                (queue.wait_and_pop(), start.elapsed())
            })
        };

        // Give thread time to park
        thread::sleep(Duration::from_millis(50));
        queue.push("ready");

        let (value, elapsed) = consumer.join().unwrap();
        assert_eq!(value, "ready");
        assert!(elapsed < Duration::from_secs(5));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_extend_wakes_multiple_consumers() {
        let queue = Arc::new(SyncQueue::<i32>::new());
        let consumers: Vec<_> = (0..3)
            .map(|_| {
                let queue = queue.clone();
                thread::spawn(move || queue.wait_and_pop())
            })
            .collect();

        thread::sleep(Duration::from_millis(50));
        queue.extend(vec![10, 20, 30]);

        let mut got: Vec<i32> = consumers.into_iter().map(|h| h.join().unwrap()).collect();
        got.sort();
        assert_eq!(got, vec![10, 20, 30]);
    }

    #[test]
    fn test_clone_is_independent() {
        let queue: SyncQueue<i32> = vec![1, 2].into();
        let copy = queue.clone();
        queue.push(3);

        assert_eq!(copy.snapshot(), vec![1, 2]);
        assert_eq!(queue.snapshot(), vec![1, 2, 3]);
    }

    #[test]
    fn test_swap_and_self_swap() {
        let a: SyncQueue<i32> = vec![1, 2].into();
        let b: SyncQueue<i32> = vec![9].into();

        a.swap(&b);
        assert_eq!(a.snapshot(), vec![9]);
        assert_eq!(b.snapshot(), vec![1, 2]);

        a.swap(&a);
        assert_eq!(a.snapshot(), vec![9]);
    }

    #[test]
    fn test_swap_wakes_consumer() {
        let a = Arc::new(SyncQueue::<u32>::new());
        let b: SyncQueue<u32> = vec![5].into();

        let consumer = {
            let a = a.clone();
            thread::spawn(move || a.wait_and_pop())
        };

        thread::sleep(Duration::from_millis(50));
        a.swap(&b);

        assert_eq!(consumer.join().unwrap(), 5);
        assert!(b.is_empty());
    }

    #[test]
    fn test_drain() {
        let queue: SyncQueue<i32> = (1..=4).collect();
        assert_eq!(queue.drain(), vec![1, 2, 3, 4]);
        assert_eq!(queue.len(), 0);
    }
}
