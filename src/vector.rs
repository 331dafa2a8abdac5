/*!
 * Synchronized Vector
 * Random-access container with batch and blocking removal from the tail
 */

use crate::config::ContainerConfig;
use crate::errors::{ContainerError, ContainerResult};
use crate::sync::{joint, WaitGate};
use parking_lot::RwLock;
use std::fmt;
use tracing::{debug, trace};

/// Growable array behind a reader/writer lock
///
/// Queries take the lock shared; anything that mutates takes it exclusively.
/// Tail consumers blocked in [`SyncVec::wait_and_pop_back`] are woken by every
/// operation that can leave the vector non-empty.
///
/// The vector lock is always released before the wait gate is signalled.
/// A consumer re-checks the vector while holding the gate, so signalling
/// with the vector lock held would invert that order.
pub struct SyncVec<T> {
    inner: RwLock<Vec<T>>,
    gate: WaitGate,
    label: String,
}

impl<T> SyncVec<T> {
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_config(ContainerConfig::with_capacity(capacity))
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        Self::from_parts(Vec::with_capacity(config.initial_capacity), config.label)
    }

    fn from_parts(items: Vec<T>, label: String) -> Self {
        Self {
            inner: RwLock::new(items),
            gate: WaitGate::new(),
            label,
        }
    }

    /// Label attached to this vector's log events
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.read().capacity()
    }

    pub fn reserve(&self, additional: usize) {
        self.inner.write().reserve(additional);
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Append one element and wake a tail consumer
    pub fn push_back(&self, value: T) {
        self.inner.write().push(value);
        self.gate.notify_one();
    }

    /// Append an element constructed while the lock is held
    pub fn emplace_back<F>(&self, make: F)
    where
        F: FnOnce() -> T,
    {
        {
            let mut items = self.inner.write();
            items.push(make());
        }
        self.gate.notify_one();
    }

    /// Append a batch under one lock acquisition
    pub fn extend<I>(&self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        let added = {
            let mut items = self.inner.write();
            let before = items.len();
            items.extend(values);
            items.len() - before
        };

        match added {
            0 => {}
            1 => {
                self.gate.notify_one();
            }
            _ => {
                self.gate.notify_all();
            }
        }
    }

    /// Remove the last element without blocking
    pub fn try_pop_back(&self) -> Option<T> {
        self.inner.write().pop()
    }

    /// Remove the last element, blocking until one is available
    ///
    /// Always exclusive: only one thread can take a given tail element.
    /// There is no timeout; some other thread must eventually push.
    pub fn wait_and_pop_back(&self) -> T {
        self.gate.wait_until(|| {
            let popped = self.inner.write().pop();
            if popped.is_none() {
                trace!(label = %self.label, "vector empty, parking consumer");
            }
            popped
        })
    }

    /// Remove up to `count` trailing elements, original order preserved
    ///
    /// Never fails; returns fewer than `count` (possibly none) when the
    /// vector is shorter.
    pub fn try_pop(&self, count: usize) -> Vec<T> {
        let mut items = self.inner.write();
        let at = items.len() - count.min(items.len());
        items.split_off(at)
    }

    /// Like [`SyncVec::try_pop`], reusing `out`
    ///
    /// `out` is cleared first. Returns the number of elements moved.
    pub fn try_pop_into(&self, count: usize, out: &mut Vec<T>) -> usize {
        out.clear();
        let mut items = self.inner.write();
        let at = items.len() - count.min(items.len());
        out.extend(items.drain(at..));
        out.len()
    }

    /// Remove exactly `count` trailing elements or nothing at all
    pub fn try_pop_require(&self, count: usize) -> ContainerResult<Vec<T>> {
        let mut items = self.inner.write();
        let available = items.len();
        if available < count {
            drop(items);
            debug!(
                label = %self.label,
                requested = count,
                available,
                "all-or-nothing pop refused"
            );
            return Err(ContainerError::InsufficientElements {
                requested: count,
                available,
            });
        }
        Ok(items.split_off(available - count))
    }

    /// Like [`SyncVec::try_pop_require`], reusing `out`
    ///
    /// `out` is left untouched on failure.
    pub fn try_pop_require_into(&self, count: usize, out: &mut Vec<T>) -> ContainerResult<()> {
        let mut items = self.inner.write();
        let available = items.len();
        if available < count {
            return Err(ContainerError::InsufficientElements {
                requested: count,
                available,
            });
        }
        out.clear();
        out.extend(items.drain(available - count..));
        Ok(())
    }

    /// Run `f` over the elements under the shared lock
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[T]) -> R,
    {
        f(self.inner.read().as_slice())
    }

    /// Run `f` over the vector under the exclusive lock
    ///
    /// Tail consumers are woken afterwards if the vector is non-empty.
    pub fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Vec<T>) -> R,
    {
        let (result, non_empty) = {
            let mut items = self.inner.write();
            let result = f(&mut *items);
            (result, !items.is_empty())
        };
        if non_empty {
            self.gate.notify_all();
        }
        result
    }

    /// Exchange contents with another vector
    pub fn swap(&self, other: &Self) {
        if std::ptr::eq(self, other) {
            return;
        }

        let (mine_filled, theirs_filled) = {
            let (mut mine, mut theirs) = joint::write_both(&self.inner, &other.inner);
            std::mem::swap(&mut *mine, &mut *theirs);
            (!mine.is_empty(), !theirs.is_empty())
        };
        trace!(label = %self.label, other = %other.label, "swapped vectors");

        if mine_filled {
            self.gate.notify_all();
        }
        if theirs_filled {
            other.gate.notify_all();
        }
    }

    /// Approximate number of threads parked in `wait_and_pop_back`
    pub fn waiter_count(&self) -> usize {
        self.gate.waiter_count()
    }
}

impl<T: Clone> SyncVec<T> {
    /// Clone of the element at `index`
    pub fn get(&self, index: usize) -> Option<T> {
        self.inner.read().get(index).cloned()
    }

    /// Clone of the last element
    pub fn last(&self) -> Option<T> {
        self.inner.read().last().cloned()
    }

    /// Copy of the current contents
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.read().clone()
    }

    /// Replace the contents with a copy of `other`
    ///
    /// Exclusive on `self`, shared on `other`, acquired jointly.
    pub fn assign_from(&self, other: &Self) {
        if std::ptr::eq(self, other) {
            return;
        }

        let non_empty = {
            let (mut mine, theirs) = joint::write_read(&self.inner, &other.inner);
            mine.clone_from(&theirs);
            !mine.is_empty()
        };
        trace!(label = %self.label, source = %other.label, "assigned vector");

        if non_empty {
            self.gate.notify_all();
        }
    }
}

impl<T: Clone> Clone for SyncVec<T> {
    fn clone(&self) -> Self {
        let items = self.inner.read().clone();
        Self::from_parts(items, self.label.clone())
    }
}

impl<T> Default for SyncVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for SyncVec<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_parts(items, ContainerConfig::default().label)
    }
}

impl<T> FromIterator<T> for SyncVec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        iter.into_iter().collect::<Vec<T>>().into()
    }
}

impl<T: fmt::Debug> fmt::Debug for SyncVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items = self.inner.read();
        f.debug_struct("SyncVec")
            .field("label", &self.label)
            .field("items", &*items)
            .finish()
    }
}
