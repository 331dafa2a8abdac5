/*!
 * Wait Gate
 *
 * Blocking hand-off for containers guarded by a `RwLock`.
 *
 * `parking_lot::Condvar` only pairs with a `Mutex`, so the gate keeps its own
 * mutex next to the condvar. Consumers hold the gate mutex while they test
 * the predicate and go to sleep; producers take it before notifying. That
 * brackets the check-then-sleep window and rules out lost wakeups while the
 * container itself stays behind a reader/writer lock.
 */

use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Condvar plus the mutex it sleeps on
pub struct WaitGate {
    mutex: Mutex<()>,
    condvar: Condvar,
    waiters: AtomicUsize,
}

impl WaitGate {
    pub fn new() -> Self {
        Self {
            mutex: Mutex::new(()),
            condvar: Condvar::new(),
            waiters: AtomicUsize::new(0),
        }
    }

    /// Block until `attempt` produces a value
    ///
    /// `attempt` runs once before sleeping and again after every wake, so
    /// spurious wakeups and competing consumers are tolerated.
    pub fn wait_until<T, F>(&self, mut attempt: F) -> T
    where
        F: FnMut() -> Option<T>,
    {
        if let Some(value) = attempt() {
            return value;
        }

        let mut gate = self.mutex.lock();
        // Registered before the re-check: a producer that reads zero waiters
        // published its value before this increment and the re-check sees it.
        self.waiters.fetch_add(1, Ordering::SeqCst);

        let value = loop {
            if let Some(value) = attempt() {
                break value;
            }
            self.condvar.wait(&mut gate);
        };

        self.waiters.fetch_sub(1, Ordering::SeqCst);
        value
    }

    /// Wake one sleeping consumer, returns whether anyone was registered
    pub fn notify_one(&self) -> bool {
        if self.waiters.load(Ordering::SeqCst) == 0 {
            return false;
        }
        let _gate = self.mutex.lock();
        self.condvar.notify_one()
    }

    /// Wake every sleeping consumer, returns how many were woken
    pub fn notify_all(&self) -> usize {
        if self.waiters.load(Ordering::SeqCst) == 0 {
            return 0;
        }
        let _gate = self.mutex.lock();
        self.condvar.notify_all()
    }

    /// Approximate number of registered consumers (for diagnostics)
    pub fn waiter_count(&self) -> usize {
        self.waiters.load(Ordering::SeqCst)
    }
}

impl Default for WaitGate {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WaitGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaitGate")
            .field("waiters", &self.waiter_count())
            .finish()
    }
}
