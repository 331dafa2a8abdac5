/*!
 * Joint Lock Acquisition
 *
 * Acquires two locks as one step. Locks are always taken in ascending address
 * order, so two threads locking the same pair from opposite sides (`a = b`
 * racing `b = a`) agree on who goes first and cannot deadlock.
 *
 * Callers must pass two distinct locks; the adapters short-circuit the
 * self-referential case before getting here.
 */

use parking_lot::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Stable identity of a lock for ordering purposes
#[inline]
fn addr<T: ?Sized>(lock: &T) -> usize {
    (lock as *const T).cast::<()>() as usize
}

/// Whether `first` sorts before `second` in acquisition order
#[inline]
pub fn acquires_first<A: ?Sized, B: ?Sized>(first: &A, second: &B) -> bool {
    addr(first) < addr(second)
}

/// Exclusive access to both locks
pub fn write_both<'a, A, B>(
    first: &'a RwLock<A>,
    second: &'a RwLock<B>,
) -> (RwLockWriteGuard<'a, A>, RwLockWriteGuard<'a, B>) {
    debug_assert_ne!(addr(first), addr(second), "joint lock on a single lock");

    if acquires_first(first, second) {
        let a = first.write();
        let b = second.write();
        (a, b)
    } else {
        let b = second.write();
        let a = first.write();
        (a, b)
    }
}

/// Exclusive access to `target`, shared access to `source`
pub fn write_read<'a, A, B>(
    target: &'a RwLock<A>,
    source: &'a RwLock<B>,
) -> (RwLockWriteGuard<'a, A>, RwLockReadGuard<'a, B>) {
    debug_assert_ne!(addr(target), addr(source), "joint lock on a single lock");

    if acquires_first(target, source) {
        let a = target.write();
        let b = source.read();
        (a, b)
    } else {
        let b = source.read();
        let a = target.write();
        (a, b)
    }
}

/// Both mutexes, for adapters guarded by a plain mutex
pub fn lock_both<'a, A, B>(
    first: &'a Mutex<A>,
    second: &'a Mutex<B>,
) -> (MutexGuard<'a, A>, MutexGuard<'a, B>) {
    debug_assert_ne!(addr(first), addr(second), "joint lock on a single lock");

    if acquires_first(first, second) {
        let a = first.lock();
        let b = second.lock();
        (a, b)
    } else {
        let b = second.lock();
        let a = first.lock();
        (a, b)
    }
}
