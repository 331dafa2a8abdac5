/*!
 * Synchronized Map
 * Key/value store with reader/writer lock splitting
 *
 * Lookups share the lock; every mutation takes it exclusively. Operations
 * that touch two maps (assignment, move, swap, merge) acquire both locks
 * jointly, so `a.assign_from(&b)` racing `b.assign_from(&a)` cannot deadlock.
 */

use crate::config::ContainerConfig;
use crate::errors::{ContainerError, ContainerResult};
use crate::sync::joint;
use ahash::RandomState;
use parking_lot::RwLock;
use std::borrow::Borrow;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use tracing::{debug, trace};

/// Hash map behind a reader/writer lock
///
/// # Performance
///
/// - Concurrent readers never block each other
/// - A writer excludes every reader for the duration of one operation
/// - One lock per map: no striping, no lock-free paths
///
/// # Example
///
/// ```
/// use threadsafe_containers::SyncMap;
///
/// let scores = SyncMap::new();
/// assert!(scores.insert("alice", 3));
/// assert!(!scores.insert("alice", 5)); // never overwrites
/// assert_eq!(scores.get("alice"), Some(3));
///
/// scores.insert_or_assign("alice", 5);
/// assert_eq!(scores.at("alice").unwrap(), 5);
/// assert!(scores.at("bob").is_err());
/// ```
pub struct SyncMap<K, V, S = RandomState> {
    inner: RwLock<HashMap<K, V, S>>,
    label: String,
}

impl<K, V> SyncMap<K, V, RandomState> {
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_config(ContainerConfig::with_capacity(capacity))
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        Self::from_parts(
            HashMap::with_capacity_and_hasher(config.initial_capacity, RandomState::new()),
            config.label,
        )
    }
}

impl<K, V, S> SyncMap<K, V, S> {
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::from_parts(
            HashMap::with_hasher(hash_builder),
            ContainerConfig::default().label,
        )
    }

    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self::from_parts(
            HashMap::with_capacity_and_hasher(capacity, hash_builder),
            ContainerConfig::default().label,
        )
    }

    fn from_parts(raw: HashMap<K, V, S>, label: String) -> Self {
        Self {
            inner: RwLock::new(raw),
            label,
        }
    }

    /// Label attached to this map's log events
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

    /// Ratio of entries to allocated slots (0.0 when nothing is allocated)
    pub fn load_factor(&self) -> f32 {
        let raw = self.inner.read();
        match raw.capacity() {
            0 => 0.0,
            capacity => raw.len() as f32 / capacity as f32,
        }
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Visit every entry under the shared lock
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        let raw = self.inner.read();
        for (k, v) in raw.iter() {
            f(k, v);
        }
    }

    /// Run `f` over the whole map under the shared lock
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&HashMap<K, V, S>) -> R,
    {
        f(&*self.inner.read())
    }
}

impl<K, V, S: Clone> SyncMap<K, V, S> {
    /// Copy of the hash builder (hash_function)
    pub fn hasher(&self) -> S {
        self.inner.read().hasher().clone()
    }
}

impl<K, V, S> SyncMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    // ------------------------------------------------------------------
    // Shared-mode lookups
    // ------------------------------------------------------------------

    /// Clone of the value for `key` (find)
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.inner.read().get(key).cloned()
    }

    /// Apply `f` to the value for `key` without cloning it
    pub fn get_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&V) -> R,
    {
        self.inner.read().get(key).map(f)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.read().contains_key(key)
    }

    /// Number of entries with `key`: always 0 or 1
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        usize::from(self.contains_key(key))
    }

    /// Clone of the value for `key`, failing with `KeyNotFound` when absent
    pub fn at<Q>(&self, key: &Q) -> ContainerResult<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
        V: Clone,
    {
        match self.inner.read().get(key) {
            Some(value) => Ok(value.clone()),
            None => {
                debug!(label = %self.label, key = ?key, "lookup of missing key");
                Err(ContainerError::key_not_found(key))
            }
        }
    }

    /// Entries matching `key`: at most one for a unique-key map
    pub fn equal_range<Q>(&self, key: &Q) -> Vec<(K, V)>
    where
        K: Borrow<Q> + Clone,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.inner
            .read()
            .get_key_value(key)
            .map(|(k, v)| (k.clone(), v.clone()))
            .into_iter()
            .collect()
    }

    // ------------------------------------------------------------------
    // Exclusive-mode mutation
    // ------------------------------------------------------------------

    /// Insert if `key` is absent; never overwrites
    ///
    /// Returns whether the pair was inserted.
    pub fn insert(&self, key: K, value: V) -> bool {
        match self.inner.write().entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Build a pair under the lock and insert it if its key is absent
    ///
    /// The pair is always constructed; it is dropped when the key exists.
    pub fn emplace<F>(&self, make: F) -> bool
    where
        F: FnOnce() -> (K, V),
    {
        let mut raw = self.inner.write();
        let (key, value) = make();
        match raw.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Insert a value built by `make` only if `key` is absent
    ///
    /// `make` is not called when the key already exists.
    pub fn try_emplace<F>(&self, key: K, make: F) -> bool
    where
        F: FnOnce() -> V,
    {
        match self.inner.write().entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(make());
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Insert or overwrite; returns true if the key was new
    pub fn insert_or_assign(&self, key: K, value: V) -> bool {
        self.inner.write().insert(key, value).is_none()
    }

    /// Insert a node taken by [`SyncMap::extract`]
    ///
    /// The node is handed back when its key is already present.
    pub fn insert_node(&self, node: (K, V)) -> Result<(), (K, V)> {
        let (key, value) = node;
        let mut raw = self.inner.write();
        if raw.contains_key(&key) {
            return Err((key, value));
        }
        raw.insert(key, value);
        Ok(())
    }

    /// Remove `key`, returning how many entries were erased (0 or 1)
    pub fn erase<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        usize::from(self.inner.write().remove(key).is_some())
    }

    /// Remove and return the entry for `key`
    pub fn extract<Q>(&self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.write().remove_entry(key)
    }

    /// Apply `f` to the value for `key` under the exclusive lock
    pub fn update<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&mut V) -> R,
    {
        self.inner.write().get_mut(key).map(f)
    }

    pub fn retain<F>(&self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.inner.write().retain(f);
    }

    pub fn reserve(&self, additional: usize) {
        self.inner.write().reserve(additional);
    }

    /// Resize the table to hold at least `capacity` entries
    ///
    /// Grows when `capacity` exceeds the current allocation, otherwise
    /// shrinks as far as both `capacity` and the current length allow.
    pub fn rehash(&self, capacity: usize) {
        let mut raw = self.inner.write();
        if capacity > raw.capacity() {
            let additional = capacity - raw.len();
            raw.reserve(additional);
        } else {
            raw.shrink_to(capacity);
        }
    }

    pub fn shrink_to_fit(&self) {
        self.inner.write().shrink_to_fit();
    }

    /// Replace the contents with `entries`
    ///
    /// As with [`SyncMap::insert`], the first occurrence of a key wins.
    pub fn assign<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut raw = self.inner.write();
        raw.clear();
        insert_absent(&mut *raw, entries);
    }

    /// Mutable access to the value for `key`, inserting `V::default()` first
    /// when absent (indexing)
    pub fn with_entry<F, R>(&self, key: K, f: F) -> R
    where
        V: Default,
        F: FnOnce(&mut V) -> R,
    {
        f(self.inner.write().entry(key).or_default())
    }

    /// Clone of the value for `key`, inserting `V::default()` when absent
    pub fn get_or_default(&self, key: K) -> V
    where
        V: Default + Clone,
    {
        self.with_entry(key, |value| value.clone())
    }

    /// Move entries whose keys are absent here out of `source`
    ///
    /// Only this map is locked; `source` is a plain map owned by the caller.
    /// Entries with duplicate keys stay in `source`. Returns how many moved.
    pub fn merge<S2>(&self, source: &mut HashMap<K, V, S2>) -> usize
    where
        S2: BuildHasher,
    {
        let mut raw = self.inner.write();
        merge_into(&mut *raw, source)
    }

    /// Exchange contents with another map
    pub fn swap(&self, other: &Self) {
        if std::ptr::eq(self, other) {
            return;
        }

        let (mut mine, mut theirs) = joint::write_both(&self.inner, &other.inner);
        std::mem::swap(&mut *mine, &mut *theirs);
        trace!(label = %self.label, other = %other.label, "swapped maps");
    }

    /// Move entries whose keys are absent here out of another map
    ///
    /// Both maps are locked exclusively and jointly. Duplicates stay in
    /// `other`. Returns how many entries moved.
    pub fn merge_from(&self, other: &Self) -> usize {
        if std::ptr::eq(self, other) {
            return 0;
        }

        let (mut mine, mut theirs) = joint::write_both(&self.inner, &other.inner);
        let moved = merge_into(&mut *mine, &mut *theirs);
        trace!(label = %self.label, source = %other.label, moved, "merged maps");
        moved
    }
}

impl<K, V, S> SyncMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Clone,
{
    /// Move construction: empty `other` into a new map
    ///
    /// Moving mutates the source, so `other` is locked exclusively.
    pub fn take(other: &Self) -> Self {
        let mut theirs = other.inner.write();
        let raw = drain_map(&mut *theirs);
        Self::from_parts(raw, other.label.clone())
    }

    /// Move assignment: replace the contents with `other`'s, leaving it empty
    pub fn take_from(&self, other: &Self) {
        if std::ptr::eq(self, other) {
            return;
        }

        let (mut mine, mut theirs) = joint::write_both(&self.inner, &other.inner);
        *mine = drain_map(&mut *theirs);
        trace!(label = %self.label, source = %other.label, len = mine.len(), "moved map");
    }
}

impl<K, V, S> SyncMap<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    /// Copy assignment: replace the contents with a copy of `other`'s
    ///
    /// Exclusive on `self`, shared on `other`, acquired jointly.
    pub fn assign_from(&self, other: &Self) {
        if std::ptr::eq(self, other) {
            return;
        }

        let (mut mine, theirs) = joint::write_read(&self.inner, &other.inner);
        mine.clone_from(&theirs);
        trace!(label = %self.label, source = %other.label, len = mine.len(), "assigned map");
    }

    /// Copy of the whole map
    pub fn snapshot(&self) -> HashMap<K, V, S> {
        self.inner.read().clone()
    }

    /// Copy of every key
    pub fn keys(&self) -> Vec<K> {
        self.inner.read().keys().cloned().collect()
    }
}

/// Swap out the contents of `raw`, keeping its hasher
fn drain_map<K, V, S: Clone>(raw: &mut HashMap<K, V, S>) -> HashMap<K, V, S> {
    let empty = HashMap::with_hasher(raw.hasher().clone());
    std::mem::replace(raw, empty)
}

fn insert_absent<K, V, S, I>(raw: &mut HashMap<K, V, S>, entries: I)
where
    K: Eq + Hash,
    S: BuildHasher,
    I: IntoIterator<Item = (K, V)>,
{
    for (key, value) in entries {
        raw.entry(key).or_insert(value);
    }
}

fn merge_into<K, V, S, S2>(target: &mut HashMap<K, V, S>, source: &mut HashMap<K, V, S2>) -> usize
where
    K: Eq + Hash,
    S: BuildHasher,
    S2: BuildHasher,
{
    let pending: Vec<(K, V)> = source.drain().collect();
    let mut moved = 0;
    for (key, value) in pending {
        if target.contains_key(&key) {
            source.insert(key, value);
        } else {
            target.insert(key, value);
            moved += 1;
        }
    }
    moved
}

impl<K, V, S> Clone for SyncMap<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    /// Copy construction under the source's shared lock
    fn clone(&self) -> Self {
        let raw = self.inner.read().clone();
        Self::from_parts(raw, self.label.clone())
    }
}

impl<K, V, S: Default> Default for SyncMap<K, V, S> {
    fn default() -> Self {
        Self::from_parts(HashMap::default(), ContainerConfig::default().label)
    }
}

impl<K, V, S> From<HashMap<K, V, S>> for SyncMap<K, V, S> {
    fn from(raw: HashMap<K, V, S>) -> Self {
        Self::from_parts(raw, ContainerConfig::default().label)
    }
}

impl<K, V, S> FromIterator<(K, V)> for SyncMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    /// First occurrence of a key wins
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut raw = HashMap::default();
        insert_absent(&mut raw, iter);
        Self::from(raw)
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for SyncMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = self.inner.read();
        f.debug_struct("SyncMap")
            .field("label", &self.label)
            .field("entries", &*raw)
            .finish()
    }
}
