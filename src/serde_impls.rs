/*!
 * Serde Support
 *
 * Adapters serialize as their wrapped container, read under the adapter's
 * lock, and deserialize into a fresh adapter with the default label.
 */

use crate::map::SyncMap;
use crate::queue::SyncQueue;
use crate::vector::SyncVec;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

impl<T: Serialize> Serialize for SyncQueue<T> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        self.with(|items| serializer.collect_seq(items.iter()))
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for SyncQueue<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(SyncQueue::from)
    }
}

impl<T: Serialize> Serialize for SyncVec<T> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        self.with(|items| items.serialize(serializer))
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for SyncVec<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(SyncVec::from)
    }
}

impl<K, V, S> Serialize for SyncMap<K, V, S>
where
    K: Serialize,
    V: Serialize,
{
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        self.with(|raw| serializer.collect_map(raw.iter()))
    }
}

impl<'de, K, V, S> Deserialize<'de> for SyncMap<K, V, S>
where
    K: Deserialize<'de> + Eq + Hash,
    V: Deserialize<'de>,
    S: BuildHasher + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        HashMap::<K, V, S>::deserialize(deserializer).map(SyncMap::from)
    }
}
