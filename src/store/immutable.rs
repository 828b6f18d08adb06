use super::{stores_equal, ReadStore, StoreKey, StoreValue, TypedValueStore, ValueContainer};
use super::FrozenTypedValueStore;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Persistent snapshot of a typed store.
///
/// Cloning is cheap. [`with_value`](Self::with_value) and
/// [`without`](Self::without) leave `self` untouched and return a new store.
pub struct ImmutableTypedValueStore<K: StoreKey = String> {
    map: Arc<HashMap<K, ValueContainer>>,
}

impl<K: StoreKey> ImmutableTypedValueStore<K> {
    pub fn new() -> Self {
        Self::from_map(HashMap::new())
    }

    pub(crate) fn from_map(map: HashMap<K, ValueContainer>) -> Self {
        Self { map: Arc::new(map) }
    }

    /// A copy of this store with `key` set to `value`.
    pub fn with_value<T: StoreValue>(&self, key: impl Into<K>, value: T) -> Self {
        let mut map = (*self.map).clone();
        map.insert(key.into(), ValueContainer::new(value));
        Self::from_map(map)
    }

    /// A copy of this store without `key`. Returns a clone of `self` if absent.
    pub fn without<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if !self.map.contains_key(key) {
            return self.clone();
        }
        let mut map = (*self.map).clone();
        map.remove(key);
        Self::from_map(map)
    }

    pub fn to_mutable(&self) -> TypedValueStore<K> {
        TypedValueStore::from_map((*self.map).clone())
    }

    pub fn to_frozen(&self) -> FrozenTypedValueStore<K> {
        FrozenTypedValueStore::from_map((*self.map).clone())
    }
}

impl<K: StoreKey> Default for ImmutableTypedValueStore<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: StoreKey> Clone for ImmutableTypedValueStore<K> {
    fn clone(&self) -> Self {
        Self {
            map: Arc::clone(&self.map),
        }
    }
}

impl<K: StoreKey> ReadStore for ImmutableTypedValueStore<K> {
    type Key = K;

    fn with_map<R>(&self, f: impl FnOnce(&HashMap<K, ValueContainer>) -> R) -> R {
        f(&self.map)
    }
}

impl<K: StoreKey, O: ReadStore<Key = K>> PartialEq<O> for ImmutableTypedValueStore<K> {
    fn eq(&self, other: &O) -> bool {
        stores_equal(self, other)
    }
}

impl<K: StoreKey> fmt::Debug for ImmutableTypedValueStore<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.map.iter()).finish()
    }
}
