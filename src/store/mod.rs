//! Typed heterogeneous value stores.
//!
//! Each store maps keys to values of independently chosen types and hands
//! them back only when asked for with the right type. Three variants share
//! one read API ([`ReadStore`]):
//!
//! - [`TypedValueStore`]: concurrent and mutable
//! - [`ImmutableTypedValueStore`]: a persistent snapshot; updates return new stores
//! - [`FrozenTypedValueStore`]: built once, read without locking
//!
//! Stores compare equal across variants when they hold the same keys with
//! equal values of equal types.
//!
//! ```
//! use hostkit::store::{ReadStore, TypedValueStore};
//!
//! let store = TypedValueStore::<String>::new();
//! store.add_or_update("retries", 3u32);
//! store.add_or_update("region", String::from("eu-west"));
//!
//! assert_eq!(store.get::<u32, _>("retries"), Some(3));
//! assert_eq!(store.get::<i64, _>("retries"), None);
//!
//! let frozen = store.to_frozen();
//! assert!(frozen == store);
//! ```

mod container;
mod frozen;
mod immutable;

pub use container::{StoreValue, ValueContainer};
pub use frozen::FrozenTypedValueStore;
pub use immutable::ImmutableTypedValueStore;

use crate::error::{Error, Result};
use parking_lot::RwLock;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Key bound shared by every store variant.
pub trait StoreKey: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static {}

impl<K> StoreKey for K where K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static {}

/// Read access shared by all store variants.
pub trait ReadStore {
    type Key: StoreKey;

    /// Run `f` against the underlying map.
    fn with_map<R>(&self, f: impl FnOnce(&HashMap<Self::Key, ValueContainer>) -> R) -> R;

    /// Clone out the value under `key` if it exists and is a `T`.
    fn get<T, Q>(&self, key: &Q) -> Option<T>
    where
        T: StoreValue + Clone,
        Self::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.with_map(|map| map.get(key).and_then(|v| v.downcast_ref::<T>()).cloned())
    }

    /// Shared handle to the value under `key` if it exists and is a `T`.
    fn get_arc<T, Q>(&self, key: &Q) -> Option<Arc<T>>
    where
        T: StoreValue,
        Self::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.with_map(|map| map.get(key).and_then(ValueContainer::downcast_arc::<T>))
    }

    /// Like [`get`](ReadStore::get), but a value of the wrong type is an error
    /// instead of `None`.
    fn get_checked<T, Q>(&self, key: &Q) -> Result<Option<T>>
    where
        T: StoreValue + Clone,
        Self::Key: Borrow<Q>,
        Q: Hash + Eq + fmt::Display + ?Sized,
    {
        self.with_map(|map| match map.get(key) {
            None => Ok(None),
            Some(value) => match value.downcast_ref::<T>() {
                Some(typed) => Ok(Some(typed.clone())),
                None => Err(Error::TypeMismatch {
                    key: key.to_string(),
                    expected: std::any::type_name::<T>(),
                    actual: value.type_name(),
                }),
            },
        })
    }

    /// Borrow the value under `key` as a `T` for the duration of `f`.
    fn with<T, Q, R>(&self, key: &Q, f: impl FnOnce(&T) -> R) -> Option<R>
    where
        T: StoreValue,
        Self::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.with_map(|map| map.get(key).and_then(|v| v.downcast_ref::<T>()).map(f))
    }

    fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Self::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.with_map(|map| map.contains_key(key))
    }

    fn len(&self) -> usize {
        self.with_map(HashMap::len)
    }

    fn is_empty(&self) -> bool {
        self.with_map(HashMap::is_empty)
    }

    fn keys(&self) -> Vec<Self::Key> {
        self.with_map(|map| map.keys().cloned().collect())
    }

    fn entries(&self) -> Vec<(Self::Key, ValueContainer)> {
        self.with_map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

fn maps_equal<K: StoreKey>(
    a: &HashMap<K, ValueContainer>,
    b: &HashMap<K, ValueContainer>,
) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .all(|(key, value)| b.get(key).is_some_and(|other| value == other))
}

fn stores_equal<A: ReadStore, B: ReadStore<Key = A::Key>>(a: &A, b: &B) -> bool {
    // Snapshot one side first so two locks are never held together.
    let snapshot: HashMap<A::Key, ValueContainer> = a.with_map(|map| map.clone());
    b.with_map(|map| maps_equal(&snapshot, map))
}

/// Concurrent mutable typed store.
pub struct TypedValueStore<K: StoreKey = String> {
    map: RwLock<HashMap<K, ValueContainer>>,
}

impl<K: StoreKey> Default for TypedValueStore<K> {
    fn default() -> Self {
        Self {
            map: RwLock::new(HashMap::new()),
        }
    }
}

impl<K: StoreKey> TypedValueStore<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` unless `key` is already present. Returns whether it was inserted.
    pub fn try_add<T: StoreValue>(&self, key: impl Into<K>, value: T) -> bool {
        use std::collections::hash_map::Entry;
        match self.map.write().entry(key.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(ValueContainer::new(value));
                true
            }
        }
    }

    /// Insert or replace; the new value may have a different type.
    pub fn add_or_update<T: StoreValue>(&self, key: impl Into<K>, value: T) {
        self.map.write().insert(key.into(), ValueContainer::new(value));
    }

    /// Replace the value under `key` only if the key already exists.
    pub fn try_update<T, Q>(&self, key: &Q, value: T) -> bool
    where
        T: StoreValue,
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.map.write().get_mut(key) {
            Some(slot) => {
                *slot = ValueContainer::new(value);
                true
            }
            None => false,
        }
    }

    pub fn remove<Q>(&self, key: &Q) -> Option<ValueContainer>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.write().remove(key)
    }

    /// Remove the value under `key` only if it is a `T`.
    pub fn remove_typed<T, Q>(&self, key: &Q) -> Option<Arc<T>>
    where
        T: StoreValue,
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut map = self.map.write();
        if !map.get(key).is_some_and(ValueContainer::is::<T>) {
            return None;
        }
        map.remove(key).and_then(|value| value.downcast_arc::<T>())
    }

    pub fn clear(&self) {
        self.map.write().clear();
    }

    pub fn to_immutable(&self) -> ImmutableTypedValueStore<K> {
        ImmutableTypedValueStore::from_map(self.map.read().clone())
    }

    pub fn to_frozen(&self) -> FrozenTypedValueStore<K> {
        FrozenTypedValueStore::from_map(self.map.read().clone())
    }

    pub(crate) fn from_map(map: HashMap<K, ValueContainer>) -> Self {
        Self {
            map: RwLock::new(map),
        }
    }
}

impl<K: StoreKey> ReadStore for TypedValueStore<K> {
    type Key = K;

    fn with_map<R>(&self, f: impl FnOnce(&HashMap<K, ValueContainer>) -> R) -> R {
        f(&self.map.read())
    }
}

impl<K: StoreKey> Clone for TypedValueStore<K> {
    fn clone(&self) -> Self {
        Self::from_map(self.map.read().clone())
    }
}

impl<K: StoreKey> fmt::Debug for TypedValueStore<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.map.read().iter()).finish()
    }
}

impl<K: StoreKey, O: ReadStore<Key = K>> PartialEq<O> for TypedValueStore<K> {
    fn eq(&self, other: &O) -> bool {
        stores_equal(self, other)
    }
}

impl<K: StoreKey> FromIterator<(K, ValueContainer)> for TypedValueStore<K> {
    fn from_iter<I: IntoIterator<Item = (K, ValueContainer)>>(iter: I) -> Self {
        Self::from_map(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Endpoint {
        host: String,
        port: u16,
    }

    #[test]
    fn test_try_add_keeps_first_value() {
        let store = TypedValueStore::<String>::new();
        assert!(store.try_add("port", 8080u16));
        assert!(!store.try_add("port", 9090u16));
        assert_eq!(store.get::<u16, _>("port"), Some(8080));
    }

    #[test]
    fn test_add_or_update_may_change_type() {
        let store = TypedValueStore::<String>::new();
        store.add_or_update("value", 1i32);
        store.add_or_update("value", String::from("one"));

        assert_eq!(store.get::<i32, _>("value"), None);
        assert_eq!(store.get::<String, _>("value").as_deref(), Some("one"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_checked_reports_mismatch() {
        let store = TypedValueStore::<String>::new();
        store.add_or_update("count", 3usize);

        assert_eq!(store.get_checked::<usize, _>("count").unwrap(), Some(3));
        assert_eq!(store.get_checked::<usize, _>("missing").unwrap(), None);
        let err = store.get_checked::<String, _>("count").unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { actual: "usize", .. }));
    }

    #[test]
    fn test_with_borrows_struct_value() {
        let store = TypedValueStore::<String>::new();
        store.add_or_update(
            "db",
            Endpoint {
                host: "localhost".into(),
                port: 5432,
            },
        );

        let port = store.with("db", |endpoint: &Endpoint| endpoint.port);
        assert_eq!(port, Some(5432));
    }

    #[test]
    fn test_try_update_requires_existing_key() {
        let store = TypedValueStore::<String>::new();
        assert!(!store.try_update("missing", 1u8));
        assert!(!store.contains_key("missing"));

        store.add_or_update("present", 1u8);
        assert!(store.try_update("present", 2u8));
        assert_eq!(store.get::<u8, _>("present"), Some(2));
    }

    #[test]
    fn test_remove_typed_checks_type() {
        let store = TypedValueStore::<String>::new();
        store.add_or_update("flag", true);

        assert!(store.remove_typed::<i32, _>("flag").is_none());
        assert!(store.contains_key("flag"));

        assert_eq!(store.remove_typed::<bool, _>("flag").as_deref(), Some(&true));
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_and_clear() {
        let store = TypedValueStore::<String>::new();
        store.add_or_update("a", 1u8);
        store.add_or_update("b", 2u8);

        assert!(store.remove("a").is_some());
        assert!(store.remove("a").is_none());
        store.clear();
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_equality_across_variants() {
        let store = TypedValueStore::<String>::new();
        store.add_or_update("a", 1u8);
        store.add_or_update("b", String::from("x"));

        let immutable = store.to_immutable();
        let frozen = store.to_frozen();
        assert!(store == immutable);
        assert!(store == frozen);
        assert!(immutable == frozen);

        store.add_or_update("a", 1u16);
        assert!(store != immutable);
    }

    #[test]
    fn test_integer_keys() {
        let store = TypedValueStore::<u32>::new();
        store.add_or_update(7u32, "seven");
        assert_eq!(store.get::<&'static str, _>(&7), Some("seven"));
        assert_eq!(store.keys(), vec![7]);
    }
}
