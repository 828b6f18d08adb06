use super::{stores_equal, ReadStore, StoreKey, TypedValueStore, ValueContainer};
use std::collections::HashMap;
use std::fmt;

/// Read-only typed store, built once and then shared.
///
/// Reads take no lock. Build one with [`TypedValueStore::to_frozen`] or by
/// collecting `(key, ValueContainer)` pairs.
pub struct FrozenTypedValueStore<K: StoreKey = String> {
    map: HashMap<K, ValueContainer>,
}

impl<K: StoreKey> FrozenTypedValueStore<K> {
    pub(crate) fn from_map(map: HashMap<K, ValueContainer>) -> Self {
        Self { map }
    }

    pub fn empty() -> Self {
        Self::from_map(HashMap::new())
    }

    pub fn to_mutable(&self) -> TypedValueStore<K> {
        TypedValueStore::from_map(self.map.clone())
    }
}

impl<K: StoreKey> Default for FrozenTypedValueStore<K> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<K: StoreKey> ReadStore for FrozenTypedValueStore<K> {
    type Key = K;

    fn with_map<R>(&self, f: impl FnOnce(&HashMap<K, ValueContainer>) -> R) -> R {
        f(&self.map)
    }
}

impl<K: StoreKey, O: ReadStore<Key = K>> PartialEq<O> for FrozenTypedValueStore<K> {
    fn eq(&self, other: &O) -> bool {
        stores_equal(self, other)
    }
}

impl<K: StoreKey> FromIterator<(K, ValueContainer)> for FrozenTypedValueStore<K> {
    fn from_iter<I: IntoIterator<Item = (K, ValueContainer)>>(iter: I) -> Self {
        Self::from_map(iter.into_iter().collect())
    }
}

impl<K: StoreKey> fmt::Debug for FrozenTypedValueStore<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.map.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_into_frozen() {
        let frozen: FrozenTypedValueStore<&'static str> = vec![
            ("name", ValueContainer::new(String::from("hostkit"))),
            ("workers", ValueContainer::new(4usize)),
        ]
        .into_iter()
        .collect();

        assert_eq!(frozen.get::<usize, _>("workers"), Some(4));
        assert_eq!(
            frozen.with("name", |name: &String| name.len()),
            Some("hostkit".len())
        );
        assert!(frozen.get::<u8, _>("workers").is_none());
    }

    #[test]
    fn test_frozen_snapshot_ignores_later_writes() {
        let store = TypedValueStore::<String>::new();
        store.add_or_update("a", 1u8);
        let frozen = store.to_frozen();

        store.add_or_update("a", 2u8);

        assert_eq!(frozen.get::<u8, _>("a"), Some(1));
        assert!(frozen.to_mutable() != store);
    }
}
