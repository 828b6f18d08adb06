use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Bound for values held by the typed stores.
///
/// Equality is required so whole stores can be compared; `Debug` so they can
/// be printed.
pub trait StoreValue: Any + Send + Sync + PartialEq + fmt::Debug {}

impl<T> StoreValue for T where T: Any + Send + Sync + PartialEq + fmt::Debug {}

type ErasedValue = dyn Any + Send + Sync;

/// A type-erased, cheaply clonable value that remembers what it is.
#[derive(Clone)]
pub struct ValueContainer {
    value: Arc<ErasedValue>,
    type_id: TypeId,
    type_name: &'static str,
    eq: fn(&ErasedValue, &ErasedValue) -> bool,
    debug: fn(&ErasedValue, &mut fmt::Formatter<'_>) -> fmt::Result,
}

fn eq_as<T: StoreValue>(a: &ErasedValue, b: &ErasedValue) -> bool {
    match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn debug_as<T: StoreValue>(value: &ErasedValue, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value.downcast_ref::<T>() {
        Some(value) => fmt::Debug::fmt(value, f),
        None => f.write_str("<?>"),
    }
}

impl ValueContainer {
    pub fn new<T: StoreValue>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            eq: eq_as::<T>,
            debug: debug_as::<T>,
        }
    }

    /// Name of the stored type, e.g. `alloc::string::String`.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: StoreValue>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    pub fn downcast_ref<T: StoreValue>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn downcast_arc<T: StoreValue>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.value).downcast::<T>().ok()
    }
}

impl PartialEq for ValueContainer {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && (self.eq)(&*self.value, &*other.value)
    }
}

impl fmt::Debug for ValueContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (self.debug)(&*self.value, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downcast_to_stored_type() {
        let value = ValueContainer::new(42i32);
        assert!(value.is::<i32>());
        assert_eq!(value.downcast_ref::<i32>(), Some(&42));
        assert!(value.downcast_ref::<i64>().is_none());
        assert_eq!(value.type_name(), "i32");
    }

    #[test]
    fn test_equality_requires_same_type_and_value() {
        assert_eq!(ValueContainer::new(1u8), ValueContainer::new(1u8));
        assert_ne!(ValueContainer::new(1u8), ValueContainer::new(2u8));
        assert_ne!(ValueContainer::new(1u8), ValueContainer::new(1u16));
    }

    #[test]
    fn test_debug_shows_inner_value() {
        let value = ValueContainer::new(String::from("hello"));
        assert_eq!(format!("{:?}", value), "\"hello\"");
    }
}
