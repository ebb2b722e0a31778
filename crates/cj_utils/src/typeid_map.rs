use core::any::TypeId;
use core::fmt;

use crate::hash::{HashMap, NoOpHashState};

/// A map from [`TypeId`] to `V`.
///
/// `TypeId`s are hashed with [`NoOpHashState`]: they are random enough on
/// their own, so lookups skip the hash function entirely.
///
/// ```
/// use core::any::TypeId;
/// use cj_utils::TypeIdMap;
///
/// let mut names = TypeIdMap::new();
/// names.insert(TypeId::of::<String>(), "string");
///
/// assert_eq!(names.get_type::<String>(), Some(&"string"));
/// assert!(!names.contains_type::<u8>());
/// ```
pub struct TypeIdMap<V> {
    map: HashMap<TypeId, V, NoOpHashState>,
}

impl<V> TypeIdMap<V> {
    #[inline]
    pub const fn new() -> Self {
        Self {
            map: HashMap::with_hasher(NoOpHashState),
        }
    }

    #[inline]
    pub fn get(&self, type_id: TypeId) -> Option<&V> {
        self.map.get(&type_id)
    }

    #[inline]
    pub fn get_type<T: ?Sized + 'static>(&self) -> Option<&V> {
        self.get(TypeId::of::<T>())
    }

    /// Stores `value` for `type_id`, returning the value it replaces.
    #[inline]
    pub fn insert(&mut self, type_id: TypeId, value: V) -> Option<V> {
        self.map.insert(type_id, value)
    }

    #[inline]
    pub fn remove(&mut self, type_id: TypeId) -> Option<V> {
        self.map.remove(&type_id)
    }

    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.map.contains_key(&type_id)
    }

    #[inline]
    pub fn contains_type<T: ?Sized + 'static>(&self) -> bool {
        self.contains(TypeId::of::<T>())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The stored types, in arbitrary order.
    pub fn types(&self) -> impl ExactSizeIterator<Item = TypeId> + '_ {
        self.map.keys().copied()
    }
}

impl<V> Default for TypeIdMap<V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> Clone for TypeIdMap<V> {
    fn clone(&self) -> Self {
        Self {
            map: self.map.clone(),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for TypeIdMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.map.iter()).finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::TypeIdMap;
    use core::any::TypeId;

    #[test]
    fn replace_and_remove() {
        let mut map = TypeIdMap::new();
        assert_eq!(map.insert(TypeId::of::<u8>(), 1), None);
        assert_eq!(map.insert(TypeId::of::<u16>(), 2), None);
        assert_eq!(map.insert(TypeId::of::<u8>(), 3), Some(1));
        assert_eq!(map.len(), 2);

        assert_eq!(map.remove(TypeId::of::<u16>()), Some(2));
        assert_eq!(map.remove(TypeId::of::<u16>()), None);
        assert_eq!(map.types().collect::<alloc::vec::Vec<_>>(), [TypeId::of::<u8>()]);
    }
}
