use core::any::{Any, TypeId};

use cj_utils::TypeIdMap;

use super::{TypeEntry, TypeKeyMap};

/// An immutable set of type registrations.
///
/// Produced by [`RegistryBuilder::build`](super::RegistryBuilder::build) or
/// by freezing a [`TypeConverter`](crate::TypeConverter). The set of
/// registered types is fixed for the lifetime of the value, so it can be
/// shared freely between threads.
#[derive(Clone, Default, Debug)]
pub struct FrozenRegistry {
    keys: TypeKeyMap,
    entries: TypeIdMap<TypeEntry>,
}

impl FrozenRegistry {
    pub(super) fn new(keys: TypeKeyMap, entries: TypeIdMap<TypeEntry>) -> Self {
        Self { keys, entries }
    }

    /// Returns the key and entry of a registered type.
    pub fn get(&self, type_id: TypeId) -> Option<(&str, &TypeEntry)> {
        let entry = self.entries.get(type_id)?;
        let key = self.keys.lookup_by_type(type_id).ok()?;
        Some((key, entry))
    }

    /// Returns the entry registered under `key`.
    pub fn get_by_key(&self, key: &str) -> Option<&TypeEntry> {
        let type_id = self.keys.lookup_by_key(key).ok()?;
        self.entries.get(type_id)
    }

    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.entries.contains(type_id)
    }

    #[inline]
    pub fn contains_type<T: Any>(&self) -> bool {
        self.entries.contains_type::<T>()
    }

    /// An iterator visiting every registered type in arbitrary order.
    pub fn types(&self) -> impl ExactSizeIterator<Item = TypeId> + '_ {
        self.entries.types()
    }

    /// An iterator visiting every registered key in arbitrary order.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &str> {
        self.keys.keys()
    }

    #[inline]
    pub fn type_keys(&self) -> &TypeKeyMap {
        &self.keys
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::FrozenRegistry;
    use crate::registry::RegistryBuilder;
    use core::any::TypeId;

    #[derive(serde::Serialize, serde::Deserialize)]
    struct Flag(bool);

    #[test]
    fn is_send_sync() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<FrozenRegistry>();
    }

    #[test]
    fn lookups() {
        let mut builder = RegistryBuilder::new();
        builder.register_serde_as::<Flag>("flag").unwrap();
        let registry = builder.build();

        let (key, entry) = registry.get(TypeId::of::<Flag>()).unwrap();
        assert_eq!(key, "flag");
        assert!(entry.is_serde());
        assert_eq!(registry.keys().collect::<Vec<_>>(), ["flag"]);
        assert_eq!(registry.types().collect::<Vec<_>>(), [TypeId::of::<Flag>()]);
        assert!(registry.get(TypeId::of::<u8>()).is_none());
        assert!(registry.get_by_key("other").is_none());
    }
}
