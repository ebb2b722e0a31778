use alloc::string::String;
use core::any::TypeId;

use cj_utils::BiMap;

use crate::RegistryError;

/// A one-to-one mapping between type keys and types.
///
/// Every key names at most one type and every type owns at most one key.
/// Inserting a pair that collides on either side evicts the old pair from
/// both directions, so lookups never return stale results.
///
/// # Examples
///
/// ```
/// use core::any::TypeId;
/// use cj_json::registry::TypeKeyMap;
///
/// let mut keys = TypeKeyMap::new();
/// keys.insert("num", TypeId::of::<u32>()).unwrap();
///
/// // re-keying u32 drops "num"
/// keys.insert("u32", TypeId::of::<u32>()).unwrap();
/// assert!(keys.lookup_by_key("num").is_err());
/// assert_eq!(keys.lookup_by_type(TypeId::of::<u32>()), Ok("u32"));
/// ```
#[derive(Clone, Default, Debug)]
pub struct TypeKeyMap {
    map: BiMap<String, TypeId>,
}

impl TypeKeyMap {
    /// Creates an empty map.
    #[inline]
    pub const fn new() -> Self {
        Self { map: BiMap::new() }
    }

    /// Pairs `key` with `type_id`.
    ///
    /// Returns `Ok(true)` if an older pair sharing the key or the type was
    /// dropped. Empty keys are rejected.
    pub fn insert(&mut self, key: impl Into<String>, type_id: TypeId) -> Result<bool, RegistryError> {
        let key = key.into();
        if key.is_empty() {
            return Err(RegistryError::InvalidKey);
        }
        Ok(self.map.insert(key, type_id))
    }

    /// Returns the type paired with `key`.
    pub fn lookup_by_key(&self, key: &str) -> Result<TypeId, RegistryError> {
        self.map
            .get_by_left(key)
            .copied()
            .ok_or_else(|| RegistryError::KeyNotFound(key.into()))
    }

    /// Returns the key paired with `type_id`.
    pub fn lookup_by_type(&self, type_id: TypeId) -> Result<&str, RegistryError> {
        self.map
            .get_by_right(&type_id)
            .map(String::as_str)
            .ok_or(RegistryError::TypeNotFound(type_id))
    }

    /// Removes the pair owning `key`, returning its type.
    pub fn remove_by_key(&mut self, key: &str) -> Result<TypeId, RegistryError> {
        self.map
            .remove_by_left(key)
            .ok_or_else(|| RegistryError::KeyNotFound(key.into()))
    }

    /// Like [`remove_by_key`](Self::remove_by_key), returning `default`
    /// when nothing is removed.
    pub fn remove_by_key_or(&mut self, key: &str, default: TypeId) -> TypeId {
        self.map.remove_by_left(key).unwrap_or(default)
    }

    /// Removes the pair owning `type_id`, returning its key.
    pub fn remove_by_type(&mut self, type_id: TypeId) -> Result<String, RegistryError> {
        self.map
            .remove_by_right(&type_id)
            .ok_or(RegistryError::TypeNotFound(type_id))
    }

    /// Like [`remove_by_type`](Self::remove_by_type), returning `default`
    /// when nothing is removed.
    pub fn remove_by_type_or(&mut self, type_id: TypeId, default: String) -> String {
        self.map.remove_by_right(&type_id).unwrap_or(default)
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_left(key)
    }

    #[inline]
    pub fn contains_type(&self, type_id: TypeId) -> bool {
        self.map.contains_right(&type_id)
    }

    /// An iterator visiting all keys in arbitrary order.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &str> {
        self.map.lefts().map(String::as_str)
    }

    /// An iterator visiting all types in arbitrary order.
    pub fn types(&self) -> impl ExactSizeIterator<Item = TypeId> + '_ {
        self.map.rights().copied()
    }

    /// An iterator visiting all `(key, type)` pairs in arbitrary order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, TypeId)> {
        self.map.iter().map(|(key, type_id)| (key.as_str(), *type_id))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::TypeKeyMap;
    use crate::RegistryError;
    use alloc::string::String;
    use core::any::TypeId;

    #[test]
    fn lookup_both_ways() {
        let mut keys = TypeKeyMap::new();
        assert_eq!(keys.insert("a", TypeId::of::<u8>()), Ok(false));
        assert_eq!(keys.insert("b", TypeId::of::<u16>()), Ok(false));

        assert_eq!(keys.lookup_by_key("a"), Ok(TypeId::of::<u8>()));
        assert_eq!(keys.lookup_by_type(TypeId::of::<u16>()), Ok("b"));
        assert_eq!(keys.len(), 2);
        assert_eq!(keys.types().len(), keys.keys().len());
    }

    #[test]
    fn missing_entries() {
        let mut keys = TypeKeyMap::new();
        assert_eq!(
            keys.lookup_by_key("nope"),
            Err(RegistryError::KeyNotFound("nope".into()))
        );
        assert_eq!(
            keys.lookup_by_type(TypeId::of::<u8>()),
            Err(RegistryError::TypeNotFound(TypeId::of::<u8>()))
        );
        assert_eq!(keys.remove_by_key_or("nope", TypeId::of::<()>()), TypeId::of::<()>());
        assert_eq!(
            keys.remove_by_type_or(TypeId::of::<u8>(), String::from("none")),
            "none"
        );
    }

    #[test]
    fn empty_key_is_rejected() {
        let mut keys = TypeKeyMap::new();
        assert_eq!(keys.insert("", TypeId::of::<u8>()), Err(RegistryError::InvalidKey));
        assert!(keys.is_empty());
    }

    #[test]
    fn key_collision_evicts_the_old_type() {
        let mut keys = TypeKeyMap::new();
        keys.insert("k", TypeId::of::<u8>()).unwrap();
        assert_eq!(keys.insert("k", TypeId::of::<u16>()), Ok(true));

        assert!(!keys.contains_type(TypeId::of::<u8>()));
        assert_eq!(keys.lookup_by_key("k"), Ok(TypeId::of::<u16>()));
        assert_eq!(keys.len(), 1);
    }

    #[test]
    fn remove_clears_both_directions() {
        let mut keys = TypeKeyMap::new();
        keys.insert("k", TypeId::of::<u8>()).unwrap();

        assert_eq!(keys.remove_by_type(TypeId::of::<u8>()), Ok(String::from("k")));
        assert!(!keys.contains_key("k"));

        keys.insert("k", TypeId::of::<u8>()).unwrap();
        assert_eq!(keys.remove_by_key("k"), Ok(TypeId::of::<u8>()));
        assert!(!keys.contains_type(TypeId::of::<u8>()));
    }
}
