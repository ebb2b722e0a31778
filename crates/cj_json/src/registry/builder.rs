use alloc::string::String;
use core::any::{Any, TypeId};

use cj_utils::TypeIdMap;
use serde_core::Serialize;
use serde_core::de::DeserializeOwned;

use super::{FrozenRegistry, TypeEntry, TypeKeyMap};
use crate::{JsonConvert, RegistryError};

/// A mutable collection of type registrations.
///
/// Registration order does not matter except on collisions: a later
/// registration with the same key or the same type replaces the earlier one.
/// Call [`build`](Self::build) once everything is registered to obtain an
/// immutable [`FrozenRegistry`].
///
/// # Examples
///
/// ```
/// use cj_json::registry::RegistryBuilder;
///
/// #[derive(serde::Serialize, serde::Deserialize)]
/// struct Celsius(f64);
///
/// let mut builder = RegistryBuilder::new();
/// builder.register_serde_as::<Celsius>("temp.Celsius").unwrap();
///
/// let registry = builder.build();
/// assert!(registry.contains_type::<Celsius>());
/// assert!(registry.get_by_key("temp.Celsius").is_some());
/// ```
#[derive(Clone, Default, Debug)]
pub struct RegistryBuilder {
    keys: TypeKeyMap,
    entries: TypeIdMap<TypeEntry>,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    #[inline]
    pub const fn new() -> Self {
        Self {
            keys: TypeKeyMap::new(),
            entries: TypeIdMap::new(),
        }
    }

    /// Registers `T` under [`JsonConvert::type_key`].
    pub fn register<T: JsonConvert>(&mut self) -> Result<TypeId, RegistryError> {
        self.register_entry(T::type_key(), TypeEntry::of::<T>())
    }

    /// Registers `T` under an explicit key.
    pub fn register_as<T: JsonConvert>(
        &mut self,
        key: impl Into<String>,
    ) -> Result<TypeId, RegistryError> {
        self.register_entry(key, TypeEntry::of::<T>())
    }

    /// Registers `T` through its serde impls, keyed by its Rust type name.
    pub fn register_serde<T>(&mut self) -> Result<TypeId, RegistryError>
    where
        T: Serialize + DeserializeOwned + Any + Send + Sync,
    {
        self.register_entry(core::any::type_name::<T>(), TypeEntry::of_serde::<T>())
    }

    /// Registers `T` through its serde impls under an explicit key.
    pub fn register_serde_as<T>(
        &mut self,
        key: impl Into<String>,
    ) -> Result<TypeId, RegistryError>
    where
        T: Serialize + DeserializeOwned + Any + Send + Sync,
    {
        self.register_entry(key, TypeEntry::of_serde::<T>())
    }

    /// Registers a prepared entry under `key`.
    ///
    /// If `key` already names another type, that type is unregistered.
    /// If the entry's type already owns another key, that key is released.
    pub fn register_entry(
        &mut self,
        key: impl Into<String>,
        entry: TypeEntry,
    ) -> Result<TypeId, RegistryError> {
        let key: String = key.into();
        let type_id = entry.type_id();

        let stale = self
            .keys
            .lookup_by_key(&key)
            .ok()
            .filter(|&old| old != type_id);

        log::trace!("registering `{}` as `{key}`", entry.type_name());
        if self.keys.insert(key, type_id)? {
            log::debug!(
                "registration of `{}` replaced an earlier registration",
                entry.type_name()
            );
        }

        if let Some(stale) = stale {
            self.entries.remove(stale);
        }
        self.entries.insert(type_id, entry);
        Ok(type_id)
    }

    /// Registers every type submitted with
    /// [`register_json_type!`](crate::register_json_type).
    ///
    /// Returns the number of registrations applied.
    #[cfg(feature = "auto_register")]
    pub fn auto_register(&mut self) -> Result<usize, RegistryError> {
        let mut count = 0;
        for registration in inventory::iter::<super::AutoRegistration> {
            let entry = registration.entry();
            self.register_entry(registration.key(), entry)?;
            count += 1;
        }
        log::debug!("auto registered {count} types");
        Ok(count)
    }

    /// Returns the entry registered under `key`.
    pub fn get_by_key(&self, key: &str) -> Option<&TypeEntry> {
        let type_id = self.keys.lookup_by_key(key).ok()?;
        self.entries.get(type_id)
    }

    /// Returns the key and entry of a registered type.
    pub fn get(&self, type_id: TypeId) -> Option<(&str, &TypeEntry)> {
        let key = self.keys.lookup_by_type(type_id).ok()?;
        Some((key, self.entries.get(type_id)?))
    }

    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.entries.contains(type_id)
    }

    #[inline]
    pub fn contains_type<T: Any>(&self) -> bool {
        self.entries.contains_type::<T>()
    }

    /// The key ↔ type pairs registered so far.
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

    /// Freezes the registrations.
    pub fn build(self) -> FrozenRegistry {
        FrozenRegistry::new(self.keys, self.entries)
    }
}

// -----------------------------------------------------------------------------
// Tests
