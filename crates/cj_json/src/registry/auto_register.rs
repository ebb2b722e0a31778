use alloc::borrow::Cow;
use core::any::Any;

use serde_core::Serialize;
use serde_core::de::DeserializeOwned;

use super::TypeEntry;
use crate::JsonConvert;

// -----------------------------------------------------------------------------
// AutoRegistration

#[derive(Clone, Copy)]
enum KeySource {
    Fixed(&'static str),
    Derived(fn() -> Cow<'static, str>),
}

/// A statically submitted registration, collected by
/// [`RegistryBuilder::auto_register`](super::RegistryBuilder::auto_register).
///
/// Not constructed by hand; use [`register_json_type!`](crate::register_json_type).
pub struct AutoRegistration {
    key: KeySource,
    entry: fn() -> TypeEntry,
}

impl AutoRegistration {
    #[doc(hidden)]
    pub const fn new(key: fn() -> Cow<'static, str>, entry: fn() -> TypeEntry) -> Self {
        Self {
            key: KeySource::Derived(key),
            entry,
        }
    }

    #[doc(hidden)]
    pub const fn with_key(key: &'static str, entry: fn() -> TypeEntry) -> Self {
        Self {
            key: KeySource::Fixed(key),
            entry,
        }
    }

    #[doc(hidden)]
    pub fn native_key<T: JsonConvert>() -> Cow<'static, str> {
        T::type_key()
    }

    #[doc(hidden)]
    pub fn serde_key<T>() -> Cow<'static, str>
    where
        T: Serialize + DeserializeOwned + Any + Send + Sync,
    {
        Cow::Borrowed(core::any::type_name::<T>())
    }

    /// The key the type is registered under.
    pub fn key(&self) -> Cow<'static, str> {
        match self.key {
            KeySource::Fixed(key) => Cow::Borrowed(key),
            KeySource::Derived(key) => key(),
        }
    }

    /// The entry of the submitted type.
    #[inline]
    pub fn entry(&self) -> TypeEntry {
        (self.entry)()
    }
}

inventory::collect!(AutoRegistration);

// -----------------------------------------------------------------------------
// register_json_type

/// Submits a type for [`auto_register`](crate::registry::RegistryBuilder::auto_register).
///
/// - `register_json_type!(Ty)` registers a [`JsonConvert`](crate::JsonConvert)
///   type under its `type_key()`.
/// - `register_json_type!(Ty, "key")` registers it under an explicit key.
/// - `register_json_type!(@serde Ty)` and `register_json_type!(@serde Ty, "key")`
///   do the same through the type's serde impls.
///
/// # Examples
///
/// ```
/// use cj_json::{register_json_type, TypeConverter};
///
/// #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
/// struct Version(u32, u32);
///
/// register_json_type!(@serde Version, "demo.Version");
///
/// fn main() {
///     let mut converter = TypeConverter::new();
///     converter.auto_register().unwrap();
///     converter.freeze();
///
///     let text = converter.encode(&cj_json::Value::custom(Version(1, 4))).unwrap();
///     assert_eq!(text, r#"{"__type__":"demo.Version","__data__":[1,4]}"#);
/// }
/// ```
#[macro_export]
macro_rules! register_json_type {
    (@serde $ty:ty) => {
        $crate::__macro_exports::inventory::submit! {
            $crate::registry::AutoRegistration::new(
                $crate::registry::AutoRegistration::serde_key::<$ty>,
                $crate::registry::TypeEntry::of_serde::<$ty>,
            )
        }
    };
    (@serde $ty:ty, $key:expr) => {
        $crate::__macro_exports::inventory::submit! {
            $crate::registry::AutoRegistration::with_key(
                $key,
                $crate::registry::TypeEntry::of_serde::<$ty>,
            )
        }
    };
    ($ty:ty) => {
        $crate::__macro_exports::inventory::submit! {
            $crate::registry::AutoRegistration::new(
                $crate::registry::AutoRegistration::native_key::<$ty>,
                $crate::registry::TypeEntry::of::<$ty>,
            )
        }
    };
    ($ty:ty, $key:expr) => {
        $crate::__macro_exports::inventory::submit! {
            $crate::registry::AutoRegistration::with_key(
                $key,
                $crate::registry::TypeEntry::of::<$ty>,
            )
        }
    };
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::registry::RegistryBuilder;
    use crate::{ConvertError, JsonConvert, Value};

    #[derive(Debug, PartialEq)]
    struct Beacon;

    impl JsonConvert for Beacon {
        fn to_json(&self) -> Result<Value, ConvertError> {
            Ok(Value::Null)
        }
        fn from_json(_: Value) -> Result<Self, ConvertError> {
            Ok(Beacon)
        }
    }

    #[derive(serde::Serialize, serde::Deserialize)]
    struct Ping(u8);

    crate::register_json_type!(Beacon);
    crate::register_json_type!(@serde Ping, "tests.Ping");

    mod paths {
        pub mod serde {
            use crate::{ConvertError, JsonConvert, Value};

            pub struct Lantern;

            impl JsonConvert for Lantern {
                fn to_json(&self) -> Result<Value, ConvertError> {
                    Ok(Value::Null)
                }
                fn from_json(_: Value) -> Result<Self, ConvertError> {
                    Ok(Lantern)
                }
            }
        }

        crate::register_json_type!(serde::Lantern);
    }

    #[test]
    fn submitted_types_are_collected() {
        let mut builder = RegistryBuilder::new();
        assert!(builder.auto_register().unwrap() >= 2);

        assert!(builder.contains_type::<Beacon>());
        assert!(builder.get_by_key("tests.Ping").is_some());
        assert!(builder.get_by_key(&Beacon::type_key()).is_some());
    }

    #[test]
    fn path_through_a_serde_module_is_a_native_type() {
        let mut builder = RegistryBuilder::new();
        builder.auto_register().unwrap();

        let (_, entry) = builder
            .get(core::any::TypeId::of::<paths::serde::Lantern>())
            .unwrap();
        assert!(!entry.is_serde());
    }
}
