use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt;

use serde_core::Serialize;
use serde_core::de::DeserializeOwned;

use crate::{ConvertError, Custom, JsonConvert, Value};

// -----------------------------------------------------------------------------
// Codec

#[derive(Clone, Copy)]
enum Codec {
    Native {
        to_json: fn(value: &dyn Any) -> Result<Value, ConvertError>,
        from_json: fn(data: Value) -> Result<Custom, ConvertError>,
    },
    Serde {
        serialize: fn(value: &dyn Any) -> Option<&dyn erased_serde::Serialize>,
        deserialize: fn(
            deserializer: &mut dyn erased_serde::Deserializer,
        ) -> Result<Box<dyn Any + Send + Sync>, erased_serde::Error>,
    },
}

// -----------------------------------------------------------------------------
// TypeEntry

/// The conversion capability of one registered type.
///
/// Internally stores function pointers specialised for a concrete type.
/// When given a value of that type (as `&dyn Any`) it downcasts and runs the
/// type's own conversion.
///
/// There are two flavours:
///
/// - [`TypeEntry::of`] uses the [`JsonConvert`] impl of the type. Its JSON
///   representation may contain nested custom values.
/// - [`TypeEntry::of_serde`] uses the type's serde impls through
///   `erased-serde`. The representation is plain JSON; data holding custom
///   values cannot be deserialized by it.
///
/// # Examples
///
/// ```
/// use cj_json::registry::TypeEntry;
/// use cj_json::Value;
///
/// #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
/// struct Tag {
///     name: String,
/// }
///
/// let entry = TypeEntry::of_serde::<Tag>();
///
/// let data = entry.to_json(&Tag { name: "a".into() }).unwrap();
/// assert_eq!(data.get("name"), Some(&Value::from("a")));
///
/// let custom = entry.from_json(data).unwrap();
/// assert_eq!(custom.take::<Tag>().unwrap(), Tag { name: "a".into() });
/// ```
#[derive(Clone, Copy)]
pub struct TypeEntry {
    type_id: TypeId,
    type_name: &'static str,
    codec: Codec,
}

impl TypeEntry {
    /// Builds the entry of a [`JsonConvert`] type.
    pub fn of<T: JsonConvert>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: core::any::type_name::<T>(),
            codec: Codec::Native {
                to_json: |value| match value.downcast_ref::<T>() {
                    Some(value) => value.to_json(),
                    None => Err(mismatch::<T>()),
                },
                from_json: |data| T::from_json(data).map(Custom::new),
            },
        }
    }

    /// Builds the entry of a type with serde impls.
    pub fn of_serde<T>() -> Self
    where
        T: Serialize + DeserializeOwned + Any + Send + Sync,
    {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: core::any::type_name::<T>(),
            codec: Codec::Serde {
                serialize: |value| {
                    value
                        .downcast_ref::<T>()
                        .map(|value| value as &dyn erased_serde::Serialize)
                },
                deserialize: |deserializer| Ok(Box::new(T::deserialize(deserializer)?)),
            },
        }
    }

    /// The [`TypeId`] of the registered type.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The Rust type name of the registered type.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the entry goes through serde.
    #[inline]
    pub fn is_serde(&self) -> bool {
        matches!(self.codec, Codec::Serde { .. })
    }

    /// Converts `value` into its JSON representation.
    ///
    /// Fails if `value` is not of the registered type.
    pub fn to_json(&self, value: &dyn Any) -> Result<Value, ConvertError> {
        match self.codec {
            Codec::Native { to_json, .. } => to_json(value),
            Codec::Serde { serialize, .. } => {
                let value = serialize(value).ok_or_else(|| self.mismatch())?;
                Ok(Value::from(serde_json::to_value(value)?))
            }
        }
    }

    /// Rebuilds a value of the registered type from `data`.
    pub fn from_json(&self, data: Value) -> Result<Custom, ConvertError> {
        match self.codec {
            Codec::Native { from_json, .. } => from_json(data),
            Codec::Serde { deserialize, .. } => {
                let json = data.into_json().map_err(|custom| {
                    ConvertError::new(format_args!(
                        "`{}` cannot be rebuilt by serde from data holding a `{}`",
                        self.type_name,
                        custom.type_name(),
                    ))
                })?;
                let mut erased = <dyn erased_serde::Deserializer>::erase(json);
                let value = deserialize(&mut erased)?;
                Ok(Custom::from_boxed(value, self.type_name))
            }
        }
    }

    fn mismatch(&self) -> ConvertError {
        ConvertError::new(format_args!("value is not a `{}`", self.type_name))
    }
}

fn mismatch<T>() -> ConvertError {
    ConvertError::new(format_args!(
        "value is not a `{}`",
        core::any::type_name::<T>()
    ))
}

impl fmt::Debug for TypeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeEntry")
            .field("type_name", &self.type_name)
            .field("serde", &self.is_serde())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::TypeEntry;
    use crate::{ConvertError, JsonConvert, Value};

    #[derive(Debug, PartialEq)]
    struct Meters(f64);

    impl JsonConvert for Meters {
        fn to_json(&self) -> Result<Value, ConvertError> {
            Ok(Value::from(self.0))
        }

        fn from_json(data: Value) -> Result<Self, ConvertError> {
            data.as_f64()
                .map(Meters)
                .ok_or_else(|| ConvertError::invalid_type("a number", &data))
        }
    }

    #[test]
    fn native_entry_round_trip() {
        let entry = TypeEntry::of::<Meters>();
        assert!(!entry.is_serde());

        let data = entry.to_json(&Meters(2.5)).unwrap();
        assert_eq!(data, Value::from(2.5));

        let custom = entry.from_json(data).unwrap();
        assert_eq!(custom.downcast_ref::<Meters>(), Some(&Meters(2.5)));
    }

    #[test]
    fn wrong_value_type_is_an_error() {
        let entry = TypeEntry::of::<Meters>();
        let err = entry.to_json(&7_u8).unwrap_err();
        assert!(err.message().contains("Meters"));

        let err = entry.from_json(Value::from("far")).unwrap_err();
        assert_eq!(err.message(), "invalid type: expected a number, found string");
    }

    #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
    struct Pair(u8, u8);

    #[test]
    fn serde_entry_rejects_custom_data() {
        let entry = TypeEntry::of_serde::<Pair>();
        assert!(entry.is_serde());

        let data = entry.to_json(&Pair(1, 2)).unwrap();
        assert_eq!(data, Value::from(vec![1, 2]));

        let err = entry
            .from_json(Value::from(vec![Value::from(1), Value::custom(Meters(1.0))]))
            .unwrap_err();
        assert!(err.message().contains("Meters"));
    }
}
