use alloc::borrow::ToOwned;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use cj_utils::hash::FixedHashState;
use indexmap::IndexMap;
use serde_json::Number;

// -----------------------------------------------------------------------------
// Map

/// An insertion-ordered JSON object.
pub type Map = IndexMap<String, Value, FixedHashState>;

// -----------------------------------------------------------------------------
// Custom

/// A native Rust value travelling inside a [`Value`] tree.
///
/// When encoding, a `Custom` is turned into an envelope if its type is
/// registered, otherwise it is handed to the converter's default hook.
/// When decoding, every envelope is replaced by the `Custom` that its
/// registered type reconstructs.
///
/// # Examples
///
/// ```
/// use cj_json::Custom;
///
/// #[derive(Debug, PartialEq)]
/// struct Celsius(f64);
///
/// let custom = Custom::new(Celsius(21.5));
/// assert!(custom.is::<Celsius>());
/// assert_eq!(custom.downcast_ref::<Celsius>(), Some(&Celsius(21.5)));
/// assert_eq!(custom.take::<Celsius>().ok(), Some(Celsius(21.5)));
/// ```
pub struct Custom {
    value: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Custom {
    /// Wraps `value`.
    #[inline]
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: core::any::type_name::<T>(),
        }
    }

    #[inline]
    pub(crate) fn from_boxed(value: Box<dyn Any + Send + Sync>, type_name: &'static str) -> Self {
        Self { value, type_name }
    }

    /// The [`TypeId`] of the wrapped value.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        (*self.value).type_id()
    }

    /// The Rust type name of the wrapped value, for diagnostics.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the wrapped value is a `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// The wrapped value as `&dyn Any`.
    #[inline]
    pub fn as_any(&self) -> &dyn Any {
        &*self.value
    }

    /// Returns a reference to the wrapped value if it is a `T`.
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Unwraps the value if it is a `T`, otherwise gives `self` back.
    pub fn take<T: Any>(self) -> Result<T, Self> {
        let type_name = self.type_name;
        match self.value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => Err(Self { value, type_name }),
        }
    }
}

impl fmt::Debug for Custom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Custom").field(&self.type_name).finish()
    }
}

// -----------------------------------------------------------------------------
// Value

/// A JSON document that may also hold native values.
///
/// The plain variants mirror [`serde_json::Value`]; [`Value::Custom`] carries
/// application types that the [`TypeConverter`](crate::TypeConverter) tags
/// with an envelope on the wire.
///
/// Plain values compare structurally. Two custom values never compare equal,
/// downcast them to compare the native values.
#[derive(Debug, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(Map),
    Custom(Custom),
}

impl Value {
    /// Wraps a native value.
    #[inline]
    pub fn custom<T: Any + Send + Sync>(value: T) -> Self {
        Self::Custom(Custom::new(value))
    }

    /// A short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Custom(_) => "custom value",
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    pub fn is_custom(&self) -> bool {
        matches!(self, Value::Custom(_))
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    #[inline]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    pub fn as_custom(&self) -> Option<&Custom> {
        match self {
            Value::Custom(custom) => Some(custom),
            _ => None,
        }
    }

    /// Looks up `key` if this is an object.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object()?.get(key)
    }

    /// Returns the native value if this is a custom `T`.
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_custom()?.downcast_ref::<T>()
    }

    /// Unwraps a custom `T`, otherwise gives `self` back.
    pub fn take<T: Any>(self) -> Result<T, Self> {
        match self {
            Value::Custom(custom) => custom.take::<T>().map_err(Value::Custom),
            other => Err(other),
        }
    }

    /// Converts a plain value into a [`serde_json::Value`].
    ///
    /// Fails with the first [`Custom`] found, in document order.
    pub fn into_json(self) -> Result<serde_json::Value, Custom> {
        Ok(match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Number(n) => serde_json::Value::Number(n),
            Value::String(s) => serde_json::Value::String(s),
            Value::Array(items) => serde_json::Value::Array(
                items
                    .into_iter()
                    .map(Value::into_json)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(map) => {
                let mut object = serde_json::Map::with_capacity(map.len());
                for (key, value) in map {
                    object.insert(key, value.into_json()?);
                }
                serde_json::Value::Object(object)
            }
            Value::Custom(custom) => return Err(custom),
        })
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

// -----------------------------------------------------------------------------
// Conversions

impl From<bool> for Value {
    #[inline]
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(n: $ty) -> Self {
                    Value::Number(Number::from(n))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f64> for Value {
    /// Non-finite floats have no JSON form and become [`Value::Null`].
    fn from(f: f64) -> Self {
        Number::from_f64(f).map_or(Value::Null, Value::Number)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::from(f as f64)
    }
}

impl From<Number> for Value {
    #[inline]
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<String> for Value {
    #[inline]
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<Map> for Value {
    #[inline]
    fn from(map: Map) -> Self {
        Value::Object(map)
    }
}

impl From<Custom> for Value {
    #[inline]
    fn from(custom: Custom) -> Self {
        Value::Custom(custom)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(object) => Value::Object(
                object
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Value::Object(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

// -----------------------------------------------------------------------------
// Tests
