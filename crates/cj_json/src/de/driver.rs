use alloc::borrow::ToOwned;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::Cell;
use core::fmt;

use serde_core::Deserializer;
use serde_core::de::{DeserializeSeed, Error, MapAccess, SeqAccess, Visitor};
use serde_json::Number;

use crate::{DecodeError, Map, TypeConverter, Value};

// -----------------------------------------------------------------------------
// DecodeDriver

/// Builds a [`Value`] from any self-describing deserializer.
///
/// Number literals go through the converter's `parse_int`/`parse_float`
/// hooks. Every completed object is handed to
/// [`TypeConverter::decode_type`], innermost first, so a nested envelope is
/// already reconstructed when its parent is examined.
///
/// Serde errors can only carry a message; the structured [`DecodeError`]
/// behind a failure is parked in `failure` for the caller to pick up.
#[derive(Clone, Copy)]
pub(crate) struct DecodeDriver<'a> {
    converter: &'a TypeConverter,
    failure: &'a Cell<Option<DecodeError>>,
}

impl<'a> DecodeDriver<'a> {
    pub(crate) fn new(converter: &'a TypeConverter, failure: &'a Cell<Option<DecodeError>>) -> Self {
        Self { converter, failure }
    }

    fn settle<E: Error>(self, result: Result<Value, DecodeError>) -> Result<Value, E> {
        result.map_err(|err| {
            let message = E::custom(&err);
            self.failure.set(Some(err));
            message
        })
    }

    fn integer<E: Error>(self, n: Number) -> Result<Value, E> {
        match &self.converter.options().parse_int {
            Some(hook) => self.settle(hook(n).map_err(DecodeError::Hook)),
            None => Ok(Value::Number(n)),
        }
    }
}

impl<'de> DeserializeSeed<'de> for DecodeDriver<'_> {
    type Value = Value;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for DecodeDriver<'_> {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any JSON value")
    }

    #[inline]
    fn visit_bool<E: Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    #[inline]
    fn visit_i64<E: Error>(self, v: i64) -> Result<Value, E> {
        self.integer(Number::from(v))
    }

    #[inline]
    fn visit_u64<E: Error>(self, v: u64) -> Result<Value, E> {
        self.integer(Number::from(v))
    }

    fn visit_f64<E: Error>(self, v: f64) -> Result<Value, E> {
        match &self.converter.options().parse_float {
            Some(hook) => self.settle(hook(v).map_err(DecodeError::Hook)),
            None => Ok(Number::from_f64(v).map_or(Value::Null, Value::Number)),
        }
    }

    #[inline]
    fn visit_str<E: Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_owned()))
    }

    #[inline]
    fn visit_string<E: Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    #[inline]
    fn visit_unit<E: Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    #[inline]
    fn visit_none<E: Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or_default());
        while let Some(item) = seq.next_element_seed(self)? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let mut object = Map::default();
        // a repeated key keeps its first position and its last value
        while let Some(key) = map.next_key::<String>()? {
            let value = map.next_value_seed(self)?;
            object.insert(key, value);
        }
        self.settle(self.converter.decode_type(object))
    }
}

// -----------------------------------------------------------------------------
// Tests
