use alloc::borrow::Cow;
use alloc::string::{String, ToString};
use core::any::TypeId;
use core::fmt::Display;

use thiserror::Error;

use crate::Value;

// -----------------------------------------------------------------------------
// ConvertError

/// A failure reported by a conversion callback or a hook.
///
/// [`JsonConvert`](crate::JsonConvert) implementations return it when the
/// data they are given does not describe a valid value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ConvertError {
    message: Cow<'static, str>,
}

impl ConvertError {
    /// Creates an error carrying `message`.
    pub fn new(message: impl Display) -> Self {
        Self {
            message: Cow::Owned(message.to_string()),
        }
    }

    /// The data lacks the field `name`.
    pub fn missing_field(name: &str) -> Self {
        Self::new(format_args!("missing field `{name}`"))
    }

    /// The data holds a `found` where a `expected` was required.
    pub fn invalid_type(expected: &str, found: &Value) -> Self {
        Self::new(format_args!(
            "invalid type: expected {expected}, found {}",
            found.kind()
        ))
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<serde_json::Error> for ConvertError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err)
    }
}

impl From<erased_serde::Error> for ConvertError {
    fn from(err: erased_serde::Error) -> Self {
        Self::new(err)
    }
}

// -----------------------------------------------------------------------------
// ConfigError

/// Errors raised while building [`ConverterOptions`](crate::ConverterOptions)
/// from a string-keyed option map.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("unknown option `{0}`")]
    UnknownOption(String),

    #[error("option `{name}` expects {expected}")]
    InvalidValue { name: String, expected: &'static str },
}

// -----------------------------------------------------------------------------
// RegistryError

/// Errors raised by the key ↔ type registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistryError {
    #[error("registry keys must be non-empty strings")]
    InvalidKey,

    #[error("no registration found for key `{0}`")]
    KeyNotFound(String),

    #[error("no registration found for type {0:?}")]
    TypeNotFound(TypeId),
}

// -----------------------------------------------------------------------------
// EncodeError

/// Errors raised while encoding a [`Value`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EncodeError {
    #[error("value of type `{type_name}` is not JSON serializable")]
    Unserializable { type_name: &'static str },

    #[error("failed to convert `{key}` into JSON: {source}")]
    Conversion { key: String, source: ConvertError },

    #[error("custom values nested deeper than {0} levels")]
    RecursionLimit(usize),

    #[error("failed to write encoded JSON: {0}")]
    Io(#[from] std::io::Error),
}

// -----------------------------------------------------------------------------
// DecodeError

/// Errors raised while decoding JSON text.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("unknown type key `{0}` in envelope")]
    UnknownType(String),

    #[error("failed to reconstruct `{key}` from JSON: {source}")]
    Conversion { key: String, source: ConvertError },

    #[error("decode hook rejected the value: {0}")]
    Hook(#[source] ConvertError),

    #[error("decoded {found} where a `{expected}` was expected")]
    Mismatch {
        expected: &'static str,
        found: String,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("failed to read JSON input: {0}")]
    Io(#[from] std::io::Error),
}

// -----------------------------------------------------------------------------
// Tests
