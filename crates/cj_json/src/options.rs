use alloc::string::String;
use alloc::sync::Arc;
use core::fmt;

use serde_json::Number;

use crate::{ConfigError, ConvertError, Custom, EncodeError, Map, Value};

// -----------------------------------------------------------------------------
// Hooks

/// Called for custom values whose type is not registered.
///
/// The returned value is encoded in place of the custom value.
pub type DefaultHook = Arc<dyn Fn(&Custom) -> Result<Value, EncodeError> + Send + Sync>;

/// Called for every decoded object that is not an envelope.
pub type ObjectHook = Arc<dyn Fn(Map) -> Result<Value, ConvertError> + Send + Sync>;

/// Called for every decoded integer literal.
pub type IntHook = Arc<dyn Fn(Number) -> Result<Value, ConvertError> + Send + Sync>;

/// Called for every decoded floating point literal.
///
/// The literal is parsed into the nearest `f64` before the hook sees it, so
/// digits beyond `f64` precision are already lost.
pub type FloatHook = Arc<dyn Fn(f64) -> Result<Value, ConvertError> + Send + Sync>;

// -----------------------------------------------------------------------------
// EncoderOptions

/// Text layout settings used when encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncoderOptions {
    /// Escape every non-ASCII character as `\uXXXX`.
    pub ensure_ascii: bool,
    /// Write object entries sorted by key.
    pub sort_keys: bool,
    /// Pretty print with this many spaces per level.
    pub indent: Option<usize>,
    /// `(item, key)` separators, overriding the defaults.
    pub separators: Option<(String, String)>,
}

impl EncoderOptions {
    /// The separator written between items.
    ///
    /// `","` by default.
    pub fn item_separator(&self) -> &str {
        match &self.separators {
            Some((item, _)) => item,
            None => ",",
        }
    }

    /// The separator written between a key and its value.
    ///
    /// `":"` by default, `": "` when indenting.
    pub fn key_separator(&self) -> &str {
        match (&self.separators, self.indent) {
            (Some((_, key)), _) => key,
            (None, Some(_)) => ": ",
            (None, None) => ":",
        }
    }
}

// -----------------------------------------------------------------------------
// ConverterOptions

/// Configuration of a [`TypeConverter`](crate::TypeConverter).
///
/// # Examples
///
/// ```
/// use cj_json::ConverterOptions;
///
/// let options = ConverterOptions::new()
///     .with_type_key("$type")
///     .with_data_key("$value")
///     .with_sort_keys(true);
///
/// assert_eq!(options.type_key(), "$type");
/// assert!(options.encoder().sort_keys);
/// ```
#[derive(Clone)]
pub struct ConverterOptions {
    pub(crate) type_key: String,
    pub(crate) data_key: String,
    pub(crate) encoder: EncoderOptions,
    pub(crate) default: Option<DefaultHook>,
    pub(crate) object_hook: Option<ObjectHook>,
    pub(crate) parse_int: Option<IntHook>,
    pub(crate) parse_float: Option<FloatHook>,
}

impl ConverterOptions {
    pub const DEFAULT_TYPE_KEY: &'static str = "__type__";
    pub const DEFAULT_DATA_KEY: &'static str = "__data__";

    /// Options with the `"__type__"`/`"__data__"` envelope and compact output.
    pub fn new() -> Self {
        Self {
            type_key: String::from(Self::DEFAULT_TYPE_KEY),
            data_key: String::from(Self::DEFAULT_DATA_KEY),
            encoder: EncoderOptions::default(),
            default: None,
            object_hook: None,
            parse_int: None,
            parse_float: None,
        }
    }

    /// Builds options from a string-keyed map, as found in configuration
    /// files.
    ///
    /// Recognised names are `type_key`, `data_key`, `ensure_ascii`,
    /// `sort_keys`, `indent` and `separators`. Any other name is rejected.
    ///
    /// A few more names are accepted and ignored because the behaviour they
    /// select is fixed:
    ///
    /// - `json_key` (a string): convertible types are those implementing
    ///   [`JsonConvert`](crate::JsonConvert).
    /// - `strict` (only `true`): control characters inside strings are
    ///   always rejected.
    /// - `skipkeys`, `check_circular` and `allow_nan` (booleans): keys are
    ///   always strings, values cannot form cycles, and numbers are always
    ///   finite.
    ///
    /// ```
    /// use cj_json::{ConfigError, ConverterOptions};
    ///
    /// let map = serde_json::json!({ "type_key": "kind", "indent": 2 });
    /// let options = ConverterOptions::from_map(map.as_object().unwrap()).unwrap();
    /// assert_eq!(options.type_key(), "kind");
    /// assert_eq!(options.encoder().indent, Some(2));
    ///
    /// let map = serde_json::json!({ "colour": true });
    /// assert_eq!(
    ///     ConverterOptions::from_map(map.as_object().unwrap()).unwrap_err(),
    ///     ConfigError::UnknownOption("colour".into()),
    /// );
    /// ```
    pub fn from_map(map: &serde_json::Map<String, serde_json::Value>) -> Result<Self, ConfigError> {
        use serde_json::Value as Json;

        fn invalid(name: &str, expected: &'static str) -> ConfigError {
            ConfigError::InvalidValue {
                name: name.into(),
                expected,
            }
        }

        let mut options = Self::new();
        for (name, value) in map {
            match (name.as_str(), value) {
                ("type_key", Json::String(key)) => options.type_key.clone_from(key),
                ("data_key", Json::String(key)) => options.data_key.clone_from(key),
                ("type_key" | "data_key", _) => return Err(invalid(name, "a string")),
                ("ensure_ascii", Json::Bool(flag)) => options.encoder.ensure_ascii = *flag,
                ("sort_keys", Json::Bool(flag)) => options.encoder.sort_keys = *flag,
                ("ensure_ascii" | "sort_keys", _) => return Err(invalid(name, "a boolean")),
                ("indent", Json::Null) => options.encoder.indent = None,
                ("indent", Json::Number(n)) => {
                    let width = n
                        .as_u64()
                        .and_then(|n| usize::try_from(n).ok())
                        .ok_or_else(|| invalid(name, "a non-negative integer or null"))?;
                    options.encoder.indent = Some(width);
                }
                ("indent", _) => return Err(invalid(name, "a non-negative integer or null")),
                ("separators", Json::Null) => options.encoder.separators = None,
                ("separators", Json::Array(pair)) => match pair.as_slice() {
                    [Json::String(item), Json::String(key)] => {
                        options.encoder.separators = Some((item.clone(), key.clone()));
                    }
                    _ => return Err(invalid(name, "a pair of strings")),
                },
                ("separators", _) => return Err(invalid(name, "a pair of strings")),
                ("json_key", Json::String(_)) => {
                    log::debug!("option `json_key` has no effect");
                }
                ("json_key", _) => return Err(invalid(name, "a string")),
                ("strict", Json::Bool(true)) => {}
                ("strict", _) => return Err(invalid(name, "`true`")),
                ("skipkeys" | "check_circular" | "allow_nan", Json::Bool(_)) => {
                    log::debug!("option `{name}` has no effect");
                }
                ("skipkeys" | "check_circular" | "allow_nan", _) => {
                    return Err(invalid(name, "a boolean"));
                }
                _ => return Err(ConfigError::UnknownOption(name.clone())),
            }
        }
        Ok(options)
    }

    /// Sets the envelope key holding the registered type key.
    pub fn with_type_key(mut self, key: impl Into<String>) -> Self {
        self.type_key = key.into();
        self
    }

    /// Sets the envelope key holding the JSON representation.
    pub fn with_data_key(mut self, key: impl Into<String>) -> Self {
        self.data_key = key.into();
        self
    }

    pub fn with_ensure_ascii(mut self, ensure_ascii: bool) -> Self {
        self.encoder.ensure_ascii = ensure_ascii;
        self
    }

    pub fn with_sort_keys(mut self, sort_keys: bool) -> Self {
        self.encoder.sort_keys = sort_keys;
        self
    }

    /// Pretty prints with `indent` spaces per nesting level.
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.encoder.indent = Some(indent);
        self
    }

    pub fn with_separators(mut self, item: impl Into<String>, key: impl Into<String>) -> Self {
        self.encoder.separators = Some((item.into(), key.into()));
        self
    }

    /// Sets the fallback for unregistered custom values.
    ///
    /// Without it, encoding such a value fails with
    /// [`EncodeError::Unserializable`].
    pub fn with_default<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Custom) -> Result<Value, EncodeError> + Send + Sync + 'static,
    {
        self.default = Some(Arc::new(hook));
        self
    }

    /// Sets the transform applied to decoded objects that are not envelopes.
    pub fn with_object_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(Map) -> Result<Value, ConvertError> + Send + Sync + 'static,
    {
        self.object_hook = Some(Arc::new(hook));
        self
    }

    pub fn with_parse_int<F>(mut self, hook: F) -> Self
    where
        F: Fn(Number) -> Result<Value, ConvertError> + Send + Sync + 'static,
    {
        self.parse_int = Some(Arc::new(hook));
        self
    }

    pub fn with_parse_float<F>(mut self, hook: F) -> Self
    where
        F: Fn(f64) -> Result<Value, ConvertError> + Send + Sync + 'static,
    {
        self.parse_float = Some(Arc::new(hook));
        self
    }

    #[inline]
    pub fn type_key(&self) -> &str {
        &self.type_key
    }

    #[inline]
    pub fn data_key(&self) -> &str {
        &self.data_key
    }

    #[inline]
    pub fn encoder(&self) -> &EncoderOptions {
        &self.encoder
    }
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConverterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterOptions")
            .field("type_key", &self.type_key)
            .field("data_key", &self.data_key)
            .field("encoder", &self.encoder)
            .field("default", &self.default.is_some())
            .field("object_hook", &self.object_hook.is_some())
            .field("parse_int", &self.parse_int.is_some())
            .field("parse_float", &self.parse_float.is_some())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
