use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use core::any::{Any, TypeId, type_name};
use core::cell::Cell;
use core::fmt;
use std::io;

use serde_core::Serialize;
use serde_core::de::{DeserializeOwned, DeserializeSeed};

use crate::de::DecodeDriver;
use crate::registry::{FrozenRegistry, RegistryBuilder, TypeEntry};
use crate::ser::IterEncode;
use crate::{ConverterOptions, Custom, DecodeError, EncodeError, JsonConvert, Map, RegistryError, Value};

// -----------------------------------------------------------------------------
// RegistryState

#[derive(Clone)]
enum RegistryState {
    Open(RegistryBuilder),
    Frozen(Arc<FrozenRegistry>),
}

// -----------------------------------------------------------------------------
// TypeConverter

/// Encodes and decodes JSON, tagging registered native types with an
/// envelope.
///
/// A registered value is written as `{type_key: key, data_key: data}`, where
/// `key` is the string it was registered under and `data` its JSON
/// representation. Decoding recognises exactly such two-entry objects and
/// rebuilds the native value.
///
/// # Lifecycle
///
/// A converter starts *open*: types can be registered, and decoding already
/// recognises them. [`freeze`](Self::freeze) fixes the set of types
/// eligible for encoding; before that, every custom value goes to the
/// default hook. Registrations after freezing are ignored with a warning.
///
/// A frozen converter is immutable and can be shared between threads.
///
/// # Examples
///
/// ```
/// use cj_json::{ConvertError, JsonConvert, TypeConverter, Value};
///
/// #[derive(Debug, PartialEq)]
/// struct Point {
///     x: i64,
///     y: i64,
/// }
///
/// impl JsonConvert for Point {
///     fn to_json(&self) -> Result<Value, ConvertError> {
///         Ok(Value::from_iter([("x", Value::from(self.x)), ("y", Value::from(self.y))]))
///     }
///
///     fn from_json(data: Value) -> Result<Self, ConvertError> {
///         let field = |name| {
///             data.get(name)
///                 .and_then(Value::as_i64)
///                 .ok_or_else(|| ConvertError::missing_field(name))
///         };
///         Ok(Point { x: field("x")?, y: field("y")? })
///     }
/// }
///
/// let mut converter = TypeConverter::new();
/// converter.register_as::<Point>("pkg.Point").unwrap();
/// converter.freeze();
///
/// let text = converter.encode(&Value::custom(Point { x: 1, y: 2 })).unwrap();
/// assert_eq!(text, r#"{"__type__":"pkg.Point","__data__":{"x":1,"y":2}}"#);
///
/// let point: Point = converter.decode_as(&text).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
#[derive(Clone)]
pub struct TypeConverter {
    options: ConverterOptions,
    state: RegistryState,
}

impl TypeConverter {
    /// An open converter with default options.
    pub fn new() -> Self {
        Self::with_options(ConverterOptions::new())
    }

    /// An open converter.
    pub fn with_options(options: ConverterOptions) -> Self {
        Self::create(options, RegistryState::Open(RegistryBuilder::new()))
    }

    /// A frozen converter over prepared registrations.
    pub fn from_registry(options: ConverterOptions, registry: impl Into<Arc<FrozenRegistry>>) -> Self {
        Self::create(options, RegistryState::Frozen(registry.into()))
    }

    fn create(options: ConverterOptions, state: RegistryState) -> Self {
        if options.type_key == options.data_key {
            log::warn!(
                "type key and data key are both `{}`, no object will decode as an envelope",
                options.type_key
            );
        }
        Self { options, state }
    }

    #[inline]
    pub fn options(&self) -> &ConverterOptions {
        &self.options
    }

    // -------------------------------------------------------------------------
    // Registration

    fn builder(&mut self, what: &str) -> Option<&mut RegistryBuilder> {
        match &mut self.state {
            RegistryState::Open(builder) => Some(builder),
            RegistryState::Frozen(_) => {
                log::warn!("converter is frozen, ignored registration of {what}");
                None
            }
        }
    }

    /// Registers `T` under [`JsonConvert::type_key`].
    ///
    /// Ignored once frozen.
    pub fn register<T: JsonConvert>(&mut self) -> Result<TypeId, RegistryError> {
        match self.builder(type_name::<T>()) {
            Some(builder) => builder.register::<T>(),
            None => Ok(TypeId::of::<T>()),
        }
    }

    /// Registers `T` under an explicit key.
    ///
    /// Ignored once frozen.
    pub fn register_as<T: JsonConvert>(&mut self, key: impl Into<String>) -> Result<TypeId, RegistryError> {
        match self.builder(type_name::<T>()) {
            Some(builder) => builder.register_as::<T>(key),
            None => Ok(TypeId::of::<T>()),
        }
    }

    /// Registers `T` through its serde impls, keyed by its Rust type name.
    ///
    /// Ignored once frozen.
    pub fn register_serde<T>(&mut self) -> Result<TypeId, RegistryError>
    where
        T: Serialize + DeserializeOwned + Any + Send + Sync,
    {
        match self.builder(type_name::<T>()) {
            Some(builder) => builder.register_serde::<T>(),
            None => Ok(TypeId::of::<T>()),
        }
    }

    /// Registers `T` through its serde impls under an explicit key.
    ///
    /// Ignored once frozen.
    pub fn register_serde_as<T>(&mut self, key: impl Into<String>) -> Result<TypeId, RegistryError>
    where
        T: Serialize + DeserializeOwned + Any + Send + Sync,
    {
        match self.builder(type_name::<T>()) {
            Some(builder) => builder.register_serde_as::<T>(key),
            None => Ok(TypeId::of::<T>()),
        }
    }

    /// Registers a prepared entry under `key`.
    ///
    /// Ignored once frozen.
    pub fn register_entry(&mut self, key: impl Into<String>, entry: TypeEntry) -> Result<TypeId, RegistryError> {
        match self.builder(entry.type_name()) {
            Some(builder) => builder.register_entry(key, entry),
            None => Ok(entry.type_id()),
        }
    }

    /// Registers every type submitted with
    /// [`register_json_type!`](crate::register_json_type).
    ///
    /// Returns the number of registrations applied, `0` once frozen.
    #[cfg(feature = "auto_register")]
    pub fn auto_register(&mut self) -> Result<usize, RegistryError> {
        match self.builder("auto registered types") {
            Some(builder) => builder.auto_register(),
            None => Ok(0),
        }
    }

    // -------------------------------------------------------------------------
    // Lifecycle

    /// Fixes the set of types eligible for encoding.
    ///
    /// Calling it again has no effect.
    pub fn freeze(&mut self) {
        if let RegistryState::Open(builder) = &mut self.state {
            let registry = core::mem::take(builder).build();
            log::debug!("converter frozen with {} registered types", registry.len());
            self.state = RegistryState::Frozen(Arc::new(registry));
        }
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        matches!(self.state, RegistryState::Frozen(_))
    }

    /// The frozen registrations, `None` while open.
    pub fn registry(&self) -> Option<&FrozenRegistry> {
        match &self.state {
            RegistryState::Open(_) => None,
            RegistryState::Frozen(registry) => Some(registry.as_ref()),
        }
    }

    /// The types eligible for encoding.
    ///
    /// Empty until [`freeze`](Self::freeze) is called.
    pub fn types(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.registry().into_iter().flat_map(|registry| registry.types())
    }

    fn entry_by_key(&self, key: &str) -> Option<&TypeEntry> {
        match &self.state {
            RegistryState::Open(builder) => builder.get_by_key(key),
            RegistryState::Frozen(registry) => registry.get_by_key(key),
        }
    }

    // -------------------------------------------------------------------------
    // Envelopes

    /// Converts a custom value into its envelope.
    ///
    /// Values whose type is not frozen into the registry go to the default
    /// hook, which fails with [`EncodeError::Unserializable`] unless one is
    /// configured.
    pub fn encode_type(&self, value: &Custom) -> Result<Value, EncodeError> {
        let Some((key, entry)) = self.registry().and_then(|r| r.get(value.type_id())) else {
            return match &self.options.default {
                Some(hook) => hook(value),
                None => Err(EncodeError::Unserializable {
                    type_name: value.type_name(),
                }),
            };
        };

        let data = entry
            .to_json(value.as_any())
            .map_err(|source| EncodeError::Conversion {
                key: key.into(),
                source,
            })?;

        let mut envelope = Map::with_capacity_and_hasher(2, Default::default());
        envelope.insert(self.options.type_key.clone(), Value::String(key.into()));
        envelope.insert(self.options.data_key.clone(), data);
        Ok(Value::Object(envelope))
    }

    /// Rebuilds the native value of an envelope.
    ///
    /// An object is an envelope iff it has exactly two entries, the type key
    /// and the data key. Any other object is passed to the object hook, or
    /// returned unchanged without one. When both keys are equal, no object
    /// is an envelope.
    pub fn decode_type(&self, mut object: Map) -> Result<Value, DecodeError> {
        let type_key = self.options.type_key.as_str();
        let data_key = self.options.data_key.as_str();

        let is_envelope = type_key != data_key
            && object.len() == 2
            && object.contains_key(type_key)
            && object.contains_key(data_key);
        if !is_envelope {
            return match &self.options.object_hook {
                Some(hook) => hook(object).map_err(DecodeError::Hook),
                None => Ok(Value::Object(object)),
            };
        }

        let key = match object.swap_remove(type_key) {
            Some(Value::String(key)) => key,
            Some(other) => return Err(DecodeError::UnknownType(format!("<{}>", other.kind()))),
            None => return Err(DecodeError::UnknownType(String::new())),
        };
        let Some(entry) = self.entry_by_key(&key) else {
            return Err(DecodeError::UnknownType(key));
        };

        let data = object.swap_remove(data_key).unwrap_or_default();
        match entry.from_json(data) {
            Ok(custom) => Ok(Value::Custom(custom)),
            Err(source) => Err(DecodeError::Conversion { key, source }),
        }
    }

    // -------------------------------------------------------------------------
    // Text

    /// Encodes `value` into JSON text.
    pub fn encode(&self, value: &Value) -> Result<String, EncodeError> {
        self.iterencode(value).collect()
    }

    /// Encodes `value` lazily, one text fragment at a time.
    #[inline]
    pub fn iterencode<'a>(&'a self, value: &'a Value) -> IterEncode<'a> {
        IterEncode::new(self, value)
    }

    /// Decodes JSON text, rebuilding every envelope innermost first.
    pub fn decode(&self, text: &str) -> Result<Value, DecodeError> {
        let failure = Cell::new(None);
        let mut deserializer = serde_json::Deserializer::from_str(text);

        let value = DecodeDriver::new(self, &failure)
            .deserialize(&mut deserializer)
            .map_err(|err| failure.take().unwrap_or_else(|| DecodeError::Json(err)))?;
        deserializer.end()?;
        Ok(value)
    }

    /// Decodes JSON text holding a single envelope of type `T`.
    pub fn decode_as<T: Any>(&self, text: &str) -> Result<T, DecodeError> {
        self.decode(text)?
            .take::<T>()
            .map_err(|value| DecodeError::Mismatch {
                expected: type_name::<T>(),
                found: match value.as_custom() {
                    Some(custom) => format!("a `{}`", custom.type_name()),
                    None => format!("a plain {}", value.kind()),
                },
            })
    }

    /// Encodes `value` into `writer`, fragment by fragment.
    pub fn dump<W: io::Write>(&self, value: &Value, mut writer: W) -> Result<(), EncodeError> {
        for chunk in self.iterencode(value) {
            writer.write_all(chunk?.as_bytes())?;
        }
        Ok(())
    }

    /// Reads `reader` to the end and decodes its content.
    pub fn load<R: io::Read>(&self, mut reader: R) -> Result<Value, DecodeError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        self.decode(&text)
    }
}

impl Default for TypeConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("TypeConverter");
        debug.field("options", &self.options);
        match &self.state {
            RegistryState::Open(builder) => debug.field("open", builder),
            RegistryState::Frozen(registry) => debug.field("frozen", registry),
        };
        debug.finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::TypeConverter;
    use crate::registry::RegistryBuilder;
    use crate::{ConvertError, ConverterOptions, DecodeError, EncodeError, JsonConvert, Map, Value};
    use alloc::string::ToString;
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::any::TypeId;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Point {
        x: i64,
        y: i64,
    }

    impl JsonConvert for Point {
        fn to_json(&self) -> Result<Value, ConvertError> {
            Ok(Value::from_iter([
                ("x", Value::from(self.x)),
                ("y", Value::from(self.y)),
            ]))
        }

        fn from_json(data: Value) -> Result<Self, ConvertError> {
            let field = |name| {
                data.get(name)
                    .and_then(Value::as_i64)
                    .ok_or_else(|| ConvertError::missing_field(name))
            };
            Ok(Point {
                x: field("x")?,
                y: field("y")?,
            })
        }
    }

    #[derive(Debug, PartialEq)]
    struct Segment {
        from: Point,
        to: Point,
    }

    impl JsonConvert for Segment {
        fn to_json(&self) -> Result<Value, ConvertError> {
            Ok(Value::from_iter([
                ("from", Value::custom(self.from)),
                ("to", Value::custom(self.to)),
            ]))
        }

        fn from_json(data: Value) -> Result<Self, ConvertError> {
            let mut map = match data {
                Value::Object(map) => map,
                other => return Err(ConvertError::invalid_type("an object", &other)),
            };
            let mut point = |name| {
                map.swap_remove(name)
                    .and_then(|v| v.take::<Point>().ok())
                    .ok_or_else(|| ConvertError::missing_field(name))
            };
            Ok(Segment {
                from: point("from")?,
                to: point("to")?,
            })
        }
    }

    #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
    struct Rgb(u8, u8, u8);

    struct Opaque;

    fn converter() -> TypeConverter {
        let mut converter = TypeConverter::new();
        converter.register_as::<Point>("pkg.Point").unwrap();
        converter.register_as::<Segment>("pkg.Segment").unwrap();
        converter.register_serde_as::<Rgb>("pkg.Rgb").unwrap();
        converter.freeze();
        converter
    }

    #[test]
    fn encodes_a_registered_value() {
        let text = converter()
            .encode(&Value::custom(Point { x: 1, y: 2 }))
            .unwrap();
        assert_eq!(text, r#"{"__type__":"pkg.Point","__data__":{"x":1,"y":2}}"#);
    }

    #[test]
    fn nested_values_round_trip() {
        let converter = converter();
        let segment = Segment {
            from: Point { x: 0, y: 0 },
            to: Point { x: 3, y: -4 },
        };
        let value = Value::from(vec![Value::custom(segment), Value::custom(Rgb(1, 2, 3))]);

        let text = converter.encode(&value).unwrap();
        assert_eq!(
            text,
            concat!(
                r#"[{"__type__":"pkg.Segment","__data__":{"#,
                r#""from":{"__type__":"pkg.Point","__data__":{"x":0,"y":0}},"#,
                r#""to":{"__type__":"pkg.Point","__data__":{"x":3,"y":-4}}}},"#,
                r#"{"__type__":"pkg.Rgb","__data__":[1,2,3]}]"#,
            )
        );

        let Value::Array(mut items) = converter.decode(&text).unwrap() else {
            panic!("expected an array");
        };
        assert_eq!(items.pop().unwrap().take::<Rgb>().unwrap(), Rgb(1, 2, 3));
        assert_eq!(
            items.pop().unwrap().take::<Segment>().unwrap(),
            Segment {
                from: Point { x: 0, y: 0 },
                to: Point { x: 3, y: -4 },
            }
        );
    }

    #[test]
    fn plain_json_is_untouched() {
        let converter = converter();
        let text = r#"{"a":[1,2.5,"x",null,true],"b":{"__type__":"pkg.Point"}}"#;
        let value = converter.decode(text).unwrap();
        assert_eq!(converter.encode(&value).unwrap(), text);
    }

    #[test]
    fn only_two_entry_objects_are_envelopes() {
        let converter = converter();

        let value = converter
            .decode(r#"{"__type__":"pkg.Point","__data__":{"x":1,"y":2},"extra":0}"#)
            .unwrap();
        assert_eq!(value.as_object().map(Map::len), Some(3));

        let value = converter
            .decode(r#"{"__data__":{"x":1,"y":2},"__type__":"pkg.Point"}"#)
            .unwrap();
        assert_eq!(value.downcast_ref::<Point>(), Some(&Point { x: 1, y: 2 }));
    }

    #[test]
    fn equal_envelope_keys_decode_plain_objects() {
        let options = ConverterOptions::new().with_type_key("k").with_data_key("k");
        let converter = TypeConverter::with_options(options);

        let value = converter.decode(r#"{"k":"x","z":1}"#).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(object.get("k"), Some(&Value::from("x")));
        assert_eq!(object.get("z"), Some(&Value::from(1)));
    }

    #[test]
    fn unknown_type_key() {
        let converter = converter();

        let err = converter
            .decode(r#"{"__type__":"pkg.Missing","__data__":1}"#)
            .unwrap_err();
        assert!(matches!(err, DecodeError::UnknownType(key) if key == "pkg.Missing"));

        let err = converter.decode(r#"{"__type__":7,"__data__":1}"#).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownType(key) if key == "<number>"));
    }

    #[test]
    fn conversion_failure_names_the_key() {
        let err = converter()
            .decode(r#"{"__type__":"pkg.Point","__data__":{"x":1}}"#)
            .unwrap_err();
        match err {
            DecodeError::Conversion { key, source } => {
                assert_eq!(key, "pkg.Point");
                assert_eq!(source.message(), "missing field `y`");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unregistered_values_use_the_default_hook() {
        let err = converter().encode(&Value::custom(Opaque)).unwrap_err();
        assert!(matches!(err, EncodeError::Unserializable { type_name } if type_name.ends_with("Opaque")));

        let options = ConverterOptions::new().with_default(|custom| Ok(Value::from(custom.type_name())));
        let converter = TypeConverter::with_options(options);
        let text = converter.encode(&Value::custom(Opaque)).unwrap();
        assert!(text.ends_with("Opaque\""));
    }

    #[test]
    fn decoding_works_before_freeze_but_encoding_does_not() {
        let mut converter = TypeConverter::new();
        converter.register_as::<Point>("pkg.Point").unwrap();
        assert!(!converter.is_frozen());
        assert_eq!(converter.types().count(), 0);

        let value = converter
            .decode(r#"{"__type__":"pkg.Point","__data__":{"x":5,"y":6}}"#)
            .unwrap();
        assert_eq!(value.downcast_ref::<Point>(), Some(&Point { x: 5, y: 6 }));

        assert!(matches!(
            converter.encode(&value),
            Err(EncodeError::Unserializable { .. })
        ));
    }

    #[test]
    fn freeze_is_final() {
        let mut converter = converter();
        let before: Vec<TypeId> = converter.types().collect();

        assert_eq!(converter.register_as::<Opaque2>("late"), Ok(TypeId::of::<Opaque2>()));
        converter.freeze();

        assert_eq!(converter.types().count(), before.len());
        assert!(!converter.types().any(|id| id == TypeId::of::<Opaque2>()));
        assert!(converter.decode(r#"{"__type__":"late","__data__":null}"#).is_err());
    }

    struct Opaque2;

    impl JsonConvert for Opaque2 {
        fn to_json(&self) -> Result<Value, ConvertError> {
            Ok(Value::Null)
        }
        fn from_json(_: Value) -> Result<Self, ConvertError> {
            Ok(Opaque2)
        }
    }

    #[test]
    fn key_collision_unregisters_the_earlier_type() {
        let mut converter = TypeConverter::new();
        converter.register_as::<Point>("shared").unwrap();
        converter.register_as::<Opaque2>("shared").unwrap();
        converter.freeze();

        assert!(converter.encode(&Value::custom(Point { x: 0, y: 0 })).is_err());
        assert_eq!(
            converter.encode(&Value::custom(Opaque2)).unwrap(),
            r#"{"__type__":"shared","__data__":null}"#
        );
    }

    #[test]
    fn hooks() {
        let options = ConverterOptions::new()
            .with_object_hook(|map| Ok(Value::from(map.len())))
            .with_parse_float(|f| Ok(Value::from(f.to_string())))
            .with_parse_int(|n| Ok(Value::from(n.as_i64().unwrap_or_default() * 10)));
        let converter = TypeConverter::with_options(options);

        let value = converter.decode(r#"[{"a":1,"b":2},1.5,3]"#).unwrap();
        assert_eq!(
            value,
            Value::from(vec![Value::from(2), Value::from("1.5"), Value::from(30)])
        );

        let options = ConverterOptions::new().with_object_hook(|_| Err(ConvertError::new("no objects")));
        let err = TypeConverter::with_options(options).decode("{}").unwrap_err();
        assert!(matches!(err, DecodeError::Hook(source) if source.message() == "no objects"));
    }

    #[test]
    fn custom_envelope_keys() {
        let options = ConverterOptions::new().with_type_key("t").with_data_key("d");
        let mut converter = TypeConverter::with_options(options);
        converter.register_as::<Point>("P").unwrap();
        converter.freeze();

        let text = converter.encode(&Value::custom(Point { x: 1, y: 1 })).unwrap();
        assert_eq!(text, r#"{"t":"P","d":{"x":1,"y":1}}"#);
        assert_eq!(converter.decode_as::<Point>(&text).unwrap(), Point { x: 1, y: 1 });
    }

    #[test]
    fn layout_options() {
        let options = ConverterOptions::new()
            .with_separators(", ", " = ")
            .with_sort_keys(true)
            .with_ensure_ascii(true);
        let converter = TypeConverter::with_options(options);
        let value = Value::from_iter([("é", Value::from(vec![1, 2])), ("a", Value::Null)]);

        assert_eq!(
            converter.encode(&value).unwrap(),
            r#"{"a" = null, "\u00e9" = [1, 2]}"#
        );
    }

    #[test]
    fn dump_and_load() {
        let converter = converter();
        let value = Value::from_iter([("p", Value::custom(Point { x: 7, y: 8 }))]);

        let mut out = Vec::new();
        converter.dump(&value, &mut out).unwrap();
        assert_eq!(out, converter.encode(&value).unwrap().into_bytes());

        let loaded = converter.load(out.as_slice()).unwrap();
        assert_eq!(
            loaded.get("p").and_then(Value::downcast_ref::<Point>),
            Some(&Point { x: 7, y: 8 })
        );
    }

    #[test]
    fn decode_errors() {
        let converter = converter();
        assert!(matches!(converter.decode("[1,"), Err(DecodeError::Json(_))));
        assert!(matches!(converter.decode("1 2"), Err(DecodeError::Json(_))));
        assert!(matches!(
            converter.decode_as::<Point>("[]"),
            Err(DecodeError::Mismatch { found, .. }) if found == "a plain array"
        ));
    }

    #[test]
    fn frozen_converter_is_shared_between_threads() {
        let mut builder = RegistryBuilder::new();
        builder.register_as::<Point>("pkg.Point").unwrap();
        let converter = Arc::new(TypeConverter::from_registry(ConverterOptions::new(), builder.build()));
        assert!(converter.is_frozen());

        std::thread::scope(|scope| {
            for i in 0..4 {
                let converter = Arc::clone(&converter);
                scope.spawn(move || {
                    let text = converter.encode(&Value::custom(Point { x: i, y: i })).unwrap();
                    let point: Point = converter.decode_as(&text).unwrap();
                    assert_eq!(point, Point { x: i, y: i });
                });
            }
        });
    }

    #[test]
    fn last_duplicate_key_wins() {
        let value = TypeConverter::new().decode(r#"{"a":1,"a":2}"#).unwrap();
        assert_eq!(value.get("a"), Some(&Value::from(2)));
        assert_eq!(value.as_object().map(Map::len), Some(1));
    }
}
