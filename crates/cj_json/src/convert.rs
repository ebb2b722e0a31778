use alloc::borrow::Cow;
use core::any::Any;

use crate::{ConvertError, Value};

/// Conversion between a native type and its JSON representation.
///
/// Registering a type with a [`TypeConverter`](crate::TypeConverter) or a
/// [`RegistryBuilder`](crate::registry::RegistryBuilder) requires this trait,
/// unless the type goes through the serde path
/// ([`register_serde`](crate::registry::RegistryBuilder::register_serde)).
///
/// `from_json(to_json(v))` must reconstruct a value equal to `v`, otherwise
/// round trips through the converter are lossy.
///
/// The representation returned by `to_json` may itself hold
/// [`Value::Custom`]s; they are tagged recursively when encoding. Likewise,
/// `from_json` receives data whose nested envelopes have already been
/// reconstructed.
///
/// # Examples
///
/// ```
/// use cj_json::{ConvertError, JsonConvert, Value};
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
/// let data = Point { x: 1, y: 2 }.to_json().unwrap();
/// assert_eq!(Point::from_json(data).unwrap(), Point { x: 1, y: 2 });
/// assert!(Point::type_key().ends_with("Point"));
/// ```
pub trait JsonConvert: Any + Send + Sync + Sized {
    /// The key written in the envelope when no explicit key is registered.
    ///
    /// Defaults to the fully-qualified Rust path of the type, so equally
    /// named types from different modules get different keys. The path is
    /// not guaranteed stable across compiler versions; override this when
    /// the encoded data must outlive the binary.
    fn type_key() -> Cow<'static, str> {
        Cow::Borrowed(core::any::type_name::<Self>())
    }

    /// Produces the JSON representation of `self`.
    fn to_json(&self) -> Result<Value, ConvertError>;

    /// Rebuilds a value from its JSON representation.
    fn from_json(data: Value) -> Result<Self, ConvertError>;
}
