#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod convert;
mod converter;
mod de;
mod error;
mod value;

pub mod options;
pub mod registry;
pub mod ser;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports;

pub use convert::JsonConvert;
pub use converter::TypeConverter;
pub use error::{ConfigError, ConvertError, DecodeError, EncodeError, RegistryError};
pub use options::{ConverterOptions, EncoderOptions};
pub use options::{DefaultHook, FloatHook, IntHook, ObjectHook};
pub use value::{Custom, Map, Value};
