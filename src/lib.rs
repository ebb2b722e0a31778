#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use cj_json as json;
pub use cj_utils as utils;

pub use cj_json::{ConverterOptions, JsonConvert, TypeConverter, Value};

#[cfg(feature = "auto_register")]
pub use cj_json::register_json_type;
