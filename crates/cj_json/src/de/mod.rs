//! Text input: the serde visitor building [`Value`](crate::Value)s.

mod driver;

pub(crate) use driver::DecodeDriver;
