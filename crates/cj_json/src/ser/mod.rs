//! Text output: the layout formatter and the lazy fragment iterator.

// -----------------------------------------------------------------------------
// Modules

mod formatter;
mod iter;

// -----------------------------------------------------------------------------
// Exports

pub use formatter::JsonFormatter;
pub use iter::IterEncode;
