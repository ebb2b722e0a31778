//! Key ↔ type registrations.
//!
//! - [`TypeKeyMap`]: the one-to-one mapping between keys and types.
//! - [`TypeEntry`]: the conversion capability of one type.
//! - [`RegistryBuilder`]: the mutable registration phase.
//! - [`FrozenRegistry`]: the immutable result shared by encoding and decoding.

// -----------------------------------------------------------------------------
// Modules

mod builder;
mod entry;
mod frozen;
mod type_keys;

#[cfg(feature = "auto_register")]
mod auto_register;

// -----------------------------------------------------------------------------
// Exports

pub use builder::RegistryBuilder;
pub use entry::TypeEntry;
pub use frozen::FrozenRegistry;
pub use type_keys::TypeKeyMap;

#[cfg(feature = "auto_register")]
pub use auto_register::AutoRegistration;
