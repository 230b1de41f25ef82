//! The class registry.

// -----------------------------------------------------------------------------
// Modules

mod class_registry;

// -----------------------------------------------------------------------------
// Exports

pub use class_registry::{ClassRegistry, RegistryError};
