//! Class descriptor tables and the declared-type model.
//!
//! - [`Type`] / [`ClassId`]: concrete runtime types.
//! - [`FieldType`] / [`ConcreteType`]: declared field types and their
//!   substitution results.
//! - [`Generics`]: type parameters of a class.
//! - [`FieldInfo`] / [`ClassInfo`]: the tables serializers are built from.
//! - [`CustomAttributes`]: declarative metadata attached to fields and classes.

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod class_info;
mod field_info;
mod field_type;
mod generics;
mod type_path;

// -----------------------------------------------------------------------------
// Internal API

pub(crate) use attributes::impl_custom_attributes_fn;

// -----------------------------------------------------------------------------
// Exports

pub use attributes::CustomAttributes;
pub use class_info::ClassInfo;
pub use field_info::FieldInfo;
pub use field_type::{ConcreteType, FieldType};
pub use generics::{Generics, TypeParamInfo};
pub use type_path::{ClassId, Type};
