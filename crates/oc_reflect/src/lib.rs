//! Runtime type model for the object-graph codec.
//!
//! Classes are described once, at registration time, by a [`ClassInfo`]
//! table: an ordered list of [`FieldInfo`]s with declared [`FieldType`]s,
//! optional type parameters and custom per-field attributes.
//! Instances are dynamic [`Object`]s shared through [`ObjectRef`] handles,
//! so graphs may contain shared references and cycles.
//!
//! ## Menu
//!
//! - [`info`]: [`Type`], [`ClassId`], [`FieldType`], [`ConcreteType`], [`Generics`],
//!   [`FieldInfo`], [`ClassInfo`], [`CustomAttributes`].
//! - [`object`]: [`Value`], [`Object`], [`ObjectRef`] and [`graph_eq`].
//! - [`access`]: [`FieldAccessor`], the get/set capability used by serializers.
//! - [`registry`]: [`ClassRegistry`], the path-indexed store of class tables.
//!
//! [`Type`]: info::Type
//! [`ClassId`]: info::ClassId
//! [`FieldType`]: info::FieldType
//! [`ConcreteType`]: info::ConcreteType
//! [`Generics`]: info::Generics
//! [`FieldInfo`]: info::FieldInfo
//! [`ClassInfo`]: info::ClassInfo
//! [`CustomAttributes`]: info::CustomAttributes
//! [`Value`]: object::Value
//! [`Object`]: object::Object
//! [`ObjectRef`]: object::ObjectRef
//! [`graph_eq`]: object::graph_eq
//! [`FieldAccessor`]: access::FieldAccessor
//! [`ClassRegistry`]: registry::ClassRegistry
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

pub mod access;
pub mod info;
pub mod object;
pub mod registry;
