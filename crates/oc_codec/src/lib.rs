//! Field-based binary codec for object graphs.
//!
//! A [`Codec`] maps every registered [`Type`](oc_reflect::info::Type) to a
//! numeric id and a [`Serializer`](serializer::Serializer). Classes are served
//! by a [`FieldSerializer`](serializer::field::FieldSerializer), which writes
//! the fields of an instance in declaration order without names or ids.
//!
//! Graphs may share objects and contain cycles: every object is written
//! once and later occurrences become back-references. The same identity
//! tracking makes [`Codec::copy`] preserve the shape of the graph.
//!
//! ## Menu
//!
//! - [`Codec`]: type registry, configuration and pass entry points.
//! - [`io`]: the byte-level [`Output`](io::Output) and [`Input`](io::Input).
//! - [`serializer`]: the [`Serializer`](serializer::Serializer) trait, built-in
//!   value serializers and the field serializer.
//! - [`generics`]: type-variable scopes of generic classes.
//! - [`WriteContext`], [`ReadContext`], [`CopyContext`]: per-pass state
//!   handed to serializers.
//! - [`CodecError`]: errors, classified by [`ErrorKind`].
//!
//! # Examples
//!
//! ```
//! use oc_codec::Codec;
//! use oc_reflect::info::{ClassInfo, FieldInfo, FieldType};
//! use oc_reflect::object::{Value, graph_eq};
//!
//! let mut codec = Codec::new();
//! let node = codec
//!     .register_class(ClassInfo::new("demo::Node", [
//!         FieldInfo::new("name", FieldType::STR),
//!         FieldInfo::new("next", FieldType::class("demo::Node")),
//!     ]))
//!     .unwrap();
//!
//! let a = codec.new_instance(node).unwrap();
//! a.set("name", "a").unwrap();
//! let a = Value::from(a);
//! a.as_object().unwrap().set("next", a.clone()).unwrap();
//!
//! let back = codec.read(&codec.write(&a).unwrap()).unwrap();
//! assert!(graph_eq(&a, &back));
//!
//! let back = back.as_object().unwrap();
//! assert_eq!(back.get("next").unwrap(), Value::Object(back.clone()));
//! # a.as_object().unwrap().set("next", Value::Null).unwrap();
//! # back.set("next", Value::Null).unwrap();
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod codec;
mod context;
mod error;
mod pass;
mod references;

pub mod generics;
pub mod io;
pub mod serializer;

// -----------------------------------------------------------------------------
// Top-level exports

pub use codec::{Codec, Registration};
pub use context::Context;
pub use error::{CodecError, ConfigError, DecodeError, EncodeError, ErrorKind};
pub use pass::{CopyContext, ReadContext, WriteContext};
