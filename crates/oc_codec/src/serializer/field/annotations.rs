//! Per-field attributes understood by [`FieldSerializer`](super::FieldSerializer).
//!
//! Attach them to a [`FieldInfo`](oc_reflect::info::FieldInfo) with
//! `with_attribute`. They are read whenever the field table is rebuilt.
//!
//! # Examples
//!
//! ```
//! use oc_codec::serializer::field::{NotNull, Optional, Transient};
//! use oc_reflect::info::{FieldInfo, FieldType};
//!
//! let fields = [
//!     FieldInfo::new("name", FieldType::STR).with_attribute(NotNull),
//!     FieldInfo::new("secret", FieldType::STR).with_attribute(Optional("server")),
//!     FieldInfo::new("cache", FieldType::Dynamic).with_attribute(Transient),
//! ];
//! assert!(fields[0].has_attribute::<NotNull>());
//! ```

use alloc::boxed::Box;
use core::fmt;

use crate::serializer::Serializer;

/// The field takes part only if the codec's
/// [`Context`](crate::Context) contains this key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Optional(pub &'static str);

/// The field always uses the serializer made by this factory.
///
/// The value type must be known, from the declared type, the resolved
/// type arguments or [`CachedField::set_class`](super::CachedField::set_class).
#[derive(Clone, Copy)]
pub struct Bind(pub fn() -> Box<dyn Serializer>);

impl fmt::Debug for Bind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Bind")
    }
}

/// The field never holds null, so no null marker is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NotNull;

/// The field is skipped by write and read unless
/// [`serialize_transient`](super::FieldSerializerConfig::serialize_transient)
/// is set, and copied unless
/// [`copy_transient`](super::FieldSerializerConfig::copy_transient) is unset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transient;
