//! Field access capability.
//!
//! A [`FieldAccessor`] is resolved once from a class table and then reads
//! or writes one field slot of any instance of that class.

use alloc::string::String;
use core::cell::Ref;

use thiserror::Error;

use crate::info::{ClassId, ClassInfo, FieldInfo};
use crate::object::{Object, Value};

// -----------------------------------------------------------------------------
// AccessError

/// An error returned by field access.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AccessError {
    #[error("field `{field}` not found in `{class}`")]
    MissingField { class: ClassId, field: String },
    #[error("field index {index} out of range for `{class}`")]
    IndexOutOfRange { class: ClassId, index: usize },
    #[error("expected an instance of `{expected}`, found `{found}`")]
    WrongClass { expected: ClassId, found: ClassId },
    #[error("`{class}` declares {expected} fields, {found} values were given")]
    FieldCount {
        class: ClassId,
        expected: usize,
        found: usize,
    },
    #[error("fields of `{class}` are already borrowed")]
    Busy { class: ClassId },
}

// -----------------------------------------------------------------------------
// FieldAccessor

/// Reads and writes one field of instances of one class.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use oc_reflect::access::FieldAccessor;
/// use oc_reflect::info::{ClassInfo, FieldInfo, FieldType};
/// use oc_reflect::object::{Object, Value};
///
/// let class = Arc::new(ClassInfo::new("demo::Counter", [
///     FieldInfo::new("hits", FieldType::LONG),
/// ]));
/// let hits = FieldAccessor::of(&class, "hits").unwrap();
/// assert!(FieldAccessor::of(&class, "misses").is_err());
///
/// let counter = Object::new(class);
/// hits.set(&counter, Value::Long(3)).unwrap();
/// assert_eq!(*hits.get(&counter).unwrap(), Value::Long(3));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldAccessor {
    class: ClassId,
    index: usize,
    name: &'static str,
}

impl FieldAccessor {
    /// Creates an accessor for `field` of `class`.
    #[inline]
    pub fn new(class: &ClassInfo, field: &FieldInfo) -> Self {
        Self {
            class: class.id(),
            index: field.index(),
            name: field.name(),
        }
    }

    /// Resolves the field called `name` of `class`.
    pub fn of(class: &ClassInfo, name: &str) -> Result<Self, AccessError> {
        match class.field(name) {
            Some(field) => Ok(Self::new(class, field)),
            None => Err(AccessError::MissingField {
                class: class.id(),
                field: String::from(name),
            }),
        }
    }

    #[inline]
    pub const fn class(&self) -> ClassId {
        self.class
    }

    #[inline]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    fn check(&self, object: &Object) -> Result<(), AccessError> {
        if object.class_id() != self.class {
            return Err(AccessError::WrongClass {
                expected: self.class,
                found: object.class_id(),
            });
        }
        Ok(())
    }

    /// Borrows the field's value.
    pub fn get<'a>(&self, object: &'a Object) -> Result<Ref<'a, Value>, AccessError> {
        self.check(object)?;
        let slots = object.slots().try_borrow().map_err(|_| AccessError::Busy {
            class: self.class,
        })?;
        if self.index >= slots.len() {
            return Err(AccessError::IndexOutOfRange {
                class: self.class,
                index: self.index,
            });
        }
        Ok(Ref::map(slots, |slots| &slots[self.index]))
    }

    /// Replaces the field's value, returning the previous one.
    pub fn set(&self, object: &Object, value: Value) -> Result<Value, AccessError> {
        self.check(object)?;
        let mut slots = object
            .slots()
            .try_borrow_mut()
            .map_err(|_| AccessError::Busy { class: self.class })?;
        match slots.get_mut(self.index) {
            Some(slot) => Ok(core::mem::replace(slot, value)),
            None => Err(AccessError::IndexOutOfRange {
                class: self.class,
                index: self.index,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;

    use super::{AccessError, FieldAccessor};
    use crate::info::{ClassId, ClassInfo, FieldInfo, FieldType};
    use crate::object::{Object, Value};

    #[test]
    fn wrong_class_is_rejected() {
        let a = Arc::new(ClassInfo::new("t::A", [FieldInfo::new("v", FieldType::INT)]));
        let b = Arc::new(ClassInfo::new("t::B", [FieldInfo::new("v", FieldType::INT)]));
        let accessor = FieldAccessor::of(&a, "v").unwrap();

        let err = accessor.set(&Object::new(b), Value::Int(1)).unwrap_err();
        assert_eq!(
            err,
            AccessError::WrongClass {
                expected: ClassId::new("t::A"),
                found: ClassId::new("t::B"),
            }
        );
    }

    #[test]
    fn set_returns_previous() {
        let class = Arc::new(ClassInfo::new("t::A", [FieldInfo::new("v", FieldType::STR)]));
        let object = Object::new(class.clone());
        let accessor = FieldAccessor::of(&class, "v").unwrap();

        assert_eq!(accessor.set(&object, "one".into()).unwrap(), Value::Null);
        assert_eq!(accessor.set(&object, "two".into()).unwrap(), Value::from("one"));
    }

    #[test]
    fn busy_while_borrowed() {
        let class = Arc::new(ClassInfo::new("t::A", [FieldInfo::new("v", FieldType::INT)]));
        let object = Object::new(class.clone());
        let accessor = FieldAccessor::of(&class, "v").unwrap();

        let guard = accessor.get(&object).unwrap();
        assert!(matches!(
            accessor.set(&object, Value::Int(2)),
            Err(AccessError::Busy { .. })
        ));
        drop(guard);
        assert!(accessor.set(&object, Value::Int(2)).is_ok());
    }
}
