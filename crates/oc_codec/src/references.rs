//! Object identity tracking for a single write, read or copy pass.
//!
//! Objects are numbered in the order they are first met. The marker that
//! precedes a reference-typed value is a varint:
//!
//! | marker  | meaning                                  |
//! |---------|------------------------------------------|
//! | `0`     | null                                     |
//! | `1`     | a new object follows                     |
//! | `n + 2` | the object already numbered `n`          |

use alloc::vec::Vec;

use oc_reflect::object::{ObjectRef, Value};
use oc_utils::hash::HashMap;

use crate::DecodeError;

pub(crate) const NULL: u32 = 0;
pub(crate) const NEW: u32 = 1;
pub(crate) const FIRST_ID: u32 = 2;

// -----------------------------------------------------------------------------
// WriteReferences

/// Write side: assigns ids to objects on first sight.
#[derive(Default)]
pub(crate) struct WriteReferences {
    // Handles are kept so that an address can not be reused mid-pass.
    seen: HashMap<ObjectRef, u32>,
}

impl WriteReferences {
    /// Returns the marker to write for `object`, numbering it if new.
    pub(crate) fn marker(&mut self, object: &ObjectRef) -> u32 {
        if let Some(id) = self.seen.get(object) {
            return id + FIRST_ID;
        }
        let id = self.seen.len() as u32;
        self.seen.insert(object.clone(), id);
        NEW
    }
}

// -----------------------------------------------------------------------------
// ReadReferences

/// Read side: reserves an id on each new-object marker and binds it to the
/// instance the serializer creates.
#[derive(Default)]
pub(crate) struct ReadReferences {
    objects: Vec<Option<ObjectRef>>,
    pending: Vec<usize>,
}

impl ReadReferences {
    /// Reserves the next id for an object about to be read.
    pub(crate) fn reserve(&mut self) {
        self.pending.push(self.objects.len());
        self.objects.push(None);
    }

    /// Binds the innermost reserved id, unless it is already bound.
    pub(crate) fn bind(&mut self, object: &ObjectRef) {
        if let Some(&id) = self.pending.last()
            && self.objects[id].is_none()
        {
            self.objects[id] = Some(object.clone());
        }
    }

    /// Closes the innermost reservation.
    ///
    /// Returns `true` if the serializer never bound it and `value` was
    /// bound instead.
    pub(crate) fn finish(&mut self, value: &Value) -> bool {
        let Some(id) = self.pending.pop() else {
            return false;
        };
        match (&self.objects[id], value) {
            (None, Value::Object(object)) => {
                self.objects[id] = Some(object.clone());
                true
            }
            _ => false,
        }
    }

    /// Drops the innermost reservation after a failed read.
    #[inline]
    pub(crate) fn abandon(&mut self) {
        self.pending.pop();
    }

    /// Resolves a back-reference marker.
    pub(crate) fn get(&self, marker: u32) -> Result<ObjectRef, DecodeError> {
        let id = marker - FIRST_ID;
        match self.objects.get(id as usize) {
            Some(Some(object)) => Ok(object.clone()),
            _ => Err(DecodeError::UnknownReference(id)),
        }
    }
}

// -----------------------------------------------------------------------------
// CopyReferences

/// Copy side: maps originals to their copies.
#[derive(Default)]
pub(crate) struct CopyReferences {
    copies: HashMap<ObjectRef, ObjectRef>,
}

impl CopyReferences {
    #[inline]
    pub(crate) fn get(&self, original: &ObjectRef) -> Option<&ObjectRef> {
        self.copies.get(original)
    }

    /// Records `copy` for `original`, returning `false` if one was recorded.
    pub(crate) fn insert(&mut self, original: &ObjectRef, copy: &ObjectRef) -> bool {
        if self.copies.contains_key(original) {
            return false;
        }
        self.copies.insert(original.clone(), copy.clone());
        true
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;

    use oc_reflect::info::ClassInfo;
    use oc_reflect::object::{Object, ObjectRef, Value};

    use super::{NEW, ReadReferences, WriteReferences};
    use crate::DecodeError;

    fn object() -> ObjectRef {
        ObjectRef::new(Object::new(Arc::new(ClassInfo::new("t::Empty", []))))
    }

    #[test]
    fn write_numbers_in_first_sight_order() {
        let (a, b) = (object(), object());
        let mut refs = WriteReferences::default();
        assert_eq!(refs.marker(&a), NEW);
        assert_eq!(refs.marker(&b), NEW);
        assert_eq!(refs.marker(&b), 3);
        assert_eq!(refs.marker(&a), 2);
    }

    #[test]
    fn nested_reservations_bind_innermost() {
        let (outer, inner) = (object(), object());
        let mut refs = ReadReferences::default();

        refs.reserve();
        refs.bind(&outer);
        refs.reserve();
        // inner serializer never binds itself
        assert!(refs.finish(&Value::Object(inner.clone())));
        assert!(!refs.finish(&Value::Object(outer.clone())));

        assert!(refs.get(2).unwrap().ptr_eq(&outer));
        assert!(refs.get(3).unwrap().ptr_eq(&inner));
        assert_eq!(refs.get(4).unwrap_err(), DecodeError::UnknownReference(2));
    }
}
