use oc_reflect::object::{ObjectRef, Value};

use crate::references::CopyReferences;
use crate::serializer::Serializer;
use crate::{Codec, CodecError};

// -----------------------------------------------------------------------------
// CopyContext

/// State of one copy pass.
///
/// Each original object is copied at most once; later encounters resolve to
/// the same copy, so shared references and cycles are preserved.
pub struct CopyContext<'a> {
    codec: &'a Codec,
    references: CopyReferences,
}

impl<'a> CopyContext<'a> {
    pub(crate) fn new(codec: &'a Codec) -> Self {
        Self {
            codec,
            references: CopyReferences::default(),
        }
    }

    /// Returns the codec driving this pass.
    #[inline]
    pub fn codec(&self) -> &'a Codec {
        self.codec
    }

    /// Records `copy` as the copy of `original`.
    ///
    /// Serializers of class types call this right after creating the copy
    /// and before copying any field.
    #[inline]
    pub fn reference(&mut self, original: &ObjectRef, copy: &ObjectRef) {
        self.references.insert(original, copy);
    }

    /// Copies `value` with the serializer registered for its type.
    ///
    /// Null and plain values are cloned.
    pub fn copy(&mut self, value: &Value) -> Result<Value, CodecError> {
        let Value::Object(object) = value else {
            return Ok(value.clone());
        };
        if let Some(copy) = self.references.get(object) {
            return Ok(Value::Object(copy.clone()));
        }
        let serializer = self.codec.serializer(object.ty())?;
        self.copy_new(object, value, serializer)
    }

    /// Copies `value` with `serializer`.
    pub fn copy_with(
        &mut self,
        value: &Value,
        serializer: &dyn Serializer,
    ) -> Result<Value, CodecError> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Object(object) => match self.references.get(object) {
                Some(copy) => Ok(Value::Object(copy.clone())),
                None => self.copy_new(object, value, serializer),
            },
            other => serializer.copy(self, other),
        }
    }

    fn copy_new(
        &mut self,
        object: &ObjectRef,
        value: &Value,
        serializer: &dyn Serializer,
    ) -> Result<Value, CodecError> {
        let copy = serializer.copy(self, value)?;
        if let Value::Object(copy) = &copy {
            self.references.insert(object, copy);
        }
        Ok(copy)
    }
}
