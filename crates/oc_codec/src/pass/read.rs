use oc_reflect::info::{ConcreteType, Type};
use oc_reflect::object::{ObjectRef, Value};

use crate::generics::{GenericsResolver, GenericsStack};
use crate::io::Input;
use crate::references::{self, ReadReferences};
use crate::serializer::Serializer;
use crate::{Codec, CodecError, DecodeError, Registration};

// -----------------------------------------------------------------------------
// ReadContext

/// State of one read pass.
pub struct ReadContext<'a, 'de> {
    codec: &'a Codec,
    input: &'a mut Input<'de>,
    references: ReadReferences,
    generics: GenericsResolver,
}

impl<'a, 'de> ReadContext<'a, 'de> {
    pub(crate) fn new(codec: &'a Codec, input: &'a mut Input<'de>) -> Self {
        Self {
            codec,
            input,
            references: ReadReferences::default(),
            generics: GenericsResolver::new(),
        }
    }

    /// Returns the codec driving this pass.
    #[inline]
    pub fn codec(&self) -> &'a Codec {
        self.codec
    }

    /// Returns the input, for reading primitives directly.
    #[inline]
    pub fn input(&mut self) -> &mut Input<'de> {
        self.input
    }

    /// Returns the number of bytes consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.input.position()
    }

    /// Registers the instance being read, so that back-references inside
    /// its own fields resolve to it.
    ///
    /// Serializers of class types call this right after creating the
    /// instance and before reading any field.
    #[inline]
    pub fn reference(&mut self, object: &ObjectRef) {
        self.references.bind(object);
    }

    /// Reads a non-null value of type `ty` with `serializer`.
    pub fn read_object(
        &mut self,
        ty: Type,
        serializer: &dyn Serializer,
        generics: &[ConcreteType],
    ) -> Result<Value, CodecError> {
        self.read_framed(ty, serializer, generics, false)
    }

    /// Reads a value of type `ty` that may be null.
    pub fn read_object_or_null(
        &mut self,
        ty: Type,
        serializer: &dyn Serializer,
        generics: &[ConcreteType],
    ) -> Result<Value, CodecError> {
        self.read_framed(ty, serializer, generics, true)
    }

    /// Reads a type tag, `None` for null.
    pub fn read_class(&mut self) -> Result<Option<&'a Registration>, CodecError> {
        let position = self.input.position();
        let tag = self.input.read_var_u32()?;
        if tag == 0 {
            return Ok(None);
        }
        match self.codec.registration_by_id(tag - 1) {
            Some(registration) => Ok(Some(registration)),
            None => Err(DecodeError::UnknownTypeTag { position, tag }.into()),
        }
    }

    /// Reads a type tag, then a value of that type.
    pub fn read_class_and_object(&mut self) -> Result<Value, CodecError> {
        match self.read_class()? {
            Some(registration) => {
                self.read_framed(registration.ty(), registration.serializer(), &[], false)
            }
            None => Ok(Value::Null),
        }
    }

    fn read_framed(
        &mut self,
        ty: Type,
        serializer: &dyn Serializer,
        generics: &[ConcreteType],
        nullable: bool,
    ) -> Result<Value, CodecError> {
        if !(ty.is_reference() && self.codec.references()) {
            if nullable && !self.input.read_bool()? {
                return Ok(Value::Null);
            }
            if !generics.is_empty() {
                serializer.set_generics(generics);
            }
            return serializer.read(self, ty);
        }

        match self.input.read_var_u32()? {
            references::NEW => {}
            references::NULL if nullable => return Ok(Value::Null),
            references::NULL => return Err(DecodeError::UnexpectedNull.into()),
            marker => return Ok(Value::Object(self.references.get(marker)?)),
        }

        self.references.reserve();
        if !generics.is_empty() {
            serializer.set_generics(generics);
        }
        match serializer.read(self, ty) {
            Ok(value) => {
                if self.references.finish(&value) {
                    log::warn!("serializer for `{ty}` did not register the instance it read");
                }
                Ok(value)
            }
            Err(err) => {
                self.references.abandon();
                Err(err)
            }
        }
    }
}

impl GenericsStack for ReadContext<'_, '_> {
    #[inline]
    fn generics(&self) -> &GenericsResolver {
        &self.generics
    }

    #[inline]
    fn generics_mut(&mut self) -> &mut GenericsResolver {
        &mut self.generics
    }
}
