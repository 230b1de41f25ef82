use oc_reflect::info::{ConcreteType, Type};
use oc_reflect::object::{ObjectRef, Value};
use oc_utils::hash::HashSet;

use crate::generics::{GenericsResolver, GenericsStack};
use crate::io::Output;
use crate::references::{self, WriteReferences};
use crate::serializer::Serializer;
use crate::serializer::builtin::mismatch;
use crate::{Codec, CodecError, ConfigError, EncodeError, Registration};

// -----------------------------------------------------------------------------
// WriteContext

/// State of one write pass.
pub struct WriteContext<'a> {
    codec: &'a Codec,
    output: &'a mut Output,
    references: WriteReferences,
    // Objects being written, used when references are off.
    path: HashSet<ObjectRef>,
    generics: GenericsResolver,
}

impl<'a> WriteContext<'a> {
    pub(crate) fn new(codec: &'a Codec, output: &'a mut Output) -> Self {
        Self {
            codec,
            output,
            references: WriteReferences::default(),
            path: HashSet::default(),
            generics: GenericsResolver::new(),
        }
    }

    /// Returns the codec driving this pass.
    #[inline]
    pub fn codec(&self) -> &'a Codec {
        self.codec
    }

    /// Returns the output, for writing primitives directly.
    #[inline]
    pub fn output(&mut self) -> &mut Output {
        self.output
    }

    /// Returns the number of bytes written so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.output.position()
    }

    /// Writes a non-null value of type `ty` with `serializer`.
    ///
    /// `generics` are handed to the serializer right before it runs. For a
    /// class type the object is preceded by its reference marker, and
    /// nothing else is written if it was written before in this pass.
    pub fn write_object(
        &mut self,
        ty: Type,
        value: &Value,
        serializer: &dyn Serializer,
        generics: &[ConcreteType],
    ) -> Result<(), CodecError> {
        self.write_framed(ty, value, serializer, generics, false)
    }

    /// Like [`write_object`](Self::write_object), but `value` may be null.
    ///
    /// Class types encode null in the reference marker, other types get a
    /// presence byte.
    pub fn write_object_or_null(
        &mut self,
        ty: Type,
        value: &Value,
        serializer: &dyn Serializer,
        generics: &[ConcreteType],
    ) -> Result<(), CodecError> {
        self.write_framed(ty, value, serializer, generics, true)
    }

    /// Writes the type tag of `value`, `0` for null.
    ///
    /// Returns the registration of the value's type.
    pub fn write_class(&mut self, value: &Value) -> Result<Option<&'a Registration>, CodecError> {
        let Some(ty) = value.ty() else {
            self.output.write_var_u32(0);
            return Ok(None);
        };
        let registration = self
            .codec
            .registration(ty)
            .ok_or(ConfigError::UnregisteredType(ty))?;
        self.output.write_var_u32(registration.id() + 1);
        Ok(Some(registration))
    }

    /// Writes the type tag of `value`, then `value` with the serializer
    /// registered for its type.
    pub fn write_class_and_object(&mut self, value: &Value) -> Result<(), CodecError> {
        match self.write_class(value)? {
            Some(registration) => self.write_framed(
                registration.ty(),
                value,
                registration.serializer(),
                &[],
                false,
            ),
            None => Ok(()),
        }
    }

    fn write_framed(
        &mut self,
        ty: Type,
        value: &Value,
        serializer: &dyn Serializer,
        generics: &[ConcreteType],
        nullable: bool,
    ) -> Result<(), CodecError> {
        if ty.is_reference() && self.codec.references() {
            let object = match value {
                Value::Object(object) => object,
                Value::Null if nullable => {
                    self.output.write_var_u32(references::NULL);
                    return Ok(());
                }
                other => return Err(mismatch(ty, other)),
            };
            let marker = self.references.marker(object);
            self.output.write_var_u32(marker);
            if marker != references::NEW {
                return Ok(());
            }
        } else if value.is_null() {
            if !nullable {
                return Err(EncodeError::NullValue.into());
            }
            self.output.write_bool(false);
            return Ok(());
        } else if nullable {
            self.output.write_bool(true);
        }

        // Without identity tracking an object met again on its own path
        // would recurse forever.
        let on_path = match value {
            Value::Object(object) if !self.codec.references() => {
                if !self.path.insert(object.clone()) {
                    return Err(EncodeError::Cycle(object.class_id()).into());
                }
                Some(object)
            }
            _ => None,
        };

        if !generics.is_empty() {
            serializer.set_generics(generics);
        }
        let result = serializer.write(self, value);
        if let Some(object) = on_path {
            self.path.remove(object);
        }
        result
    }
}

impl GenericsStack for WriteContext<'_> {
    #[inline]
    fn generics(&self) -> &GenericsResolver {
        &self.generics
    }

    #[inline]
    fn generics_mut(&mut self) -> &mut GenericsResolver {
        &mut self.generics
    }
}
