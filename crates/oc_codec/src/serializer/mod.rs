//! The [`Serializer`] trait and its implementations.
//!
//! - [`builtin`]: serializers of the built-in value types.
//! - [`field`]: [`FieldSerializer`](field::FieldSerializer), which handles
//!   any registered class field by field.

use core::any::Any;

use oc_reflect::info::{ConcreteType, Type};
use oc_reflect::object::Value;

use crate::{CodecError, ConfigError, Context, CopyContext, ReadContext, WriteContext};

// -----------------------------------------------------------------------------
// Modules

pub mod builtin;
pub mod field;

// -----------------------------------------------------------------------------
// Serializer

/// Writes, reads and copies values of one type.
///
/// Serializers are owned by a [`Codec`](crate::Codec) and shared by every
/// pass, so the pass methods take `&self`. Reference framing, null markers
/// and type tags are handled by the contexts; a serializer only sees
/// non-null values of its own type.
///
/// Implementors are retrieved back by type through
/// [`Codec::serializer_mut`](crate::Codec::serializer_mut), hence the
/// `Any` bound.
///
/// # Examples
///
/// ```
/// use oc_codec::{Codec, CodecError, ReadContext, WriteContext};
/// use oc_codec::serializer::Serializer;
/// use oc_reflect::info::Type;
/// use oc_reflect::object::Value;
///
/// /// Writes strings upper-cased.
/// struct Shout;
///
/// impl Serializer for Shout {
///     fn write(&self, ctx: &mut WriteContext<'_>, value: &Value) -> Result<(), CodecError> {
///         ctx.output().write_str(&value.as_str().unwrap_or_default().to_uppercase());
///         Ok(())
///     }
///
///     fn read(&self, ctx: &mut ReadContext<'_, '_>, _: Type) -> Result<Value, CodecError> {
///         Ok(Value::Str(ctx.input().read_string()?))
///     }
/// }
///
/// let mut codec = Codec::new();
/// codec.register(Type::Str, Shout);
///
/// let bytes = codec.write(&Value::from("hi")).unwrap();
/// assert_eq!(codec.read(&bytes).unwrap(), Value::from("HI"));
/// ```
pub trait Serializer: Any {
    /// Writes a non-null `value`.
    fn write(&self, ctx: &mut WriteContext<'_>, value: &Value) -> Result<(), CodecError>;

    /// Reads a value of type `ty`.
    fn read(&self, ctx: &mut ReadContext<'_, '_>, ty: Type) -> Result<Value, CodecError>;

    /// Creates a copy of a non-null `original`.
    ///
    /// The default returns plain values as they are, since they are
    /// immutable. Objects fail with [`ConfigError::CopyUnsupported`]; a
    /// serializer of a class type must override this to support copy.
    fn copy(&self, ctx: &mut CopyContext<'_>, original: &Value) -> Result<Value, CodecError> {
        let _ = ctx;
        match original {
            Value::Object(object) => Err(ConfigError::CopyUnsupported(object.ty()).into()),
            other => Ok(other.clone()),
        }
    }

    /// Supplies type arguments for the next `write` or `read` call.
    ///
    /// Called right before that call, only when arguments are known.
    fn set_generics(&self, args: &[ConcreteType]) {
        let _ = args;
    }

    /// Notifies the serializer that the codec's [`Context`] was replaced.
    fn update_context(&mut self, context: &Context) {
        let _ = context;
    }
}
