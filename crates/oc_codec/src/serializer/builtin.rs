//! Serializers of the built-in value types.
//!
//! Registered by [`Codec::new`](crate::Codec::new) in this order, which
//! fixes their type ids: `bool` 0, `i32` 1, `i64` 2, `f32` 3, `f64` 4,
//! `String` 5.

use alloc::boxed::Box;

use oc_reflect::info::Type;
use oc_reflect::object::Value;

use crate::serializer::Serializer;
use crate::{CodecError, EncodeError, ReadContext, WriteContext};

/// The error for a value that is not of type `expected`.
pub(crate) fn mismatch(expected: Type, value: &Value) -> CodecError {
    match value.ty() {
        Some(found) => EncodeError::TypeMismatch { expected, found }.into(),
        None => EncodeError::NullValue.into(),
    }
}

macro_rules! impl_value_serializer {
    (
        $(#[$meta:meta])*
        $name:ident, $variant:ident, $ty:expr,
        |$out:ident, $value:ident| $write:expr,
        |$input:ident| $read:expr $(,)?
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Default, Debug)]
        pub struct $name;

        impl Serializer for $name {
            fn write(&self, ctx: &mut WriteContext<'_>, value: &Value) -> Result<(), CodecError> {
                let Value::$variant($value) = value else {
                    return Err(mismatch($ty, value));
                };
                let $out = ctx.output();
                $write;
                Ok(())
            }

            fn read(&self, ctx: &mut ReadContext<'_, '_>, _: Type) -> Result<Value, CodecError> {
                let $input = ctx.input();
                Ok(Value::$variant($read))
            }
        }
    };
}

impl_value_serializer! {
    /// One byte, `0` or `1`.
    BoolSerializer, Bool, Type::Bool,
    |out, value| out.write_bool(*value),
    |input| input.read_bool()?,
}

impl_value_serializer! {
    /// Zig-zag varint, 1 to 5 bytes.
    IntSerializer, Int, Type::Int,
    |out, value| out.write_var_i32(*value, false),
    |input| input.read_var_i32(false)?,
}

impl_value_serializer! {
    /// Zig-zag varint, 1 to 10 bytes.
    LongSerializer, Long, Type::Long,
    |out, value| out.write_var_i64(*value, false),
    |input| input.read_var_i64(false)?,
}

impl_value_serializer! {
    /// IEEE-754 bits, 4 bytes.
    FloatSerializer, Float, Type::Float,
    |out, value| out.write_f32(*value),
    |input| input.read_f32()?,
}

impl_value_serializer! {
    /// IEEE-754 bits, 8 bytes.
    DoubleSerializer, Double, Type::Double,
    |out, value| out.write_f64(*value),
    |input| input.read_f64()?,
}

impl_value_serializer! {
    /// Varint byte count, then UTF-8.
    StringSerializer, Str, Type::Str,
    |out, value| out.write_str(value),
    |input| input.read_string()?,
}

/// The built-in types with their serializers, in id order.
pub(crate) fn defaults() -> [(Type, Box<dyn Serializer>); 6] {
    [
        (Type::Bool, Box::new(BoolSerializer)),
        (Type::Int, Box::new(IntSerializer)),
        (Type::Long, Box::new(LongSerializer)),
        (Type::Float, Box::new(FloatSerializer)),
        (Type::Double, Box::new(DoubleSerializer)),
        (Type::Str, Box::new(StringSerializer)),
    ]
}
