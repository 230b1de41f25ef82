use alloc::boxed::Box;
use core::fmt;

use oc_reflect::access::FieldAccessor;
use oc_reflect::info::{ClassId, ClassInfo, ConcreteType, FieldInfo, FieldType, Type};
use oc_reflect::object::{Object, Value};

use crate::serializer::Serializer;
use crate::serializer::builtin::mismatch;
use crate::serializer::field::FieldSerializerConfig;
use crate::{Codec, CodecError, ConfigError, CopyContext, DecodeError, EncodeError};
use crate::{ReadContext, WriteContext};

// -----------------------------------------------------------------------------
// CachedField

/// One field of a [`FieldSerializer`](super::FieldSerializer) with its
/// encoding settings.
///
/// The value serializer is chosen per call, first match wins:
///
/// 1. the serializer set with [`set_serializer`](Self::set_serializer),
///    [`set_class_with`](Self::set_class_with) or [`Bind`](super::Bind);
/// 2. the one registered for [`value_class`](Self::value_class);
/// 3. the one registered for the type its type variables resolve to;
/// 4. the one registered for its declared type;
/// 5. otherwise every value is written with a type tag.
///
/// `i32` and `i64` fields without an explicit serializer are written
/// directly, following [`var_int`](Self::var_int) and
/// [`optimize_positive`](Self::optimize_positive).
///
/// # Examples
///
/// ```
/// use oc_codec::Codec;
/// use oc_codec::io::Output;
/// use oc_reflect::info::{ClassInfo, FieldInfo, FieldType};
/// use oc_reflect::object::Value;
///
/// let mut codec = Codec::new();
/// let counter = codec
///     .register_class(ClassInfo::new("demo::Counter", [FieldInfo::new("hits", FieldType::INT)]))
///     .unwrap();
///
/// let object = Value::from(codec.new_instance(counter).unwrap());
/// object.as_object().unwrap().set("hits", 300).unwrap();
///
/// let field = codec.field_serializer_mut(counter).unwrap().get_field_mut("hits").unwrap();
/// assert!(field.var_int() && !field.optimize_positive());
/// field.set_var_int(false);
///
/// let mut out = Output::new();
/// codec.write_object(&mut out, &object).unwrap();
/// // reference marker, then a fixed-width i32
/// assert_eq!(out.as_bytes(), &[1, 0, 0, 0x01, 0x2C]);
/// ```
pub struct CachedField {
    class: ClassId,
    accessor: FieldAccessor,
    field_type: FieldType,
    static_type: Option<ConcreteType>,
    value_class: Option<Type>,
    serializer: Option<Box<dyn Serializer>>,
    can_be_null: bool,
    var_int: bool,
    optimize_positive: bool,
    generic: bool,
    pub(super) serialized: bool,
    pub(super) copied: bool,
}

enum Plan<'s> {
    Int,
    Long,
    Known {
        ty: Type,
        serializer: &'s dyn Serializer,
        args: &'s [ConcreteType],
    },
    Dynamic,
}

impl CachedField {
    pub(super) fn new(class: &ClassInfo, field: &FieldInfo, config: &FieldSerializerConfig) -> Self {
        let field_type = field.ty().clone();
        Self {
            class: class.id(),
            accessor: FieldAccessor::new(class, field),
            static_type: field_type.resolve(&|_| None),
            can_be_null: config.fields_can_be_null && !field_type.is_primitive(),
            generic: field_type.mentions_params(),
            field_type,
            value_class: None,
            serializer: None,
            var_int: config.var_int,
            optimize_positive: false,
            serialized: true,
            copied: true,
        }
    }

    // -------------------------------------------------------------------------
    // Settings

    /// Declares the exact runtime type of every value of this field, and
    /// drops the explicit serializer.
    ///
    /// Saves the type tag. Only use it when values never vary in type; a
    /// value of another type fails to write with
    /// [`EncodeError::TypeMismatch`].
    #[inline]
    pub fn set_class(&mut self, value_class: Option<Type>) {
        self.value_class = value_class;
        self.serializer = None;
    }

    /// Declares the exact runtime type and the serializer for it.
    #[inline]
    pub fn set_class_with(&mut self, value_class: Type, serializer: impl Serializer) {
        self.value_class = Some(value_class);
        self.serializer = Some(Box::new(serializer));
    }

    /// Uses `serializer` for every value of this field.
    #[inline]
    pub fn set_serializer(&mut self, serializer: impl Serializer) {
        self.serializer = Some(Box::new(serializer));
    }

    /// Drops the explicit serializer.
    #[inline]
    pub fn clear_serializer(&mut self) {
        self.serializer = None;
    }

    #[inline]
    pub fn serializer(&self) -> Option<&dyn Serializer> {
        self.serializer.as_deref()
    }

    #[inline]
    pub(super) fn bind(&mut self, serializer: Box<dyn Serializer>) {
        self.serializer = Some(serializer);
    }

    #[inline]
    pub fn value_class(&self) -> Option<Type> {
        self.value_class
    }

    /// Controls the null marker. Defaults to the config's
    /// `fields_can_be_null` for non-primitive fields, `false` otherwise.
    #[inline]
    pub fn set_can_be_null(&mut self, can_be_null: bool) {
        self.can_be_null = can_be_null;
    }

    #[inline]
    pub fn can_be_null(&self) -> bool {
        self.can_be_null
    }

    /// Uses variable-length encoding for `i32` and `i64` values.
    /// Defaults to the config's `var_int`.
    #[inline]
    pub fn set_var_int(&mut self, var_int: bool) {
        self.var_int = var_int;
    }

    #[inline]
    pub fn var_int(&self) -> bool {
        self.var_int
    }

    /// Favours small non-negative values over small magnitudes of either
    /// sign in variable-length encoding. Default is `false`.
    #[inline]
    pub fn set_optimize_positive(&mut self, optimize_positive: bool) {
        self.optimize_positive = optimize_positive;
    }

    #[inline]
    pub fn optimize_positive(&self) -> bool {
        self.optimize_positive
    }

    // -------------------------------------------------------------------------
    // Identity

    #[inline]
    pub fn name(&self) -> &'static str {
        self.accessor.name()
    }

    /// Returns the class declaring the field.
    #[inline]
    pub fn class(&self) -> ClassId {
        self.class
    }

    #[inline]
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    /// Returns the index of the field in its class table.
    #[inline]
    pub fn access_index(&self) -> usize {
        self.accessor.index()
    }

    #[inline]
    pub fn accessor(&self) -> &FieldAccessor {
        &self.accessor
    }

    /// Returns `true` if the declared type mentions a type variable.
    #[inline]
    pub fn is_generic(&self) -> bool {
        self.generic
    }

    /// Returns `true` if the field is written and read.
    #[inline]
    pub fn is_serialized(&self) -> bool {
        self.serialized
    }

    /// Returns `true` if the field is copied.
    #[inline]
    pub fn is_copied(&self) -> bool {
        self.copied
    }

    // -------------------------------------------------------------------------
    // Transfer

    fn plan<'s>(
        &'s self,
        codec: &'s Codec,
        resolved: Option<&'s ConcreteType>,
    ) -> Result<Plan<'s>, CodecError> {
        let concrete = resolved.or(self.static_type.as_ref());
        let known = match self.value_class {
            Some(ty) => {
                let args = concrete.filter(|c| c.ty() == ty).map_or(&[][..], ConcreteType::args);
                Some((ty, args))
            }
            None => concrete.map(|c| (c.ty(), c.args())),
        };

        if let Some(serializer) = self.serializer.as_deref() {
            let Some((ty, args)) = known else {
                return Err(ConfigError::UnresolvedFieldType {
                    class: self.class,
                    field: self.name(),
                }
                .into());
            };
            return Ok(Plan::Known {
                ty,
                serializer,
                args,
            });
        }

        Ok(match known {
            Some((Type::Int, _)) => Plan::Int,
            Some((Type::Long, _)) => Plan::Long,
            Some((ty, args)) => Plan::Known {
                ty,
                serializer: codec.serializer(ty)?,
                args,
            },
            None => Plan::Dynamic,
        })
    }

    fn check_type(expected: Type, value: &Value) -> Result<(), CodecError> {
        match value.ty() {
            Some(found) if found != expected => Err(mismatch(expected, value)),
            _ => Ok(()),
        }
    }

    /// Writes the field of `object`.
    ///
    /// `resolved` is the declared type with its type variables substituted,
    /// if they could be.
    pub fn write(
        &self,
        ctx: &mut WriteContext<'_>,
        object: &Object,
        resolved: Option<&ConcreteType>,
    ) -> Result<(), CodecError> {
        let value = self.accessor.get(object)?.clone();
        if value.is_null() && !self.can_be_null {
            return Err(EncodeError::NullValue.into());
        }

        match self.plan(ctx.codec(), resolved)? {
            Plan::Dynamic => ctx.write_class_and_object(&value),
            Plan::Known {
                ty,
                serializer,
                args,
            } => {
                Self::check_type(ty, &value)?;
                if self.can_be_null {
                    ctx.write_object_or_null(ty, &value, serializer, args)
                } else {
                    ctx.write_object(ty, &value, serializer, args)
                }
            }
            Plan::Int => {
                Self::check_type(Type::Int, &value)?;
                self.write_presence(ctx, &value);
                if let Value::Int(v) = value {
                    let out = ctx.output();
                    if self.var_int {
                        out.write_var_i32(v, self.optimize_positive);
                    } else {
                        out.write_i32(v);
                    }
                }
                Ok(())
            }
            Plan::Long => {
                Self::check_type(Type::Long, &value)?;
                self.write_presence(ctx, &value);
                if let Value::Long(v) = value {
                    let out = ctx.output();
                    if self.var_int {
                        out.write_var_i64(v, self.optimize_positive);
                    } else {
                        out.write_i64(v);
                    }
                }
                Ok(())
            }
        }
    }

    /// Writes the presence byte if the field is nullable.
    fn write_presence(&self, ctx: &mut WriteContext<'_>, value: &Value) {
        if self.can_be_null {
            ctx.output().write_bool(!value.is_null());
        }
    }

    fn read_presence(&self, ctx: &mut ReadContext<'_, '_>) -> Result<bool, CodecError> {
        if self.can_be_null {
            Ok(ctx.input().read_bool()?)
        } else {
            Ok(true)
        }
    }

    /// Reads the field and stores it into `object`.
    pub fn read(
        &self,
        ctx: &mut ReadContext<'_, '_>,
        object: &Object,
        resolved: Option<&ConcreteType>,
    ) -> Result<(), CodecError> {
        let value = match self.plan(ctx.codec(), resolved)? {
            Plan::Dynamic => ctx.read_class_and_object()?,
            Plan::Known {
                ty,
                serializer,
                args,
            } => {
                if self.can_be_null {
                    ctx.read_object_or_null(ty, serializer, args)?
                } else {
                    ctx.read_object(ty, serializer, args)?
                }
            }
            Plan::Int if self.read_presence(ctx)? => {
                let input = ctx.input();
                Value::Int(if self.var_int {
                    input.read_var_i32(self.optimize_positive)?
                } else {
                    input.read_i32()?
                })
            }
            Plan::Long if self.read_presence(ctx)? => {
                let input = ctx.input();
                Value::Long(if self.var_int {
                    input.read_var_i64(self.optimize_positive)?
                } else {
                    input.read_i64()?
                })
            }
            Plan::Int | Plan::Long => Value::Null,
        };

        if value.is_null() && !self.can_be_null {
            return Err(DecodeError::UnexpectedNull.into());
        }
        self.accessor.set(object, value)?;
        Ok(())
    }

    /// Copies the field from `original` into `copy`.
    ///
    /// Plain values are cloned, objects are copied through the pass so that
    /// shared references stay shared.
    pub fn copy(
        &self,
        ctx: &mut CopyContext<'_>,
        original: &Object,
        copy: &Object,
    ) -> Result<(), CodecError> {
        let value = self.accessor.get(original)?.clone();
        let value = match self.serializer.as_deref() {
            Some(serializer) => ctx.copy_with(&value, serializer)?,
            None => ctx.copy(&value)?,
        };
        self.accessor.set(copy, value)?;
        Ok(())
    }
}

impl fmt::Display for CachedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Debug for CachedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedField")
            .field("class", &self.class)
            .field("name", &self.name())
            .field("field_type", &self.field_type)
            .field("value_class", &self.value_class)
            .field("serializer", &self.serializer.is_some())
            .field("can_be_null", &self.can_be_null)
            .field("var_int", &self.var_int)
            .field("optimize_positive", &self.optimize_positive)
            .finish()
    }
}
