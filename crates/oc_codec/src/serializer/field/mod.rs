//! [`FieldSerializer`]: writes, reads and copies objects field by field.
//!
//! The serializer derives a [`CachedFields`] table from the class table and
//! walks it in declaration order. No field names or ids are written, so a
//! reader must use the same class table and the same configuration as the
//! writer.
//!
//! Type variables: a class declaring type parameters can be given type
//! arguments through [`Serializer::set_generics`] before each write or
//! read. Fields declared with a type variable then use the serializer of
//! the bound type instead of a type tag, and generic fields pass their
//! resolved arguments on to the nested serializer.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::sync::Arc;

use oc_reflect::info::{ClassId, ClassInfo, ConcreteType, Type};
use oc_reflect::object::{Object, ObjectRef, Value};

use crate::generics::{GenericsResolver, GenericsStack, ScopeGuard};
use crate::serializer::Serializer;
use crate::serializer::builtin::mismatch;
use crate::{Codec, CodecError, ConfigError, Context, CopyContext, ReadContext, WriteContext};

// -----------------------------------------------------------------------------
// Modules

mod annotations;
mod cached_field;
mod cached_fields;
mod config;
mod generics;

// -----------------------------------------------------------------------------
// Exports

pub use annotations::{Bind, NotNull, Optional, Transient};
pub use cached_field::CachedField;
pub use cached_fields::CachedFields;
pub use config::FieldSerializerConfig;

use generics::{FieldSerializerGenerics, Resolution};

// -----------------------------------------------------------------------------
// FieldSerializerHooks

/// Customization points of a [`FieldSerializer`].
///
/// `()` keeps every default.
///
/// # Examples
///
/// A class without zero-argument construction:
///
/// ```
/// use std::sync::Arc;
/// use oc_codec::{Codec, CodecError, CopyContext, ReadContext};
/// use oc_codec::serializer::field::{FieldSerializer, FieldSerializerHooks};
/// use oc_reflect::info::{ClassInfo, FieldInfo, FieldType};
/// use oc_reflect::object::{Object, ObjectRef, Value, graph_eq};
///
/// struct Prefilled;
///
/// impl FieldSerializerHooks for Prefilled {
///     fn create(&self, _: &mut ReadContext<'_, '_>, class: &Arc<ClassInfo>) -> Result<Object, CodecError> {
///         Ok(Object::new(class.clone()))
///     }
///
///     fn create_copy(&self, _: &mut CopyContext<'_>, original: &ObjectRef) -> Result<Object, CodecError> {
///         Ok(Object::new(original.class().clone()))
///     }
/// }
///
/// let mut codec = Codec::new();
/// let info = ClassInfo::new("demo::Socket", [FieldInfo::new("port", FieldType::INT)])
///     .without_default_constructor();
/// let socket = codec
///     .register_class_with(info, |codec, class| {
///         FieldSerializer::with_hooks(codec, class, codec.default_config().clone(), Prefilled)
///     })
///     .unwrap();
///
/// let value = Value::from(Object::new(codec.class(socket).unwrap().clone()));
/// let back = codec.read(&codec.write(&value).unwrap()).unwrap();
/// assert!(graph_eq(&value, &back));
/// assert!(codec.copy(&value).is_ok());
/// ```
pub trait FieldSerializerHooks: 'static {
    /// Creates the instance a read fills in.
    ///
    /// The default delegates to [`Codec::new_instance`].
    fn create(
        &self,
        ctx: &mut ReadContext<'_, '_>,
        class: &Arc<ClassInfo>,
    ) -> Result<Object, CodecError> {
        ctx.codec().new_instance(class.id())
    }

    /// Creates the instance a copy fills in.
    ///
    /// The default delegates to [`Codec::new_instance`].
    fn create_copy(
        &self,
        ctx: &mut CopyContext<'_>,
        original: &ObjectRef,
    ) -> Result<Object, CodecError> {
        ctx.codec().new_instance(original.class_id())
    }

    /// Post-processes the field table after every rebuild, e.g. to remove
    /// fields or to install serializers.
    fn initialize_cached_fields(&self, fields: &mut CachedFields) {
        let _ = fields;
    }
}

impl FieldSerializerHooks for () {}

// -----------------------------------------------------------------------------
// FieldSerializer

/// Serializes instances of one class by walking its fields.
///
/// # Examples
///
/// ```
/// use oc_codec::{Codec, ErrorKind};
/// use oc_reflect::info::{ClassInfo, FieldInfo, FieldType};
///
/// let mut codec = Codec::new();
/// let user = codec
///     .register_class(ClassInfo::new("demo::User", [
///         FieldInfo::new("id", FieldType::LONG),
///         FieldInfo::new("name", FieldType::STR),
///         FieldInfo::new("token", FieldType::STR),
///     ]))
///     .unwrap();
///
/// let serializer = codec.field_serializer_mut(user).unwrap();
/// serializer.remove_field("token").unwrap();
///
/// let names: Vec<_> = serializer.fields().map(|field| field.name()).collect();
/// assert_eq!(names, ["id", "name"]);
///
/// let err = serializer.get_field("missing").unwrap_err();
/// assert_eq!(err.to_string(), "field `missing` not found in `demo::User`");
/// ```
pub struct FieldSerializer<H: FieldSerializerHooks = ()> {
    class: Arc<ClassInfo>,
    config: FieldSerializerConfig,
    context: Context,
    fields: CachedFields,
    generics: FieldSerializerGenerics,
    hooks: H,
}

impl FieldSerializer {
    /// Creates a serializer for `class` with the codec's default config.
    pub fn new(codec: &Codec, class: ClassId) -> Result<Self, CodecError> {
        Self::with_config(codec, class, codec.default_config().clone())
    }

    /// Creates a serializer for `class` with `config`.
    pub fn with_config(
        codec: &Codec,
        class: ClassId,
        config: FieldSerializerConfig,
    ) -> Result<Self, CodecError> {
        Self::with_hooks(codec, class, config, ())
    }
}

impl<H: FieldSerializerHooks> FieldSerializer<H> {
    /// Creates a serializer for `class` with `config` and custom `hooks`.
    ///
    /// The codec's current [`Context`] is captured for the field table.
    pub fn with_hooks(
        codec: &Codec,
        class: ClassId,
        config: FieldSerializerConfig,
        hooks: H,
    ) -> Result<Self, CodecError> {
        let class = codec.class(class)?.clone();
        let mut serializer = Self {
            class,
            config,
            context: codec.context().clone(),
            fields: CachedFields::default(),
            generics: FieldSerializerGenerics::default(),
            hooks,
        };
        serializer.rebuild();
        Ok(serializer)
    }

    fn rebuild(&mut self) {
        self.fields.rebuild(&self.class, &self.config, &self.context);
        self.hooks.initialize_cached_fields(&mut self.fields);
        self.generics.invalidate();
        log::debug!(
            "build field table of `{}`: {} fields",
            self.class.path(),
            self.fields.len()
        );
    }

    /// Replaces the config and rebuilds the field table.
    ///
    /// Per-field settings made since the last rebuild are lost.
    pub fn update_config(&mut self, config: FieldSerializerConfig) {
        self.config = config;
        self.rebuild();
    }

    #[inline]
    pub fn config(&self) -> &FieldSerializerConfig {
        &self.config
    }

    /// Returns the class this serializer handles.
    #[inline]
    pub fn class(&self) -> &Arc<ClassInfo> {
        &self.class
    }

    #[inline]
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    fn unknown_field(&self, name: &str) -> ConfigError {
        ConfigError::UnknownField {
            class: self.class.id(),
            field: String::from(name),
        }
    }

    /// Returns the field called `name`.
    pub fn get_field(&self, name: &str) -> Result<&CachedField, ConfigError> {
        self.fields.get(name).ok_or_else(|| self.unknown_field(name))
    }

    /// Returns the field called `name` for configuration.
    pub fn get_field_mut(&mut self, name: &str) -> Result<&mut CachedField, ConfigError> {
        let class = self.class.id();
        self.fields.get_mut(name).ok_or_else(|| ConfigError::UnknownField {
            class,
            field: String::from(name),
        })
    }

    /// Removes the field called `name` from both the write/read and the
    /// copy list.
    pub fn remove_field(&mut self, name: &str) -> Result<CachedField, ConfigError> {
        let removed = self.fields.remove(name).ok_or_else(|| self.unknown_field(name))?;
        self.generics.invalidate();
        Ok(removed)
    }

    /// Removes every field for which `remove` returns `true` from both lists.
    pub fn remove_cached_fields(&mut self, mut remove: impl FnMut(&CachedField) -> bool) {
        self.fields.retain(|field| !remove(field));
        self.generics.invalidate();
    }

    /// Returns the write/read list.
    #[inline]
    pub fn fields(&self) -> impl Iterator<Item = &CachedField> {
        self.fields.fields()
    }

    /// Returns the copy list.
    #[inline]
    pub fn copy_fields(&self) -> impl Iterator<Item = &CachedField> {
        self.fields.copy_fields()
    }

    #[inline]
    pub fn cached_fields(&self) -> &CachedFields {
        &self.fields
    }

    fn instance<'v>(&self, value: &'v Value) -> Result<&'v ObjectRef, CodecError> {
        match value {
            Value::Object(object) if object.class_id() == self.class.id() => Ok(object),
            other => Err(mismatch(self.class.ty(), other)),
        }
    }

    /// Consumes pending type arguments and resolves them.
    fn resolution(&self) -> Result<Option<Rc<Resolution>>, CodecError> {
        let Some(args) = self.generics.take_pending() else {
            return Ok(None);
        };
        if !self.config.optimized_generics || self.class.generics().is_empty() {
            return Ok(None);
        }
        log::trace!("type arguments of `{}`: {args:?}", self.class.path());
        Ok(Some(self.generics.resolve(&self.class, &self.fields, args)?))
    }

    /// The concrete type of the field at `index` of the table.
    fn resolve_field(
        &self,
        index: usize,
        field: &CachedField,
        resolution: Option<&Resolution>,
        stack: &GenericsResolver,
    ) -> Option<ConcreteType> {
        if !field.is_generic() || !self.config.optimized_generics {
            return None;
        }
        match resolution {
            Some(resolution) => resolution.field(index).cloned(),
            None if stack.is_empty() => None,
            None => field
                .field_type()
                .resolve(&|name: &str| stack.resolve_in(self.class.id(), name).cloned()),
        }
    }
}

impl<H: FieldSerializerHooks> Serializer for FieldSerializer<H> {
    fn write(&self, ctx: &mut WriteContext<'_>, value: &Value) -> Result<(), CodecError> {
        // Pending arguments belong to this call even if it fails.
        let resolution = self.resolution()?;
        let object = self.instance(value)?;
        let mut ctx = ScopeGuard::push(ctx, resolution.as_ref().map(|r| r.scope.clone()));

        for (index, field) in self.fields.entries().iter().enumerate() {
            if !field.is_serialized() {
                continue;
            }
            log::trace!(
                "write {} field `{field}` ({}) pos={}",
                field.field_type(),
                self.class.path(),
                ctx.position()
            );
            let resolved = self.resolve_field(index, field, resolution.as_deref(), ctx.generics());
            field
                .write(&mut ctx, object, resolved.as_ref())
                .map_err(|err| err.in_field(self.class.id(), field.name()))?;
        }
        Ok(())
    }

    fn read(&self, ctx: &mut ReadContext<'_, '_>, _: Type) -> Result<Value, CodecError> {
        let resolution = self.resolution()?;
        let mut ctx = ScopeGuard::push(ctx, resolution.as_ref().map(|r| r.scope.clone()));

        let object = ObjectRef::new(self.hooks.create(&mut ctx, &self.class)?);
        ctx.reference(&object);

        for (index, field) in self.fields.entries().iter().enumerate() {
            if !field.is_serialized() {
                continue;
            }
            log::trace!(
                "read {} field `{field}` ({}) pos={}",
                field.field_type(),
                self.class.path(),
                ctx.position()
            );
            let resolved = self.resolve_field(index, field, resolution.as_deref(), ctx.generics());
            field
                .read(&mut ctx, &object, resolved.as_ref())
                .map_err(|err| err.in_field(self.class.id(), field.name()))?;
        }
        Ok(Value::Object(object))
    }

    fn copy(&self, ctx: &mut CopyContext<'_>, original: &Value) -> Result<Value, CodecError> {
        let original = self.instance(original)?;
        let copy = ObjectRef::new(self.hooks.create_copy(ctx, original)?);
        ctx.reference(original, &copy);

        for field in self.fields.copy_fields() {
            field
                .copy(ctx, original, &copy)
                .map_err(|err| err.in_field(self.class.id(), field.name()))?;
        }
        Ok(Value::Object(copy))
    }

    fn set_generics(&self, args: &[ConcreteType]) {
        self.generics.set_pending(args);
    }

    fn update_context(&mut self, context: &Context) {
        if self.context != *context {
            self.context = context.clone();
            self.rebuild();
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::{String, ToString};
    use alloc::vec::Vec;

    use oc_reflect::info::{ClassId, ClassInfo, ConcreteType, FieldInfo, FieldType, Type};
    use oc_reflect::object::{Object, ObjectRef, Value, graph_eq};

    use super::{Bind, CachedFields, FieldSerializer, FieldSerializerConfig, FieldSerializerHooks};
    use super::{NotNull, Optional, Transient};
    use crate::io::{Input, Output};
    use crate::serializer::Serializer;
    use crate::{Codec, CodecError, ConfigError, Context, DecodeError, EncodeError, ErrorKind};
    use crate::{ReadContext, WriteContext};

    const NODE: ClassId = ClassId::new("t::Node");
    const BOX: ClassId = ClassId::new("t::Box");
    const HOLDER: ClassId = ClassId::new("t::Holder");

    fn node_class() -> ClassInfo {
        ClassInfo::new(
            "t::Node",
            [
                FieldInfo::new("value", FieldType::INT),
                FieldInfo::new("label", FieldType::STR),
                FieldInfo::new("next", FieldType::class("t::Node")),
                FieldInfo::new("scratch", FieldType::Dynamic).with_attribute(Transient),
            ],
        )
    }

    fn generic_codec(config: FieldSerializerConfig) -> Codec {
        let mut codec = Codec::new();
        codec.set_default_config(config);
        codec
            .register_class(
                ClassInfo::new("t::Box", [FieldInfo::new("value", FieldType::param("T"))])
                    .with_type_params(["T"]),
            )
            .unwrap();
        codec
            .register_class(
                ClassInfo::new(
                    "t::Holder",
                    [FieldInfo::new("inner", FieldType::generic("t::Box", [FieldType::param("T")]))],
                )
                .with_type_params(["T"]),
            )
            .unwrap();
        codec
    }

    fn new_object(codec: &Codec, class: ClassId, values: &[(&str, Value)]) -> ObjectRef {
        let object = ObjectRef::new(codec.new_instance(class).unwrap());
        for (name, value) in values {
            object.set(name, value.clone()).unwrap();
        }
        object
    }

    fn write_generic(codec: &Codec, value: &ObjectRef, args: &[Type]) -> Result<Vec<u8>, CodecError> {
        let args: Vec<ConcreteType> = args.iter().map(|ty| (*ty).into()).collect();
        let mut out = Output::new();
        codec.write_generic_object(&mut out, &Value::Object(value.clone()), &args)?;
        Ok(out.into_bytes())
    }

    fn read_generic(codec: &Codec, bytes: &[u8], ty: ClassId, args: &[Type]) -> Value {
        let args: Vec<ConcreteType> = args.iter().map(|ty| (*ty).into()).collect();
        let mut input = Input::new(bytes);
        let value = codec.read_generic_object(&mut input, ty.into(), &args).unwrap();
        assert!(input.is_empty());
        value
    }

    /// Writes strings upper-cased.
    struct Upper;

    impl Serializer for Upper {
        fn write(&self, ctx: &mut WriteContext<'_>, value: &Value) -> Result<(), CodecError> {
            ctx.output().write_str(&value.as_str().unwrap_or_default().to_uppercase());
            Ok(())
        }

        fn read(&self, ctx: &mut ReadContext<'_, '_>, _: Type) -> Result<Value, CodecError> {
            Ok(Value::Str(ctx.input().read_string()?))
        }
    }

    fn upper() -> Box<dyn Serializer> {
        Box::new(Upper)
    }

    #[test]
    fn round_trip_preserves_cycles() {
        let mut codec = Codec::new();
        codec.register_class(node_class()).unwrap();

        let a = new_object(&codec, NODE, &[("value", 1.into()), ("label", "a".into())]);
        let b = new_object(&codec, NODE, &[("value", Value::Int(-2)), ("next", a.clone().into())]);
        a.set("next", b.clone()).unwrap();
        a.set("scratch", "not written").unwrap();

        let bytes = codec.write(&Value::Object(a.clone())).unwrap();
        let back = codec.read(&bytes).unwrap();

        let back_a = back.as_object().unwrap();
        let back_b = back_a.get("next").unwrap();
        let back_b = back_b.as_object().unwrap();
        assert!(back_b.get("next").unwrap().as_object().unwrap().ptr_eq(back_a));
        assert_eq!(back_b.get("value").unwrap(), Value::Int(-2));
        assert_eq!(back_b.get("label").unwrap(), Value::Null);
        assert_eq!(back_a.get("scratch").unwrap(), Value::Null);

        a.set("scratch", Value::Null).unwrap();
        assert!(graph_eq(&Value::Object(a), &back));
    }

    #[test]
    fn shared_references_stay_shared() {
        let mut codec = Codec::new();
        codec
            .register_class(ClassInfo::new(
                "t::Pair",
                [
                    FieldInfo::new("left", FieldType::class("t::Node")),
                    FieldInfo::new("right", FieldType::class("t::Node")),
                ],
            ))
            .unwrap();
        codec.register_class(node_class()).unwrap();

        let shared = new_object(&codec, NODE, &[("value", 7.into())]);
        let pair = new_object(
            &codec,
            ClassId::new("t::Pair"),
            &[("left", shared.clone().into()), ("right", shared.into())],
        );

        let back = codec.read(&codec.write(&Value::Object(pair.clone())).unwrap()).unwrap();
        let back = back.as_object().unwrap();
        let left = back.get("left").unwrap();
        let right = back.get("right").unwrap();
        assert_eq!(left, right);

        let copy = codec.copy(&Value::Object(pair)).unwrap();
        let copy = copy.as_object().unwrap();
        assert_eq!(copy.get("left").unwrap(), copy.get("right").unwrap());
    }

    #[test]
    fn copy_is_independent() {
        let mut codec = Codec::new();
        let node = codec.register_class(node_class()).unwrap();
        codec.field_serializer_mut(node).unwrap().remove_field("label").unwrap();

        let original = new_object(&codec, NODE, &[("value", 5.into()), ("label", "kept".into())]);
        original.set("scratch", 1.5_f64).unwrap();
        original.set("next", original.clone()).unwrap();

        let copy = codec.copy(&Value::Object(original.clone())).unwrap();
        let copy = copy.as_object().unwrap();
        assert!(!copy.ptr_eq(&original));
        assert!(copy.get("next").unwrap().as_object().unwrap().ptr_eq(copy));
        assert_eq!(copy.get("scratch").unwrap(), Value::Double(1.5));
        assert_eq!(copy.get("label").unwrap(), Value::Null);

        copy.set("value", 6).unwrap();
        assert_eq!(original.get("value").unwrap(), Value::Int(5));
    }

    #[test]
    fn field_order_is_declaration_order() {
        let mut codec = Codec::new();
        let node = codec.register_class(node_class()).unwrap();
        let serializer = codec.field_serializer_mut(node).unwrap();

        let names: Vec<_> = serializer.fields().map(|field| field.name()).collect();
        assert_eq!(names, ["value", "label", "next"]);
        let names: Vec<_> = serializer.copy_fields().map(|field| field.name()).collect();
        assert_eq!(names, ["value", "label", "next", "scratch"]);

        serializer.update_config(FieldSerializerConfig {
            copy_transient: false,
            ..Default::default()
        });
        let names: Vec<_> = serializer.copy_fields().map(|field| field.name()).collect();
        assert_eq!(names, ["value", "label", "next"]);
    }

    #[test]
    fn generics_resolve_per_call() {
        let codec = generic_codec(FieldSerializerConfig::default());

        let boxed = new_object(&codec, BOX, &[("value", 5.into())]);
        // marker, presence, zigzag 5
        assert_eq!(write_generic(&codec, &boxed, &[Type::Int]).unwrap(), [1, 1, 10]);
        // no arguments: the value carries its type tag
        assert_eq!(write_generic(&codec, &boxed, &[]).unwrap(), [1, 2, 10]);

        boxed.set("value", "hi").unwrap();
        let bytes = write_generic(&codec, &boxed, &[Type::Str]).unwrap();
        assert_eq!(bytes, [1, 1, 2, b'h', b'i']);
        let back = read_generic(&codec, &bytes, BOX, &[Type::Str]);
        assert!(graph_eq(&Value::Object(boxed.clone()), &back));

        let err = write_generic(&codec, &boxed, &[Type::Int]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encode);
        assert!(matches!(err.root(), CodecError::Encode(EncodeError::TypeMismatch { .. })));

        boxed.set("value", 5).unwrap();
        assert_eq!(write_generic(&codec, &boxed, &[Type::Int]).unwrap(), [1, 1, 10]);
    }

    #[test]
    fn nested_generics_pass_arguments_down() {
        let codec = generic_codec(FieldSerializerConfig::default());

        let inner = new_object(&codec, BOX, &[("value", Value::Long(7))]);
        let holder = new_object(&codec, HOLDER, &[("inner", inner.into())]);

        let bytes = write_generic(&codec, &holder, &[Type::Long]).unwrap();
        // holder marker, box marker, presence, zigzag 7
        assert_eq!(bytes, [1, 1, 1, 14]);

        let back = read_generic(&codec, &bytes, HOLDER, &[Type::Long]);
        assert!(graph_eq(&Value::Object(holder), &back));
    }

    #[test]
    fn generics_disabled_writes_type_tags() {
        let codec = generic_codec(FieldSerializerConfig {
            optimized_generics: false,
            ..Default::default()
        });

        let boxed = new_object(&codec, BOX, &[("value", 5.into())]);
        let bytes = write_generic(&codec, &boxed, &[Type::Int]).unwrap();
        assert_eq!(bytes, [1, 2, 10]);
        let back = read_generic(&codec, &bytes, BOX, &[Type::Int]);
        assert!(graph_eq(&Value::Object(boxed), &back));
    }

    #[test]
    fn argument_count_is_checked() {
        let codec = generic_codec(FieldSerializerConfig::default());
        let boxed = new_object(&codec, BOX, &[]);

        let err = write_generic(&codec, &boxed, &[Type::Int, Type::Int]).unwrap_err();
        assert_eq!(
            err,
            CodecError::Config(ConfigError::GenericArity {
                class: BOX,
                expected: 1,
                found: 2,
            })
        );
    }

    #[test]
    fn null_contract() {
        let mut codec = Codec::new();
        codec
            .register_class(ClassInfo::new(
                "t::User",
                [
                    FieldInfo::new("name", FieldType::STR).with_attribute(NotNull),
                    FieldInfo::new("email", FieldType::STR),
                ],
            ))
            .unwrap();

        let value = new_object(&codec, ClassId::new("t::User"), &[]);
        let err = codec.write(&Value::Object(value.clone())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encode);
        assert_eq!(
            err.to_string(),
            "field `name` of `t::User`: null value where a non-null value is required"
        );

        value.set("name", "ann").unwrap();
        let back = codec.read(&codec.write(&Value::Object(value)).unwrap()).unwrap();
        assert_eq!(back.as_object().unwrap().get("email").unwrap(), Value::Null);
    }

    #[test]
    fn null_marker_for_non_nullable_field() {
        let mut codec = Codec::new();
        let node = codec.register_class(node_class()).unwrap();
        let bytes = codec.write(&Value::Object(new_object(&codec, NODE, &[]))).unwrap();

        let next = codec.field_serializer_mut(node).unwrap().get_field_mut("next").unwrap();
        next.set_can_be_null(false);
        let err = codec.read(&bytes).unwrap_err();
        assert!(matches!(err.root(), CodecError::Decode(DecodeError::UnexpectedNull)));
    }

    #[test]
    fn value_class_saves_type_tag() {
        let mut codec = Codec::new();
        let cell = codec
            .register_class(ClassInfo::new("t::Cell", [FieldInfo::new("value", FieldType::Dynamic)]))
            .unwrap();
        let value = Value::Object(new_object(&codec, ClassId::new("t::Cell"), &[("value", "x".into())]));

        let tagged = codec.write(&value).unwrap();
        let field = codec.field_serializer_mut(cell).unwrap().get_field_mut("value").unwrap();
        field.set_class(Some(Type::Str));
        field.set_can_be_null(false);
        let untagged = codec.write(&value).unwrap();

        assert_eq!(untagged.len() + 1, tagged.len());
        assert!(graph_eq(&value, &codec.read(&untagged).unwrap()));
    }

    #[test]
    fn bound_serializer_is_used() {
        let mut codec = Codec::new();
        codec
            .register_class(ClassInfo::new(
                "t::Tag",
                [FieldInfo::new("name", FieldType::STR).with_attribute(Bind(upper))],
            ))
            .unwrap();

        let value = new_object(&codec, ClassId::new("t::Tag"), &[("name", "loud".into())]);
        let back = codec.read(&codec.write(&Value::Object(value)).unwrap()).unwrap();
        assert_eq!(back.as_object().unwrap().get("name").unwrap(), Value::from("LOUD"));
    }

    #[test]
    fn optional_fields_follow_context() {
        let mut codec = Codec::new();
        let record = codec
            .register_class(ClassInfo::new(
                "t::Record",
                [
                    FieldInfo::new("id", FieldType::LONG),
                    FieldInfo::new("audit", FieldType::STR).with_attribute(Optional("audit")),
                ],
            ))
            .unwrap();
        assert!(codec.field_serializer_mut(record).unwrap().get_field("audit").is_err());

        codec.set_context(Context::new().with("audit", "on"));
        assert!(codec.field_serializer_mut(record).unwrap().get_field("audit").is_ok());

        codec.set_context(Context::new());
        assert!(codec.field_serializer_mut(record).unwrap().get_field("audit").is_err());
    }

    #[test]
    fn removed_fields_are_skipped() {
        let mut codec = Codec::new();
        let node = codec.register_class(node_class()).unwrap();
        let value = Value::Object(new_object(&codec, NODE, &[("value", 3.into()), ("label", "gone".into())]));
        let full = codec.write(&value).unwrap();

        let serializer = codec.field_serializer_mut(node).unwrap();
        assert_eq!(serializer.remove_field("label").unwrap().name(), "label");
        assert_eq!(
            serializer.remove_field("label").unwrap_err(),
            ConfigError::UnknownField {
                class: NODE,
                field: String::from("label"),
            }
        );
        assert_eq!(
            serializer.get_field("missing").unwrap_err().to_string(),
            "field `missing` not found in `t::Node`"
        );

        let trimmed = codec.write(&value).unwrap();
        assert!(trimmed.len() < full.len());
        let back = codec.read(&trimmed).unwrap();
        assert_eq!(back.as_object().unwrap().get("label").unwrap(), Value::Null);
        assert_eq!(back.as_object().unwrap().get("value").unwrap(), Value::Int(3));
    }

    struct Audited;

    impl FieldSerializerHooks for Audited {
        fn initialize_cached_fields(&self, fields: &mut CachedFields) {
            fields.retain(|field| field.name() != "label");
        }
    }

    #[test]
    fn hooks_adjust_the_table_on_every_rebuild() {
        let mut codec = Codec::new();
        let node = codec
            .register_class_with(node_class(), |codec, class| {
                FieldSerializer::with_hooks(codec, class, FieldSerializerConfig::default(), Audited)
            })
            .unwrap();

        let serializer = codec.serializer_mut::<FieldSerializer<Audited>>(node.into()).unwrap();
        assert!(serializer.get_field("label").is_err());
        serializer.update_config(FieldSerializerConfig::default());
        assert!(serializer.get_field("label").is_err());
        assert_eq!(serializer.fields().count(), 2);

        assert!(codec.field_serializer_mut(node).is_err());
    }

    #[test]
    fn default_construction_is_required_to_read() {
        let mut codec = Codec::new();
        codec
            .register_class(
                ClassInfo::new("t::Handle", [FieldInfo::new("fd", FieldType::INT)])
                    .without_default_constructor(),
            )
            .unwrap();

        let class = codec.class(ClassId::new("t::Handle")).unwrap().clone();
        let value = Value::from(Object::new(class));
        let bytes = codec.write(&value).unwrap();
        assert_eq!(codec.read(&bytes).unwrap_err().kind(), ErrorKind::Construction);
        assert_eq!(codec.copy(&value).unwrap_err().kind(), ErrorKind::Construction);
    }

    #[test]
    fn wrong_instance_is_rejected() {
        let mut codec = Codec::new();
        codec.register_class(node_class()).unwrap();
        let boxed = codec
            .register_class(ClassInfo::new("t::Box", [FieldInfo::new("value", FieldType::Dynamic)]))
            .unwrap();

        let node = Value::Object(new_object(&codec, NODE, &[]));
        let serializer = codec.serializer(boxed.into()).unwrap();
        let mut out = Output::new();
        let mut ctx = WriteContext::new(&codec, &mut out);

        let err = serializer.write(&mut ctx, &node).unwrap_err();
        assert_eq!(
            err,
            CodecError::Encode(EncodeError::TypeMismatch {
                expected: BOX.into(),
                found: NODE.into(),
            })
        );
        let err = serializer.write(&mut ctx, &Value::Null).unwrap_err();
        assert_eq!(err, CodecError::Encode(EncodeError::NullValue));
    }

    #[test]
    fn failed_write_consumes_type_arguments() {
        let codec = generic_codec(FieldSerializerConfig::default());
        let boxed = new_object(&codec, BOX, &[("value", 5.into())]);
        let holder = Value::Object(new_object(&codec, HOLDER, &[]));

        let serializer = codec.serializer(BOX.into()).unwrap();
        serializer.set_generics(&[Type::Str.into()]);
        let mut out = Output::new();
        assert!(serializer.write(&mut WriteContext::new(&codec, &mut out), &holder).is_err());

        assert_eq!(write_generic(&codec, &boxed, &[]).unwrap(), [1, 2, 10]);
    }

    #[test]
    fn cycle_without_references_is_an_error() {
        let mut codec = Codec::new();
        codec.register_class(node_class()).unwrap();
        codec.set_references(false);

        let a = new_object(&codec, NODE, &[("value", 1.into())]);
        let b = new_object(&codec, NODE, &[("value", 2.into())]);
        a.set("next", b.clone()).unwrap();
        // a path through the same object twice is fine, only a loop is not
        assert!(codec.write(&Value::Object(a.clone())).is_ok());

        b.set("next", a.clone()).unwrap();
        let err = codec.write(&Value::Object(a.clone())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encode);
        assert_eq!(err.root(), &CodecError::Encode(EncodeError::Cycle(NODE)));

        b.set("next", Value::Null).unwrap();
    }

    #[test]
    fn references_off_duplicates_shared_objects() {
        let mut codec = Codec::new();
        codec
            .register_class(ClassInfo::new(
                "t::Pair",
                [
                    FieldInfo::new("left", FieldType::class("t::Node")),
                    FieldInfo::new("right", FieldType::class("t::Node")),
                ],
            ))
            .unwrap();
        codec.register_class(node_class()).unwrap();
        codec.set_references(false);

        let shared = new_object(&codec, NODE, &[("value", 7.into())]);
        let pair = new_object(
            &codec,
            ClassId::new("t::Pair"),
            &[("left", shared.clone().into()), ("right", shared.into())],
        );

        let bytes = codec.write(&Value::Object(pair)).unwrap();
        // tag, then per node: presence, zigzag 7, null label, null next
        assert_eq!(bytes, [7, 1, 14, 0, 0, 1, 14, 0, 0]);

        let back = codec.read(&bytes).unwrap();
        let back = back.as_object().unwrap();
        let left = back.get("left").unwrap();
        let right = back.get("right").unwrap();
        assert_ne!(left, right);
        assert_eq!(left.as_object().unwrap().get("value").unwrap(), Value::Int(7));
        assert_eq!(right.as_object().unwrap().get("value").unwrap(), Value::Int(7));
    }

    #[test]
    fn optimize_positive_drops_zigzag() {
        let mut codec = Codec::new();
        let counter = codec
            .register_class(ClassInfo::new("t::Counter", [FieldInfo::new("hits", FieldType::INT)]))
            .unwrap();
        let value = Value::Object(new_object(&codec, ClassId::new("t::Counter"), &[("hits", 300.into())]));

        // tag, marker, zigzag 600
        assert_eq!(codec.write(&value).unwrap(), [7, 1, 0xD8, 0x04]);

        let field = codec.field_serializer_mut(counter).unwrap().get_field_mut("hits").unwrap();
        field.set_optimize_positive(true);
        let bytes = codec.write(&value).unwrap();
        assert_eq!(bytes, [7, 1, 0xAC, 0x02]);

        let back = codec.read(&bytes).unwrap();
        assert_eq!(back.as_object().unwrap().get("hits").unwrap(), Value::Int(300));
    }

    #[test]
    fn copy_of_object_needs_support() {
        let mut codec = Codec::new();
        codec.register_class(node_class()).unwrap();
        codec.register(NODE.into(), Upper);

        let node = Value::Object(new_object(&codec, NODE, &[]));
        assert_eq!(
            codec.copy(&node).unwrap_err(),
            CodecError::Config(ConfigError::CopyUnsupported(NODE.into()))
        );
        assert_eq!(codec.copy(&Value::from("same")).unwrap(), Value::from("same"));
    }
}
