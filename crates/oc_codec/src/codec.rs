use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use oc_reflect::info::{ClassId, ClassInfo, ConcreteType, Type};
use oc_reflect::object::{Object, Value};
use oc_reflect::registry::ClassRegistry;
use oc_utils::hash::HashMap;

use crate::io::{Input, Output};
use crate::serializer::Serializer;
use crate::serializer::builtin;
use crate::serializer::field::{FieldSerializer, FieldSerializerConfig};
use crate::{CodecError, ConfigError, Context, CopyContext, EncodeError, ReadContext, WriteContext};

// -----------------------------------------------------------------------------
// Registration

/// A registered type: its numeric id and its serializer.
pub struct Registration {
    ty: Type,
    id: u32,
    serializer: Box<dyn Serializer>,
}

impl Registration {
    #[inline]
    pub fn ty(&self) -> Type {
        self.ty
    }

    /// Returns the numeric id; the type tag on the wire is `id + 1`.
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn serializer(&self) -> &dyn Serializer {
        &*self.serializer
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("ty", &self.ty)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Codec

/// The type and serializer registry, and the entry point of every pass.
///
/// A codec starts with the built-in value types registered. Classes are
/// added with [`register_class`](Self::register_class), which installs a
/// [`FieldSerializer`] configured with the codec's
/// [default config](Self::default_config).
///
/// Registration and reconfiguration take `&mut self`; passes take `&self`.
/// A codec and the graphs it handles are confined to one thread.
///
/// # Examples
///
/// ```
/// use oc_codec::Codec;
/// use oc_reflect::info::{ClassInfo, FieldInfo, FieldType};
/// use oc_reflect::object::{Value, graph_eq};
///
/// let mut codec = Codec::new();
/// let point = codec
///     .register_class(ClassInfo::new("demo::Point", [
///         FieldInfo::new("x", FieldType::INT),
///         FieldInfo::new("y", FieldType::INT),
///     ]))
///     .unwrap();
///
/// let p = codec.new_instance(point).unwrap();
/// p.set("x", 3).unwrap();
/// p.set("y", -4).unwrap();
/// let p = Value::from(p);
///
/// let bytes = codec.write(&p).unwrap();
/// let back = codec.read(&bytes).unwrap();
/// assert!(graph_eq(&p, &back));
///
/// let copy = codec.copy(&p).unwrap();
/// assert!(graph_eq(&p, &copy));
/// assert_ne!(p, copy);
/// ```
pub struct Codec {
    classes: ClassRegistry,
    registrations: Vec<Registration>,
    ids: HashMap<Type, u32>,
    context: Context,
    references: bool,
    default_config: FieldSerializerConfig,
}

impl Default for Codec {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Codec {
    /// Creates a codec with the built-in value types registered.
    ///
    /// See [`builtin`](crate::serializer::builtin) for their ids.
    pub fn new() -> Self {
        let mut codec = Self {
            classes: ClassRegistry::new(),
            registrations: Vec::new(),
            ids: HashMap::default(),
            context: Context::new(),
            references: true,
            default_config: FieldSerializerConfig::default(),
        };
        for (ty, serializer) in builtin::defaults() {
            codec.register_boxed(ty, serializer);
        }
        codec
    }

    // -------------------------------------------------------------------------
    // Registration

    /// Registers a class with a [`FieldSerializer`] using the default config.
    ///
    /// Returns the class identity.
    pub fn register_class(&mut self, info: ClassInfo) -> Result<ClassId, CodecError> {
        let config = self.default_config.clone();
        self.register_class_with(info, |codec, class| {
            FieldSerializer::with_config(codec, class, config)
        })
    }

    /// Registers a class with the serializer built by `build`.
    ///
    /// `build` runs after the class table was stored, so it may look the
    /// class up, e.g. to construct a [`FieldSerializer`] with custom hooks.
    pub fn register_class_with<S, F>(&mut self, info: ClassInfo, build: F) -> Result<ClassId, CodecError>
    where
        S: Serializer,
        F: FnOnce(&Self, ClassId) -> Result<S, CodecError>,
    {
        let class = self.classes.register(info)?.id();
        let serializer = build(&*self, class)?;
        self.register(Type::Class(class), serializer);
        Ok(class)
    }

    /// Registers `serializer` for `ty`, returning the type id.
    ///
    /// Re-registering a type replaces its serializer and keeps its id.
    #[inline]
    pub fn register(&mut self, ty: Type, serializer: impl Serializer) -> u32 {
        self.register_boxed(ty, Box::new(serializer))
    }

    fn register_boxed(&mut self, ty: Type, serializer: Box<dyn Serializer>) -> u32 {
        if let Some(&id) = self.ids.get(&ty) {
            log::debug!("replace serializer of `{ty}` (id {id})");
            self.registrations[id as usize].serializer = serializer;
            return id;
        }
        let id = self.registrations.len() as u32;
        log::debug!("register `{ty}` with id {id}");
        self.registrations.push(Registration { ty, id, serializer });
        self.ids.insert(ty, id);
        id
    }

    /// Returns the class registry.
    #[inline]
    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    /// Returns the table of a registered class.
    pub fn class(&self, class: ClassId) -> Result<&Arc<ClassInfo>, ConfigError> {
        self.classes
            .get(class)
            .ok_or(ConfigError::UnregisteredType(Type::Class(class)))
    }

    #[inline]
    pub fn registration(&self, ty: Type) -> Option<&Registration> {
        let id = *self.ids.get(&ty)?;
        self.registrations.get(id as usize)
    }

    #[inline]
    pub fn registration_by_id(&self, id: u32) -> Option<&Registration> {
        self.registrations.get(id as usize)
    }

    /// Returns the serializer registered for `ty`.
    pub fn serializer(&self, ty: Type) -> Result<&dyn Serializer, ConfigError> {
        match self.registration(ty) {
            Some(registration) => Ok(registration.serializer()),
            None => Err(ConfigError::UnregisteredType(ty)),
        }
    }

    /// Returns the serializer registered for `ty` as its concrete type.
    pub fn serializer_mut<S: Serializer>(&mut self, ty: Type) -> Result<&mut S, ConfigError> {
        let id = *self.ids.get(&ty).ok_or(ConfigError::UnregisteredType(ty))?;
        let serializer: &mut dyn Any = &mut *self.registrations[id as usize].serializer;
        serializer
            .downcast_mut::<S>()
            .ok_or(ConfigError::UnexpectedSerializer(ty))
    }

    /// Returns the [`FieldSerializer`] of a class registered with
    /// [`register_class`](Self::register_class).
    #[inline]
    pub fn field_serializer_mut(&mut self, class: ClassId) -> Result<&mut FieldSerializer, ConfigError> {
        self.serializer_mut(Type::Class(class))
    }

    // -------------------------------------------------------------------------
    // Settings

    /// Returns the ambient context.
    #[inline]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Replaces the ambient context and lets every serializer rebuild what
    /// depends on it.
    pub fn set_context(&mut self, context: Context) {
        self.context = context;
        for registration in &mut self.registrations {
            registration.serializer.update_context(&self.context);
        }
    }

    /// Returns `true` if object identity is tracked. Default is `true`.
    #[inline]
    pub fn references(&self) -> bool {
        self.references
    }

    /// Enables or disables object identity tracking.
    ///
    /// Without it, shared objects are written once per reference and
    /// writing a cyclic graph fails with [`EncodeError::Cycle`].
    #[inline]
    pub fn set_references(&mut self, references: bool) {
        self.references = references;
    }

    /// Returns the config given to classes registered from now on.
    #[inline]
    pub fn default_config(&self) -> &FieldSerializerConfig {
        &self.default_config
    }

    #[inline]
    pub fn set_default_config(&mut self, config: FieldSerializerConfig) {
        self.default_config = config;
    }

    /// Creates an instance of `class` with every field at its initial value.
    pub fn new_instance(&self, class: ClassId) -> Result<Object, CodecError> {
        let info = self.class(class)?;
        if !info.is_constructible() {
            return Err(CodecError::Construction {
                class,
                reason: "class has no zero-argument construction".into(),
            });
        }
        Ok(Object::new(info.clone()))
    }

    // -------------------------------------------------------------------------
    // Passes

    /// Writes the type tag of `value`, then `value`.
    pub fn write_class_and_object(&self, output: &mut Output, value: &Value) -> Result<(), CodecError> {
        WriteContext::new(self, output).write_class_and_object(value)
    }

    /// Writes a non-null `value` without type tag.
    ///
    /// The reader must know the type, see [`read_object`](Self::read_object).
    pub fn write_object(&self, output: &mut Output, value: &Value) -> Result<(), CodecError> {
        self.write_generic_object(output, value, &[])
    }

    /// Writes a non-null `value` of a generic class instantiated with `args`.
    pub fn write_generic_object(
        &self,
        output: &mut Output,
        value: &Value,
        args: &[ConcreteType],
    ) -> Result<(), CodecError> {
        let Some(ty) = value.ty() else {
            return Err(EncodeError::NullValue.into());
        };
        let serializer = self.serializer(ty)?;
        WriteContext::new(self, output).write_object(ty, value, serializer, args)
    }

    /// Reads a type tag, then a value of that type.
    pub fn read_class_and_object(&self, input: &mut Input<'_>) -> Result<Value, CodecError> {
        ReadContext::new(self, input).read_class_and_object()
    }

    /// Reads a non-null value of type `ty`.
    pub fn read_object(&self, input: &mut Input<'_>, ty: Type) -> Result<Value, CodecError> {
        self.read_generic_object(input, ty, &[])
    }

    /// Reads a non-null value of a generic class instantiated with `args`.
    pub fn read_generic_object(
        &self,
        input: &mut Input<'_>,
        ty: Type,
        args: &[ConcreteType],
    ) -> Result<Value, CodecError> {
        let serializer = self.serializer(ty)?;
        ReadContext::new(self, input).read_object(ty, serializer, args)
    }

    /// Writes `value` with its type tag into a new buffer.
    pub fn write(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        let mut output = Output::new();
        self.write_class_and_object(&mut output, value)?;
        Ok(output.into_bytes())
    }

    /// Reads one tagged value from `bytes`.
    pub fn read(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        self.read_class_and_object(&mut Input::new(bytes))
    }

    /// Deep-copies `value`, preserving shared references and cycles.
    pub fn copy(&self, value: &Value) -> Result<Value, CodecError> {
        CopyContext::new(self).copy(value)
    }
}
