use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::Deref;

use crate::access::{AccessError, FieldAccessor};
use crate::info::{ClassId, ClassInfo, Type};
use crate::object::Value;

// -----------------------------------------------------------------------------
// Object

/// An instance of a registered class.
///
/// Holds one [`Value`] per declared field, in declaration order. Slots are
/// interior-mutable so that a shared [`ObjectRef`] can be populated after it
/// was handed out, which is how cyclic graphs are rebuilt.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use oc_reflect::info::{ClassInfo, FieldInfo, FieldType};
/// use oc_reflect::object::{Object, Value};
///
/// let class = Arc::new(ClassInfo::new("demo::Pair", [
///     FieldInfo::new("left", FieldType::INT),
///     FieldInfo::new("right", FieldType::STR),
/// ]));
///
/// let pair = Object::new(class);
/// assert_eq!(pair.get("left").unwrap(), Value::Int(0));
/// assert!(pair.get("right").unwrap().is_null());
///
/// pair.set("right", "r").unwrap();
/// assert_eq!(pair.get("right").unwrap().as_str(), Some("r"));
/// ```
pub struct Object {
    class: Arc<ClassInfo>,
    fields: RefCell<Box<[Value]>>,
}

impl Object {
    /// Creates an instance with every field at its initial value.
    pub fn new(class: Arc<ClassInfo>) -> Self {
        let fields = class
            .fields()
            .iter()
            .map(|field| Value::initial(field.ty()))
            .collect();
        Self {
            class,
            fields: RefCell::new(fields),
        }
    }

    /// Creates an instance from field values in declaration order.
    pub fn from_values(
        class: Arc<ClassInfo>,
        values: impl IntoIterator<Item = Value>,
    ) -> Result<Self, AccessError> {
        let fields: Box<[Value]> = values.into_iter().collect();
        if fields.len() != class.field_len() {
            return Err(AccessError::FieldCount {
                class: class.id(),
                expected: class.field_len(),
                found: fields.len(),
            });
        }
        Ok(Self {
            class,
            fields: RefCell::new(fields),
        })
    }

    /// Returns the class table.
    #[inline]
    pub fn class(&self) -> &Arc<ClassInfo> {
        &self.class
    }

    /// Returns the class identity.
    #[inline]
    pub fn class_id(&self) -> ClassId {
        self.class.id()
    }

    /// Returns the class as a [`Type`].
    #[inline]
    pub fn ty(&self) -> Type {
        self.class.ty()
    }

    /// Returns a clone of the named field's value.
    pub fn get(&self, name: &str) -> Result<Value, AccessError> {
        Ok(FieldAccessor::of(&self.class, name)?.get(self)?.clone())
    }

    /// Replaces the named field's value, returning the previous one.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<Value, AccessError> {
        FieldAccessor::of(&self.class, name)?.set(self, value.into())
    }

    /// Returns a snapshot of all field values in declaration order.
    pub fn values(&self) -> Result<Vec<Value>, AccessError> {
        match self.fields.try_borrow() {
            Ok(fields) => Ok(fields.to_vec()),
            Err(_) => Err(AccessError::Busy {
                class: self.class_id(),
            }),
        }
    }

    #[inline]
    pub(crate) fn slots(&self) -> &RefCell<Box<[Value]>> {
        &self.fields
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(self.class.name());
        match self.fields.try_borrow() {
            Ok(fields) => {
                for (info, value) in self.class.fields().iter().zip(fields.iter()) {
                    out.field(info.name(), value);
                }
            }
            Err(_) => {
                out.field("fields", &"<busy>");
            }
        }
        out.finish()
    }
}

// -----------------------------------------------------------------------------
// ObjectRef

/// A shared handle to an [`Object`].
///
/// Equality and hashing use the pointer, so two handles are equal exactly
/// when they refer to the same instance.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use oc_reflect::info::{ClassInfo, FieldInfo, FieldType};
/// use oc_reflect::object::{Object, ObjectRef};
///
/// let class = Arc::new(ClassInfo::new("demo::Node", [
///     FieldInfo::new("next", FieldType::class("demo::Node")),
/// ]));
///
/// let node = ObjectRef::new(Object::new(class));
/// node.set("next", node.clone()).unwrap();
///
/// let next = node.get("next").unwrap();
/// assert!(next.as_object().unwrap().ptr_eq(&node));
/// ```
#[derive(Clone)]
pub struct ObjectRef(Rc<Object>);

impl ObjectRef {
    #[inline]
    pub fn new(object: Object) -> Self {
        Self(Rc::new(object))
    }

    /// Returns `true` if both handles refer to the same instance.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Returns the instance address, stable while any handle is alive.
    #[inline]
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>() as usize
    }
}

impl Deref for ObjectRef {
    type Target = Object;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PartialEq for ObjectRef {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ObjectRef {}

impl Hash for ObjectRef {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:#x}", self.class().name(), self.addr())
    }
}
