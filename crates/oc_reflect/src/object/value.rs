use alloc::string::String;
use core::fmt;

use crate::info::{FieldType, Type};
use crate::object::{Object, ObjectRef};

// -----------------------------------------------------------------------------
// Value

/// A field value: null, a plain value, or a shared object handle.
///
/// Equality is shallow: two `Object` values are equal when they point to
/// the same instance. Use [`graph_eq`](crate::object::graph_eq) to compare
/// whole graphs by structure.
///
/// # Examples
///
/// ```
/// use oc_reflect::info::{FieldType, Type};
/// use oc_reflect::object::Value;
///
/// assert_eq!(Value::from(7).ty(), Some(Type::Int));
/// assert_eq!(Value::from("x").as_str(), Some("x"));
/// assert!(Value::initial(&FieldType::STR).is_null());
/// assert_eq!(Value::initial(&FieldType::LONG), Value::Long(0));
/// ```
#[derive(Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(String),
    Object(ObjectRef),
}

impl Value {
    /// The value a freshly created instance holds for a field of type `ty`.
    ///
    /// `false` and zero for primitives, null for everything else.
    pub fn initial(ty: &FieldType) -> Self {
        match ty {
            FieldType::Fixed(Type::Bool) => Self::Bool(false),
            FieldType::Fixed(Type::Int) => Self::Int(0),
            FieldType::Fixed(Type::Long) => Self::Long(0),
            FieldType::Fixed(Type::Float) => Self::Float(0.0),
            FieldType::Fixed(Type::Double) => Self::Double(0.0),
            _ => Self::Null,
        }
    }

    /// Returns `true` for [`Value::Null`].
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the runtime type, or `None` for null.
    pub fn ty(&self) -> Option<Type> {
        Some(match self {
            Self::Null => return None,
            Self::Bool(_) => Type::Bool,
            Self::Int(_) => Type::Int,
            Self::Long(_) => Type::Long,
            Self::Float(_) => Type::Float,
            Self::Double(_) => Type::Double,
            Self::Str(_) => Type::Str,
            Self::Object(object) => object.ty(),
        })
    }

    #[inline]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_long(&self) -> Option<i64> {
        match self {
            Self::Long(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => fmt::Debug::fmt(v, f),
            Self::Int(v) => fmt::Debug::fmt(v, f),
            Self::Long(v) => write!(f, "{v}i64"),
            Self::Float(v) => write!(f, "{v:?}f32"),
            Self::Double(v) => fmt::Debug::fmt(v, f),
            Self::Str(v) => fmt::Debug::fmt(v, f),
            Self::Object(v) => fmt::Debug::fmt(v, f),
        }
    }
}

// -----------------------------------------------------------------------------
// Conversions

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    String => Str,
    ObjectRef => Object,
}

impl From<Object> for Value {
    #[inline]
    fn from(value: Object) -> Self {
        Self::Object(ObjectRef::new(value))
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Self::Str(String::from(value))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    #[inline]
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
