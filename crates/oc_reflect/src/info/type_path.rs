use core::fmt;

// -----------------------------------------------------------------------------
// ClassId

/// Identity of a registered class: its full type path.
///
/// Two classes are the same class exactly when their paths are equal.
///
/// # Examples
///
/// ```
/// use oc_reflect::info::ClassId;
///
/// let id = ClassId::new("my_crate::graph::Node");
/// assert_eq!(id.path(), "my_crate::graph::Node");
/// assert_eq!(id.name(), "Node");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(&'static str);

impl ClassId {
    /// Creates a class identity from its full type path, without prefix `::`.
    #[inline]
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    /// Returns the full type path.
    #[inline]
    pub const fn path(&self) -> &'static str {
        self.0
    }

    /// Returns the path segment after the last `::`.
    pub fn name(&self) -> &'static str {
        let path = self.0;
        match path.rfind("::") {
            Some(pos) => &path[pos + 2..],
            None => path,
        }
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.0, f)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

// -----------------------------------------------------------------------------
// Type

/// A concrete runtime type: one of the built-in value types or a class.
///
/// Values of [`Type::Class`] are objects and therefore reference-tracked;
/// every other type is a plain value.
///
/// # Examples
///
/// ```
/// use oc_reflect::info::Type;
///
/// assert_eq!(Type::Int.path(), "i32");
/// assert!(Type::Long.is_integer());
/// assert!(Type::class("demo::Node").is_reference());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Bool,
    Int,
    Long,
    Float,
    Double,
    Str,
    Class(ClassId),
}

impl Type {
    /// Shorthand for `Type::Class(ClassId::new(path))`.
    #[inline]
    pub const fn class(path: &'static str) -> Self {
        Self::Class(ClassId::new(path))
    }

    /// Returns the full type path.
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "i32",
            Self::Long => "i64",
            Self::Float => "f32",
            Self::Double => "f64",
            Self::Str => "String",
            Self::Class(id) => id.path(),
        }
    }

    /// Returns the short type name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Class(id) => id.name(),
            other => other.path(),
        }
    }

    /// Returns `true` for `bool`, the integer and the floating point types.
    ///
    /// A field declared with a primitive type can not hold null by default.
    #[inline]
    pub const fn is_primitive(&self) -> bool {
        !matches!(self, Self::Str | Self::Class(_))
    }

    /// Returns `true` for `i32` and `i64`.
    #[inline]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Self::Int | Self::Long)
    }

    /// Returns `true` if values of this type are objects.
    #[inline]
    pub const fn is_reference(&self) -> bool {
        matches!(self, Self::Class(_))
    }

    /// Returns the class identity, if this is a class type.
    #[inline]
    pub const fn as_class(&self) -> Option<ClassId> {
        match self {
            Self::Class(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<ClassId> for Type {
    #[inline]
    fn from(value: ClassId) -> Self {
        Self::Class(value)
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::{ClassId, Type};

    #[test]
    fn class_name_without_module() {
        assert_eq!(ClassId::new("Plain").name(), "Plain");
        assert_eq!(ClassId::new("a::b::Leaf").name(), "Leaf");
        assert_eq!(Type::class("a::b::Leaf").name(), "Leaf");
        assert_eq!(Type::Str.name(), "String");
    }

    #[test]
    fn kinds() {
        assert!(Type::Bool.is_primitive());
        assert!(!Type::Str.is_primitive());
        assert!(!Type::Double.is_integer());
        assert_eq!(Type::class("x::Y").as_class(), Some(ClassId::new("x::Y")));
        assert_eq!(Type::Int.as_class(), None);
    }
}
