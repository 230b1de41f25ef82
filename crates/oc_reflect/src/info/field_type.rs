use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::info::{ClassId, Type};

// -----------------------------------------------------------------------------
// ConcreteType

/// A fully known type together with its (possibly empty) type arguments.
///
/// This is what a declared [`FieldType`] becomes once every type variable
/// it mentions has been substituted.
///
/// # Examples
///
/// ```
/// use oc_reflect::info::{ConcreteType, Type};
///
/// let boxed_int = ConcreteType::with_args(Type::class("demo::Box"), [Type::Int.into()]);
/// assert_eq!(boxed_int.ty(), Type::class("demo::Box"));
/// assert_eq!(boxed_int.args().len(), 1);
/// assert_eq!(boxed_int.to_string(), "demo::Box<i32>");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ConcreteType {
    ty: Type,
    args: Box<[ConcreteType]>,
}

impl ConcreteType {
    /// A type without type arguments.
    #[inline]
    pub fn new(ty: Type) -> Self {
        Self {
            ty,
            args: Box::new([]),
        }
    }

    /// A generic class instantiated with `args`.
    pub fn with_args(ty: Type, args: impl IntoIterator<Item = ConcreteType>) -> Self {
        Self {
            ty,
            args: args.into_iter().collect(),
        }
    }

    /// Returns the raw type.
    #[inline]
    pub const fn ty(&self) -> Type {
        self.ty
    }

    /// Returns the type arguments, empty for non-generic uses.
    #[inline]
    pub fn args(&self) -> &[ConcreteType] {
        &self.args
    }
}

impl From<Type> for ConcreteType {
    #[inline]
    fn from(value: Type) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for ConcreteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ty.path())?;
        if let Some((first, rest)) = self.args.split_first() {
            write!(f, "<{first}")?;
            for arg in rest {
                write!(f, ", {arg}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ConcreteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

// -----------------------------------------------------------------------------
// FieldType

/// The type a field is declared with.
///
/// - `Fixed`: a known type; values are written without a type tag.
/// - `Generic`: a generic class applied to declared arguments, which may
///   themselves mention type variables of the declaring class.
/// - `Param`: a type variable of the declaring class, e.g. `T`.
/// - `Dynamic`: any runtime type; every value carries a type tag.
///
/// # Examples
///
/// ```
/// use oc_reflect::info::{ConcreteType, FieldType, Type};
///
/// let declared = FieldType::generic("demo::Box", [FieldType::param("T")]);
/// assert!(declared.mentions_params());
///
/// let resolved = declared
///     .resolve(&|name| (name == "T").then(|| ConcreteType::new(Type::Str)))
///     .unwrap();
/// assert_eq!(resolved.to_string(), "demo::Box<String>");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Fixed(Type),
    Generic {
        class: ClassId,
        args: Box<[FieldType]>,
    },
    Param(&'static str),
    Dynamic,
}

impl FieldType {
    pub const BOOL: Self = Self::Fixed(Type::Bool);
    pub const INT: Self = Self::Fixed(Type::Int);
    pub const LONG: Self = Self::Fixed(Type::Long);
    pub const FLOAT: Self = Self::Fixed(Type::Float);
    pub const DOUBLE: Self = Self::Fixed(Type::Double);
    pub const STR: Self = Self::Fixed(Type::Str);

    /// A field holding instances of exactly the class at `path`.
    #[inline]
    pub const fn class(path: &'static str) -> Self {
        Self::Fixed(Type::class(path))
    }

    /// A field holding a generic class applied to `args`.
    pub fn generic(path: &'static str, args: impl IntoIterator<Item = FieldType>) -> Self {
        Self::Generic {
            class: ClassId::new(path),
            args: args.into_iter().collect(),
        }
    }

    /// A field declared with the type variable `name`.
    #[inline]
    pub const fn param(name: &'static str) -> Self {
        Self::Param(name)
    }

    /// Returns `true` if the declared type is a primitive value type.
    #[inline]
    pub const fn is_primitive(&self) -> bool {
        match self {
            Self::Fixed(ty) => ty.is_primitive(),
            _ => false,
        }
    }

    /// Returns `true` if a type variable appears anywhere in the declaration.
    pub fn mentions_params(&self) -> bool {
        match self {
            Self::Param(_) => true,
            Self::Generic { args, .. } => args.iter().any(Self::mentions_params),
            Self::Fixed(_) | Self::Dynamic => false,
        }
    }

    /// Collects the names of every type variable in the declaration.
    pub fn params(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        self.collect_params(&mut out);
        out
    }

    fn collect_params(&self, out: &mut Vec<&'static str>) {
        match self {
            Self::Param(name) => out.push(*name),
            Self::Generic { args, .. } => args.iter().for_each(|arg| arg.collect_params(out)),
            Self::Fixed(_) | Self::Dynamic => {}
        }
    }

    /// Returns the raw type when it is known without any substitution.
    #[inline]
    pub const fn raw_type(&self) -> Option<Type> {
        match self {
            Self::Fixed(ty) => Some(*ty),
            Self::Generic { class, .. } => Some(Type::Class(*class)),
            Self::Param(_) | Self::Dynamic => None,
        }
    }

    /// Substitutes type variables through `lookup`.
    ///
    /// Returns `None` when the raw type stays unknown (`Dynamic`, or a
    /// type variable `lookup` can not bind). A generic class whose arguments
    /// can not all be bound resolves to its raw class without arguments.
    pub fn resolve<F>(&self, lookup: &F) -> Option<ConcreteType>
    where
        F: Fn(&str) -> Option<ConcreteType>,
    {
        match self {
            Self::Fixed(ty) => Some(ConcreteType::new(*ty)),
            Self::Param(name) => lookup(*name),
            Self::Dynamic => None,
            Self::Generic { class, args } => {
                let resolved = args
                    .iter()
                    .map(|arg| arg.resolve(lookup))
                    .collect::<Option<Box<[ConcreteType]>>>();
                Some(ConcreteType {
                    ty: Type::Class(*class),
                    args: resolved.unwrap_or_default(),
                })
            }
        }
    }
}

impl From<Type> for FieldType {
    #[inline]
    fn from(value: Type) -> Self {
        Self::Fixed(value)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(ty) => f.write_str(ty.path()),
            Self::Param(name) => f.write_str(name),
            Self::Dynamic => f.write_str("dyn"),
            Self::Generic { class, args } => {
                write!(f, "{class}<")?;
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(">")
            }
        }
    }
}

impl fmt::Debug for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
