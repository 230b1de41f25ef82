//! Type-variable bindings of the generic objects currently being
//! written or read.
//!
//! Each pass owns a [`GenericsResolver`]: a stack of [`GenericsScope`]s, one
//! per enclosing generic object that was given type arguments. Lookups
//! search from the innermost scope outwards, so an inner binding shadows an
//! outer one of the same name and unbound names are inherited.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;
use core::ops::{Deref, DerefMut};

use oc_reflect::info::{ClassId, ConcreteType, Generics};

use crate::ConfigError;

// -----------------------------------------------------------------------------
// GenericsScope

/// The bindings of one generic instantiation, in parameter order.
///
/// # Examples
///
/// ```
/// use oc_codec::generics::GenericsScope;
/// use oc_reflect::info::{ClassId, ConcreteType, Generics, Type};
///
/// let generics = Generics::from_names(["K", "V"]);
/// let scope = GenericsScope::new(
///     ClassId::new("demo::Entry"),
///     &generics,
///     &[Type::Str.into(), Type::Int.into()],
/// )
/// .unwrap();
///
/// assert_eq!(scope.get("V"), Some(&ConcreteType::new(Type::Int)));
/// assert_eq!(scope.to_string(), "demo::Entry<K = String, V = i32>");
///
/// let err = GenericsScope::new(ClassId::new("demo::Entry"), &generics, &[]);
/// assert!(err.is_err());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct GenericsScope {
    class: ClassId,
    bindings: Box<[(&'static str, ConcreteType)]>,
}

impl GenericsScope {
    /// Zips the declared parameters with `args`, positionally.
    ///
    /// Fails with [`ConfigError::GenericArity`] if the counts differ.
    pub fn new(
        class: ClassId,
        generics: &Generics,
        args: &[ConcreteType],
    ) -> Result<Self, ConfigError> {
        if generics.len() != args.len() {
            return Err(ConfigError::GenericArity {
                class,
                expected: generics.len(),
                found: args.len(),
            });
        }
        let bindings = generics
            .iter()
            .zip(args)
            .map(|(param, arg)| (param.name(), arg.clone()))
            .collect();
        Ok(Self { class, bindings })
    }

    /// Returns the class the bindings belong to.
    #[inline]
    pub const fn class(&self) -> ClassId {
        self.class
    }

    /// Returns the type bound to `name`.
    pub fn get(&self, name: &str) -> Option<&ConcreteType> {
        self.bindings
            .iter()
            .find(|(param, _)| *param == name)
            .map(|(_, ty)| ty)
    }

    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&'static str, &ConcreteType)> {
        self.bindings.iter().map(|(name, ty)| (*name, ty))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl fmt::Display for GenericsScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<", self.class)?;
        for (index, (name, ty)) in self.bindings.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name} = {ty}")?;
        }
        f.write_str(">")
    }
}

impl fmt::Debug for GenericsScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

// -----------------------------------------------------------------------------
// GenericsResolver

/// The scope stack of one pass.
#[derive(Default, Debug)]
pub struct GenericsResolver {
    scopes: Vec<Rc<GenericsScope>>,
}

impl GenericsResolver {
    #[inline]
    pub const fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    /// Returns the type bound to `name` by the innermost scope that has it,
    /// whatever class declared it.
    ///
    /// Meant for custom serializers that share parameter names with their
    /// enclosing objects. [`FieldSerializer`](crate::serializer::field::FieldSerializer)
    /// does not use it; its fields look up [`resolve_in`](Self::resolve_in).
    pub fn resolve(&self, name: &str) -> Option<&ConcreteType> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Like [`resolve`](Self::resolve), but only consults scopes of `class`.
    ///
    /// Type variables belong to the class declaring them, so this is the
    /// lookup for a field whose object was given no arguments of its own.
    pub fn resolve_in(&self, class: ClassId, name: &str) -> Option<&ConcreteType> {
        self.scopes
            .iter()
            .rev()
            .filter(|scope| scope.class() == class)
            .find_map(|scope| scope.get(name))
    }

    /// Returns the innermost scope.
    #[inline]
    pub fn current(&self) -> Option<&GenericsScope> {
        self.scopes.last().map(|scope| &**scope)
    }

    /// Returns the number of active scopes.
    #[inline]
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    #[inline]
    fn push(&mut self, scope: Rc<GenericsScope>) {
        self.scopes.push(scope);
    }

    #[inline]
    fn pop(&mut self) {
        self.scopes.pop();
    }
}

// -----------------------------------------------------------------------------
// ScopeGuard

/// A pass context that owns a [`GenericsResolver`].
pub trait GenericsStack {
    fn generics(&self) -> &GenericsResolver;
    fn generics_mut(&mut self) -> &mut GenericsResolver;
}

/// Keeps a scope pushed while it is alive.
///
/// Derefs to the context, so the guarded pass keeps using it as usual.
/// Dropping the guard pops the scope, on every exit path.
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
/// use oc_codec::generics::{GenericsResolver, GenericsScope, GenericsStack, ScopeGuard};
/// use oc_reflect::info::{ClassId, Generics, Type};
///
/// #[derive(Default)]
/// struct Pass(GenericsResolver);
///
/// impl GenericsStack for Pass {
///     fn generics(&self) -> &GenericsResolver { &self.0 }
///     fn generics_mut(&mut self) -> &mut GenericsResolver { &mut self.0 }
/// }
///
/// let generics = Generics::from_names(["T"]);
/// let scope = GenericsScope::new(ClassId::new("demo::Box"), &generics, &[Type::Int.into()]).unwrap();
///
/// let mut pass = Pass::default();
/// {
///     let guard = ScopeGuard::push(&mut pass, Some(Rc::new(scope)));
///     assert_eq!(guard.generics().depth(), 1);
/// }
/// assert!(pass.generics().is_empty());
/// ```
pub struct ScopeGuard<'c, C: GenericsStack> {
    context: &'c mut C,
    pushed: bool,
}

impl<'c, C: GenericsStack> ScopeGuard<'c, C> {
    /// Pushes `scope` if there is one.
    pub fn push(context: &'c mut C, scope: Option<Rc<GenericsScope>>) -> Self {
        let pushed = match scope {
            Some(scope) => {
                log::trace!("push generics scope {scope}");
                context.generics_mut().push(scope);
                true
            }
            None => false,
        };
        Self { context, pushed }
    }
}

impl<C: GenericsStack> Deref for ScopeGuard<'_, C> {
    type Target = C;

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.context
    }
}

impl<C: GenericsStack> DerefMut for ScopeGuard<'_, C> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.context
    }
}

impl<C: GenericsStack> Drop for ScopeGuard<'_, C> {
    fn drop(&mut self) {
        if self.pushed {
            self.context.generics_mut().pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;

    use oc_reflect::info::{ClassId, ConcreteType, Generics, Type};

    use super::{GenericsResolver, GenericsScope, GenericsStack, ScopeGuard};
    use crate::ConfigError;

    #[derive(Default)]
    struct Pass(GenericsResolver);

    impl GenericsStack for Pass {
        fn generics(&self) -> &GenericsResolver {
            &self.0
        }
        fn generics_mut(&mut self) -> &mut GenericsResolver {
            &mut self.0
        }
    }

    fn scope(class: &'static str, names: &[&'static str], args: &[Type]) -> Rc<GenericsScope> {
        let generics = Generics::from_names(names.iter().copied());
        let args: alloc::vec::Vec<ConcreteType> = args.iter().map(|ty| (*ty).into()).collect();
        Rc::new(GenericsScope::new(ClassId::new(class), &generics, &args).unwrap())
    }

    #[test]
    fn inner_shadows_outer_inherits() {
        let mut pass = Pass::default();
        let mut outer = ScopeGuard::push(&mut pass, Some(scope("t::Outer", &["T", "U"], &[Type::Int, Type::Long])));
        {
            let inner = ScopeGuard::push(&mut *outer, Some(scope("t::Inner", &["T"], &[Type::Str])));
            assert_eq!(inner.generics().resolve("T"), Some(&ConcreteType::new(Type::Str)));
            assert_eq!(inner.generics().resolve("U"), Some(&ConcreteType::new(Type::Long)));
            assert_eq!(inner.generics().resolve("V"), None);
            assert_eq!(
                inner.generics().resolve_in(ClassId::new("t::Outer"), "T"),
                Some(&ConcreteType::new(Type::Int))
            );
            assert_eq!(inner.generics().resolve_in(ClassId::new("t::Inner"), "U"), None);
            assert_eq!(inner.generics().current().unwrap().class(), ClassId::new("t::Inner"));
        }
        assert_eq!(outer.generics().resolve("T"), Some(&ConcreteType::new(Type::Int)));
        drop(outer);
        assert_eq!(pass.generics().depth(), 0);
    }

    #[test]
    fn pops_on_early_return() {
        fn fails(pass: &mut Pass) -> Result<(), ConfigError> {
            let guard = ScopeGuard::push(pass, Some(scope("t::Box", &["T"], &[Type::Int])));
            if guard.generics().depth() == 1 {
                return Err(ConfigError::UnregisteredType(Type::Bool));
            }
            Ok(())
        }

        let mut pass = Pass::default();
        assert!(fails(&mut pass).is_err());
        assert!(pass.generics().is_empty());
    }

    #[test]
    fn absent_scope_is_not_pushed() {
        let mut pass = Pass::default();
        let guard = ScopeGuard::push(&mut pass, None);
        assert!(guard.generics().is_empty());
    }

    #[test]
    fn arity_mismatch() {
        let generics = Generics::from_names(["T"]);
        assert_eq!(
            GenericsScope::new(ClassId::new("t::Box"), &generics, &[]),
            Err(ConfigError::GenericArity {
                class: ClassId::new("t::Box"),
                expected: 1,
                found: 0,
            })
        );
    }
}
