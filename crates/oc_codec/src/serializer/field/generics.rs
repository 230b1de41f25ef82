use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::Cell;

use oc_reflect::info::{ClassInfo, ConcreteType};

use crate::ConfigError;
use crate::generics::GenericsScope;
use crate::serializer::field::CachedFields;

// -----------------------------------------------------------------------------
// Resolution

/// The bindings of one argument list and what each field resolves to
/// under them.
pub(super) struct Resolution {
    args: Box<[ConcreteType]>,
    pub(super) scope: Rc<GenericsScope>,
    // Indexed like `CachedFields::entries`.
    fields: Box<[Option<ConcreteType>]>,
}

impl Resolution {
    #[inline]
    pub(super) fn field(&self, index: usize) -> Option<&ConcreteType> {
        self.fields.get(index)?.as_ref()
    }
}

// -----------------------------------------------------------------------------
// FieldSerializerGenerics

/// Type arguments handed to a field serializer and the resolution they
/// lead to.
///
/// Arguments are consumed by the next write or read. The last resolution
/// is kept and reused while the same argument list keeps coming.
#[derive(Default)]
pub(super) struct FieldSerializerGenerics {
    pending: Cell<Option<Box<[ConcreteType]>>>,
    cache: Cell<Option<Rc<Resolution>>>,
}

impl FieldSerializerGenerics {
    #[inline]
    pub(super) fn set_pending(&self, args: &[ConcreteType]) {
        self.pending.set(Some(args.into()));
    }

    #[inline]
    pub(super) fn take_pending(&self) -> Option<Box<[ConcreteType]>> {
        self.pending.take()
    }

    /// Drops the cached resolution; field indices may have changed.
    #[inline]
    pub(super) fn invalidate(&mut self) {
        *self.cache.get_mut() = None;
    }

    /// Resolves every generic field of `fields` under `args`.
    pub(super) fn resolve(
        &self,
        class: &ClassInfo,
        fields: &CachedFields,
        args: Box<[ConcreteType]>,
    ) -> Result<Rc<Resolution>, ConfigError> {
        let cached = self.cache.take();
        if let Some(resolution) = cached
            && resolution.args == args
        {
            self.cache.set(Some(resolution.clone()));
            return Ok(resolution);
        }

        let scope = GenericsScope::new(class.id(), class.generics(), &args)?;
        log::trace!("generic type parameters {scope}");
        let lookup = |name: &str| scope.get(name).cloned();
        let resolved = fields
            .entries()
            .iter()
            .map(|field| {
                if field.is_generic() {
                    field.field_type().resolve(&lookup)
                } else {
                    None
                }
            })
            .collect();

        let resolution = Rc::new(Resolution {
            args,
            scope: Rc::new(scope),
            fields: resolved,
        });
        self.cache.set(Some(resolution.clone()));
        Ok(resolution)
    }
}
