use alloc::boxed::Box;
use core::any::{Any, TypeId};

use oc_utils::TypeIdMap;

// -----------------------------------------------------------------------------
// CustomAttributes

/// A collection of declarative attributes attached to a class or a field.
///
/// Attributes are stored by their [`TypeId`], so there can only be one
/// attribute per type. Serializers read them when they build their field
/// tables, e.g. a conditional-inclusion marker or a bound serializer.
///
/// # Example
///
/// ```
/// use oc_reflect::info::CustomAttributes;
///
/// struct Label(&'static str);
///
/// let attrs = CustomAttributes::new().with_attribute(Label("speed"));
/// assert!(attrs.contains::<Label>());
/// assert_eq!(attrs.get::<Label>().unwrap().0, "speed");
/// assert!(!attrs.contains::<u8>());
/// ```
#[derive(Default)]
#[repr(transparent)]
pub struct CustomAttributes {
    attributes: TypeIdMap<Box<dyn Any + Send + Sync>>,
}

impl CustomAttributes {
    /// Creates an empty [`CustomAttributes`].
    #[inline]
    pub const fn new() -> Self {
        Self {
            attributes: TypeIdMap::new(),
        }
    }

    /// Adds an attribute.
    ///
    /// Later insertions for the same type overwrite earlier values.
    #[inline]
    pub fn with_attribute<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.insert(value);
        self
    }

    /// Adds an attribute in place.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.attributes.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Returns `true` if an attribute of type `T` is present.
    #[inline]
    pub fn contains<T: Any>(&self) -> bool {
        self.attributes.contains_type::<T>()
    }

    /// Returns the attribute of type `T`, if present.
    #[inline]
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.attributes
            .get_type::<T>()
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Returns the number of stored attributes.
    #[inline]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns `true` if no attributes are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl core::fmt::Debug for CustomAttributes {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CustomAttributes")
            .field("len", &self.attributes.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Auxiliary macro

/// Implement `custom_attributes`, `get_attribute`, `has_attribute`
/// and the `with_attribute` builder.
macro_rules! impl_custom_attributes_fn {
    ($field:ident) => {
        /// Returns the attached [`CustomAttributes`](crate::info::CustomAttributes).
        #[inline]
        pub fn custom_attributes(&self) -> &$crate::info::CustomAttributes {
            &self.$field
        }

        /// Returns the attribute of type `T`, if present.
        #[inline]
        pub fn get_attribute<T: ::core::any::Any>(&self) -> Option<&T> {
            self.$field.get::<T>()
        }

        /// Returns `true` if it contains the given attribute type.
        #[inline]
        pub fn has_attribute<T: ::core::any::Any>(&self) -> bool {
            self.$field.contains::<T>()
        }

        /// Attaches one more attribute.
        #[inline]
        pub fn with_attribute<T: ::core::any::Any + Send + Sync>(mut self, value: T) -> Self {
            self.$field.insert(value);
            self
        }
    };
}

pub(crate) use impl_custom_attributes_fn;
