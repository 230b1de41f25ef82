use alloc::boxed::Box;

use oc_utils::hash::{FixedHashState, HashMap};

use crate::info::{ClassId, CustomAttributes, FieldInfo, Generics, Type};
use crate::info::impl_custom_attributes_fn;

// -----------------------------------------------------------------------------
// ClassInfo

/// The descriptor table of a class: identity, type parameters and
/// ordered fields.
///
/// The order of fields is fixed and equals the input order. Every
/// serializer derives its field layout from this order, so it is part of
/// the wire format.
///
/// # Examples
///
/// ```
/// use oc_reflect::info::{ClassInfo, FieldInfo, FieldType, Type};
///
/// let info = ClassInfo::new("demo::Box", [FieldInfo::new("value", FieldType::param("T"))])
///     .with_type_params(["T"]);
///
/// assert_eq!(info.ty(), Type::class("demo::Box"));
/// assert_eq!(info.name(), "Box");
/// assert_eq!(info.generics().len(), 1);
/// assert_eq!(info.index_of("value"), Some(0));
/// assert!(info.is_constructible());
/// ```
#[derive(Debug)]
pub struct ClassInfo {
    id: ClassId,
    generics: Generics,
    fields: Box<[FieldInfo]>,
    field_indices: HashMap<&'static str, usize>,
    constructible: bool,
    custom_attributes: CustomAttributes,
}

impl ClassInfo {
    impl_custom_attributes_fn!(custom_attributes);

    /// Create a new [`ClassInfo`] for the class at `path`.
    ///
    /// Field indices are reassigned to follow the input order.
    /// If a name repeats, lookups by name find the first field;
    /// [`ClassRegistry::register`](crate::registry::ClassRegistry::register)
    /// rejects such tables.
    pub fn new(path: &'static str, fields: impl IntoIterator<Item = FieldInfo>) -> Self {
        let mut fields: Box<[FieldInfo]> = fields.into_iter().collect();
        let mut field_indices = HashMap::with_capacity_and_hasher(fields.len(), FixedHashState);
        for (index, field) in fields.iter_mut().enumerate() {
            field.set_index(index);
            field_indices.entry(field.name()).or_insert(index);
        }

        Self {
            id: ClassId::new(path),
            generics: Generics::new(),
            fields,
            field_indices,
            constructible: true,
            custom_attributes: CustomAttributes::new(),
        }
    }

    /// Declares the type parameters of the class.
    #[inline]
    pub fn with_generics(mut self, generics: Generics) -> Self {
        self.generics = generics;
        self
    }

    /// Declares the type parameters of the class by name.
    #[inline]
    pub fn with_type_params(self, names: impl IntoIterator<Item = &'static str>) -> Self {
        self.with_generics(Generics::from_names(names))
    }

    /// Marks the class as having no zero-argument construction.
    ///
    /// Instances must then be provided by a serializer's creation hooks.
    #[inline]
    pub fn without_default_constructor(mut self) -> Self {
        self.constructible = false;
        self
    }

    /// Returns the class identity.
    #[inline]
    pub const fn id(&self) -> ClassId {
        self.id
    }

    /// Returns the class as a [`Type`].
    #[inline]
    pub const fn ty(&self) -> Type {
        Type::Class(self.id)
    }

    /// Returns the full type path.
    #[inline]
    pub const fn path(&self) -> &'static str {
        self.id.path()
    }

    /// Returns the short type name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.id.name()
    }

    /// Returns the declared type parameters.
    #[inline]
    pub const fn generics(&self) -> &Generics {
        &self.generics
    }

    /// Returns `true` if instances can be created without arguments.
    #[inline]
    pub const fn is_constructible(&self) -> bool {
        self.constructible
    }

    /// Returns the field called `name`, if present.
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.get(*self.field_indices.get(name)?)
    }

    /// Returns the field at `index`, if present.
    #[inline]
    pub fn field_at(&self, index: usize) -> Option<&FieldInfo> {
        self.fields.get(index)
    }

    /// Returns the index of the field called `name`, if present.
    #[inline]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.field_indices.get(name).copied()
    }

    /// Returns the fields in **declaration order**.
    #[inline]
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    /// Returns the number of fields.
    #[inline]
    pub fn field_len(&self) -> usize {
        self.fields.len()
    }

    /// Returns the first field name that appears more than once.
    pub(crate) fn duplicate_field(&self) -> Option<&'static str> {
        self.fields
            .iter()
            .find(|field| self.field_indices.get(field.name()) != Some(&field.index()))
            .map(FieldInfo::name)
    }
}

#[cfg(test)]
mod tests {
    use crate::info::{ClassInfo, FieldInfo, FieldType};

    #[test]
    fn indices_follow_declaration_order() {
        let info = ClassInfo::new(
            "t::Point",
            [
                FieldInfo::new("y", FieldType::INT),
                FieldInfo::new("x", FieldType::INT),
            ],
        );
        assert_eq!(info.index_of("y"), Some(0));
        assert_eq!(info.field_at(1).unwrap().name(), "x");
        assert_eq!(info.field("x").unwrap().index(), 1);
        assert!(info.field("z").is_none());
        assert_eq!(info.duplicate_field(), None);
    }

    #[test]
    fn duplicate_names_are_detected() {
        let info = ClassInfo::new(
            "t::Twice",
            [
                FieldInfo::new("a", FieldType::INT),
                FieldInfo::new("a", FieldType::STR),
            ],
        );
        assert_eq!(info.index_of("a"), Some(0));
        assert_eq!(info.duplicate_field(), Some("a"));
    }

    #[test]
    fn class_attributes() {
        struct Tag;
        let info = ClassInfo::new("t::Tagged", []).with_attribute(Tag);
        assert!(info.has_attribute::<Tag>());
        assert!(!info.without_default_constructor().is_constructible());
    }
}
