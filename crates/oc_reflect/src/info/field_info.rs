use crate::info::{CustomAttributes, FieldType, impl_custom_attributes_fn};

// -----------------------------------------------------------------------------
// FieldInfo

/// Information for a named field of a class.
///
/// The access index is assigned by the owning [`ClassInfo`](crate::info::ClassInfo)
/// and equals the field's position in declaration order.
///
/// # Examples
///
/// ```
/// use oc_reflect::info::{ClassInfo, FieldInfo, FieldType};
///
/// struct Unit(&'static str);
///
/// let info = ClassInfo::new("demo::Motor", [
///     FieldInfo::new("rpm", FieldType::INT).with_attribute(Unit("1/min")),
///     FieldInfo::new("label", FieldType::STR),
/// ]);
///
/// let rpm = info.field("rpm").unwrap();
/// assert_eq!(rpm.index(), 0);
/// assert_eq!(rpm.get_attribute::<Unit>().unwrap().0, "1/min");
/// assert_eq!(info.field_at(1).unwrap().name(), "label");
/// ```
#[derive(Debug)]
pub struct FieldInfo {
    name: &'static str,
    index: usize,
    ty: FieldType,
    custom_attributes: CustomAttributes,
}

impl FieldInfo {
    impl_custom_attributes_fn!(custom_attributes);

    /// Creates a new [`FieldInfo`] for the given field `name` and declared type.
    #[inline]
    pub fn new(name: &'static str, ty: impl Into<FieldType>) -> Self {
        Self {
            name,
            index: 0,
            ty: ty.into(),
            custom_attributes: CustomAttributes::new(),
        }
    }

    /// Returns the field name.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the access index, i.e. the declaration position.
    #[inline]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Returns the declared type.
    #[inline]
    pub const fn ty(&self) -> &FieldType {
        &self.ty
    }

    #[inline]
    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = index;
    }
}
