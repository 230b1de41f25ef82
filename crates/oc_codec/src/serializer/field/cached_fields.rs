use alloc::vec::Vec;

use oc_reflect::info::ClassInfo;

use crate::Context;
use crate::serializer::field::{Bind, CachedField, FieldSerializerConfig, NotNull, Optional, Transient};

// -----------------------------------------------------------------------------
// CachedFields

/// The field table of a [`FieldSerializer`](super::FieldSerializer).
///
/// Holds one [`CachedField`] per participating field, in declaration order.
/// Each entry belongs to the write/read list, the copy list, or both:
/// transient fields may be copied without being written, and with
/// `serialize_transient` written without being copied.
#[derive(Debug, Default)]
pub struct CachedFields {
    entries: Vec<CachedField>,
}

impl CachedFields {
    /// Builds the table of `class` under `config`.
    ///
    /// Fields marked [`Optional`] are left out unless `context` has their key.
    pub fn build(class: &ClassInfo, config: &FieldSerializerConfig, context: &Context) -> Self {
        let mut entries = Vec::with_capacity(class.field_len());
        for field in class.fields() {
            if let Some(Optional(key)) = field.get_attribute::<Optional>()
                && !context.contains_key(key)
            {
                log::trace!("skip optional field `{}` of `{}`", field.name(), class.path());
                continue;
            }

            let transient = field.has_attribute::<Transient>();
            let serialized = !transient || config.serialize_transient;
            let copied = !transient || config.copy_transient;
            if !serialized && !copied {
                continue;
            }

            let mut cached = CachedField::new(class, field, config);
            cached.serialized = serialized;
            cached.copied = copied;
            if let Some(Bind(factory)) = field.get_attribute::<Bind>() {
                cached.bind(factory());
            }
            if field.has_attribute::<NotNull>() {
                cached.set_can_be_null(false);
            }
            entries.push(cached);
        }
        Self { entries }
    }

    /// Replaces every entry with a fresh build, dropping removals and
    /// per-field settings.
    pub fn rebuild(&mut self, class: &ClassInfo, config: &FieldSerializerConfig, context: &Context) {
        *self = Self::build(class, config, context);
    }

    /// Returns the write/read list.
    pub fn fields(&self) -> impl Iterator<Item = &CachedField> {
        self.entries.iter().filter(|field| field.serialized)
    }

    /// Returns the copy list.
    pub fn copy_fields(&self) -> impl Iterator<Item = &CachedField> {
        self.entries.iter().filter(|field| field.copied)
    }

    /// Returns every entry, in declaration order.
    #[inline]
    pub fn entries(&self) -> &[CachedField] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&CachedField> {
        self.entries.iter().find(|field| field.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut CachedField> {
        self.entries.iter_mut().find(|field| field.name() == name)
    }

    /// Removes the field called `name` from both lists.
    pub fn remove(&mut self, name: &str) -> Option<CachedField> {
        let index = self.entries.iter().position(|field| field.name() == name)?;
        Some(self.entries.remove(index))
    }

    /// Keeps only the fields for which `keep` returns `true`.
    pub fn retain(&mut self, keep: impl FnMut(&CachedField) -> bool) {
        self.entries.retain(keep);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use oc_reflect::info::{ClassInfo, FieldInfo, FieldType};

    use super::CachedFields;
    use crate::Context;
    use crate::serializer::field::{FieldSerializerConfig, NotNull, Optional, Transient};

    fn class() -> ClassInfo {
        ClassInfo::new(
            "t::Record",
            [
                FieldInfo::new("id", FieldType::LONG),
                FieldInfo::new("name", FieldType::STR).with_attribute(NotNull),
                FieldInfo::new("audit", FieldType::STR).with_attribute(Optional("audit")),
                FieldInfo::new("cache", FieldType::Dynamic).with_attribute(Transient),
            ],
        )
    }

    fn names<'a>(fields: impl Iterator<Item = &'a super::CachedField>) -> Vec<&'static str> {
        fields.map(|field| field.name()).collect()
    }

    #[test]
    fn optional_needs_context_key() {
        let config = FieldSerializerConfig::default();
        let without = CachedFields::build(&class(), &config, &Context::new());
        assert!(without.get("audit").is_none());

        let with = CachedFields::build(&class(), &config, &Context::new().with("audit", ""));
        assert_eq!(names(with.fields()), ["id", "name", "audit"]);
    }

    #[test]
    fn transient_lists_differ() {
        let config = FieldSerializerConfig::default();
        let fields = CachedFields::build(&class(), &config, &Context::new());
        assert_eq!(names(fields.fields()), ["id", "name"]);
        assert_eq!(names(fields.copy_fields()), ["id", "name", "cache"]);

        let config = FieldSerializerConfig {
            serialize_transient: true,
            copy_transient: false,
            ..Default::default()
        };
        let fields = CachedFields::build(&class(), &config, &Context::new());
        assert_eq!(names(fields.fields()), ["id", "name", "cache"]);
        assert_eq!(names(fields.copy_fields()), ["id", "name"]);
    }

    #[test]
    fn nullability_defaults() {
        let config = FieldSerializerConfig::default();
        let fields = CachedFields::build(&class(), &config, &Context::new());
        assert!(!fields.get("id").unwrap().can_be_null());
        assert!(!fields.get("name").unwrap().can_be_null());
        assert!(fields.get("cache").unwrap().can_be_null());

        let config = FieldSerializerConfig {
            fields_can_be_null: false,
            ..Default::default()
        };
        let fields = CachedFields::build(&class(), &config, &Context::new());
        assert!(!fields.get("cache").unwrap().can_be_null());
    }

    #[test]
    fn order_is_stable_across_rebuilds() {
        let config = FieldSerializerConfig::default();
        let first = CachedFields::build(&class(), &config, &Context::new());
        let mut second = CachedFields::build(&class(), &config, &Context::new());
        second.remove("id");
        second.rebuild(&class(), &config, &Context::new());
        assert_eq!(names(first.fields()), names(second.fields()));
        assert_eq!(
            first.entries().iter().map(|f| f.access_index()).collect::<Vec<_>>(),
            [0, 1, 3]
        );
    }

    #[test]
    fn remove_and_retain() {
        let config = FieldSerializerConfig::default();
        let mut fields = CachedFields::build(&class(), &config, &Context::new());
        assert_eq!(fields.remove("name").unwrap().name(), "name");
        assert!(fields.remove("name").is_none());
        fields.retain(|field| field.is_serialized());
        assert_eq!(names(fields.copy_fields()), ["id"]);
        assert_eq!(fields.len(), 1);
    }
}
