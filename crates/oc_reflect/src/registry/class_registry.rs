use alloc::sync::Arc;

use oc_utils::hash::{HashMap, HashSet};
use thiserror::Error;

use crate::info::{ClassId, ClassInfo, FieldType};

// -----------------------------------------------------------------------------
// RegistryError

/// An error returned when a class table is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistryError {
    #[error("class `{0}` is already registered")]
    AlreadyRegistered(ClassId),
    #[error("field `{field}` is declared twice in `{class}`")]
    DuplicateField { class: ClassId, field: &'static str },
    #[error("field `{field}` of `{class}` uses undeclared type parameter `{param}`")]
    UnknownTypeParam {
        class: ClassId,
        field: &'static str,
        param: &'static str,
    },
}

// -----------------------------------------------------------------------------
// ClassRegistry

/// The central store of class tables.
///
/// Classes are indexed by their full path and by their short name. A short
/// name shared by several classes becomes ambiguous and is no longer
/// resolvable by [`get_with_name`](ClassRegistry::get_with_name).
///
/// # Example
///
/// ```
/// use oc_reflect::info::{ClassInfo, FieldInfo, FieldType};
/// use oc_reflect::registry::ClassRegistry;
///
/// let mut registry = ClassRegistry::new();
/// registry.register(ClassInfo::new("a::Item", [FieldInfo::new("id", FieldType::INT)])).unwrap();
/// registry.register(ClassInfo::new("b::Item", [])).unwrap();
/// registry.register(ClassInfo::new("b::Other", [])).unwrap();
///
/// assert!(registry.get_with_path("a::Item").is_some());
/// assert!(registry.get_with_name("Item").is_none());
/// assert!(registry.is_ambiguous("Item"));
/// assert_eq!(registry.get_with_name("Other").unwrap().path(), "b::Other");
/// ```
#[derive(Default)]
pub struct ClassRegistry {
    classes: HashMap<ClassId, Arc<ClassInfo>>,
    class_path_to_id: HashMap<&'static str, ClassId>,
    class_name_to_id: HashMap<&'static str, ClassId>,
    ambiguous_names: HashSet<&'static str>,
}

impl ClassRegistry {
    /// Create an empty [`ClassRegistry`].
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and stores a class table.
    ///
    /// Rejected when the class is already present, a field name repeats, or
    /// a field mentions a type parameter the class does not declare.
    pub fn register(&mut self, info: ClassInfo) -> Result<Arc<ClassInfo>, RegistryError> {
        let id = info.id();
        if self.classes.contains_key(&id) {
            return Err(RegistryError::AlreadyRegistered(id));
        }
        if let Some(field) = info.duplicate_field() {
            return Err(RegistryError::DuplicateField { class: id, field });
        }
        Self::check_type_params(&info)?;

        let name = id.name();
        if !self.ambiguous_names.contains(name) {
            if self.class_name_to_id.remove(name).is_some() {
                self.ambiguous_names.insert(name);
            } else {
                self.class_name_to_id.insert(name, id);
            }
        }

        self.class_path_to_id.insert(id.path(), id);
        let info = Arc::new(info);
        self.classes.insert(id, info.clone());
        Ok(info)
    }

    fn check_type_params(info: &ClassInfo) -> Result<(), RegistryError> {
        for field in info.fields() {
            let params = match field.ty() {
                FieldType::Fixed(_) | FieldType::Dynamic => continue,
                ty => ty.params(),
            };
            if let Some(param) = params
                .into_iter()
                .find(|param| info.generics().get(param).is_none())
            {
                return Err(RegistryError::UnknownTypeParam {
                    class: info.id(),
                    field: field.name(),
                    param,
                });
            }
        }
        Ok(())
    }

    /// Returns the class table for `id`.
    #[inline]
    pub fn get(&self, id: ClassId) -> Option<&Arc<ClassInfo>> {
        self.classes.get(&id)
    }

    /// Returns the class table registered under the full `path`.
    pub fn get_with_path(&self, path: &str) -> Option<&Arc<ClassInfo>> {
        self.get(*self.class_path_to_id.get(path)?)
    }

    /// Returns the class table registered under the short `name`.
    ///
    /// Returns `None` when the name is unknown or ambiguous.
    pub fn get_with_name(&self, name: &str) -> Option<&Arc<ClassInfo>> {
        self.get(*self.class_name_to_id.get(name)?)
    }

    /// Returns `true` if more than one class uses the short `name`.
    #[inline]
    pub fn is_ambiguous(&self, name: &str) -> bool {
        self.ambiguous_names.contains(name)
    }

    #[inline]
    pub fn contains(&self, id: ClassId) -> bool {
        self.classes.contains_key(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Iterates over the registered class tables in arbitrary order.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Arc<ClassInfo>> {
        self.classes.values()
    }
}
