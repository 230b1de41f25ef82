use alloc::string::String;

use oc_utils::hash::HashMap;

// -----------------------------------------------------------------------------
// Context

/// Ambient key/value settings of a [`Codec`](crate::Codec).
///
/// Serializers consult it when they build their field tables. A field
/// marked [`Optional`](crate::serializer::field::Optional) only takes part
/// when its key is present.
///
/// # Examples
///
/// ```
/// use oc_codec::Context;
///
/// let mut context = Context::new();
/// context.insert("audit", "on");
/// assert!(context.contains_key("audit"));
/// assert_eq!(context.get("audit"), Some("on"));
/// assert_eq!(context.remove("audit").as_deref(), Some("on"));
/// assert!(context.is_empty());
/// ```
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct Context {
    entries: HashMap<String, String>,
}

impl Context {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an entry, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// Adds an entry, builder style.
    #[inline]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[inline]
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
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
