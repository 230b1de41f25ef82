use alloc::boxed::Box;
use core::ops::Deref;

// -----------------------------------------------------------------------------
// Type Generic Param

/// A declared type parameter of a class, e.g. the `T` of `Box<T>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeParamInfo {
    name: &'static str,
}

impl TypeParamInfo {
    /// Create a new [`TypeParamInfo`].
    #[inline]
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    /// Returns the parameter name.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

// -----------------------------------------------------------------------------
// Generics

/// The ordered list of type parameters a class declares.
///
/// Arguments supplied for a generic instantiation are matched against
/// this list positionally.
///
/// If the class has no type parameters, this will be empty.
///
/// # Examples
///
/// ```
/// use oc_reflect::info::Generics;
///
/// let generics = Generics::from_names(["K", "V"]);
/// assert_eq!(generics.len(), 2);
/// assert_eq!(generics.index_of("V"), Some(1));
/// assert!(generics.get("T").is_none());
/// assert_eq!(generics[0].name(), "K");
/// ```
#[derive(Clone, Default, Debug)]
pub struct Generics(Option<Box<[TypeParamInfo]>>);

impl Generics {
    /// Create a new, empty `Generics` container.
    #[inline(always)]
    pub const fn new() -> Self {
        Self(None)
    }

    /// Create a `Generics` from its parameter infos.
    pub fn from_params(params: impl IntoIterator<Item = TypeParamInfo>) -> Self {
        let params: Box<[TypeParamInfo]> = params.into_iter().collect();
        if params.is_empty() {
            Self(None)
        } else {
            Self(Some(params))
        }
    }

    /// Create a `Generics` from parameter names, in declaration order.
    pub fn from_names(names: impl IntoIterator<Item = &'static str>) -> Self {
        Self::from_params(names.into_iter().map(TypeParamInfo::new))
    }

    /// Returns the parameter called `name`, if present.
    ///
    /// Complexity: O(n) in the number of parameters.
    pub fn get(&self, name: &str) -> Option<&TypeParamInfo> {
        self.iter().find(|info| info.name() == name)
    }

    /// Returns the position of the parameter called `name`, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.iter().position(|info| info.name() == name)
    }
}

impl Deref for Generics {
    type Target = [TypeParamInfo];
    #[inline]
    fn deref(&self) -> &Self::Target {
        match &self.0 {
            Some(v) => v,
            None => &[],
        }
    }
}
