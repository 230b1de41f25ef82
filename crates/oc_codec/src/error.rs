//! Error types of the codec.
//!
//! Every fallible operation returns [`CodecError`]. Its [`kind`](CodecError::kind)
//! tells which layer rejected the call, independent of how deep in the
//! object graph the failure happened.

use alloc::boxed::Box;
use alloc::string::String;

use oc_reflect::access::AccessError;
use oc_reflect::info::{ClassId, Type};
use oc_reflect::registry::RegistryError;
use thiserror::Error;

// -----------------------------------------------------------------------------
// ErrorKind

/// The four failure classes of the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The codec or a serializer was set up inconsistently.
    Config,
    /// An instance could not be created.
    Construction,
    /// An object graph can not be written as it is.
    Encode,
    /// The input does not hold what the reader expects.
    Decode,
}

// -----------------------------------------------------------------------------
// ConfigError

/// A setup defect of the codec or of a serializer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("`{class}` declares {expected} type parameters, {found} type arguments were given")]
    GenericArity {
        class: ClassId,
        expected: usize,
        found: usize,
    },
    #[error("field `{field}` not found in `{class}`")]
    UnknownField { class: ClassId, field: String },
    #[error("type `{0}` is not registered")]
    UnregisteredType(Type),
    #[error("the serializer registered for `{0}` has a different type")]
    UnexpectedSerializer(Type),
    #[error("the serializer for `{0}` does not support copy")]
    CopyUnsupported(Type),
    #[error("the value type of field `{field}` in `{class}` can not be resolved for its bound serializer")]
    UnresolvedFieldType { class: ClassId, field: &'static str },
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Access(#[from] AccessError),
}

// -----------------------------------------------------------------------------
// EncodeError

/// An object graph that can not be written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EncodeError {
    #[error("null value where a non-null value is required")]
    NullValue,
    #[error("expected a value of type `{expected}`, found `{found}`")]
    TypeMismatch { expected: Type, found: Type },
    #[error("an instance of `{0}` contains itself, which needs reference tracking")]
    Cycle(ClassId),
}

// -----------------------------------------------------------------------------
// DecodeError

/// Input that does not match what the reader expects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("unexpected end of input at byte {position}, {needed} more bytes needed")]
    UnexpectedEnd { position: usize, needed: usize },
    #[error("malformed variable-length integer at byte {position}")]
    MalformedVarint { position: usize },
    #[error("invalid boolean byte {byte:#04x} at byte {position}")]
    InvalidBool { position: usize, byte: u8 },
    #[error("invalid UTF-8 string at byte {position}")]
    InvalidUtf8 { position: usize },
    #[error("unknown type tag {tag} at byte {position}")]
    UnknownTypeTag { position: usize, tag: u32 },
    #[error("back-reference to unknown object id {0}")]
    UnknownReference(u32),
    #[error("null value where a non-null value is required")]
    UnexpectedNull,
}

// -----------------------------------------------------------------------------
// CodecError

/// The error returned by codec operations.
///
/// # Examples
///
/// ```
/// use oc_codec::{CodecError, ConfigError, ErrorKind};
/// use oc_reflect::info::ClassId;
///
/// let err = CodecError::from(ConfigError::UnknownField {
///     class: ClassId::new("demo::Point"),
///     field: "z".into(),
/// })
/// .in_field(ClassId::new("demo::Line"), "start");
///
/// assert_eq!(err.kind(), ErrorKind::Config);
/// assert_eq!(
///     err.to_string(),
///     "field `start` of `demo::Line`: field `z` not found in `demo::Point`",
/// );
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CodecError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("can not create an instance of `{class}`: {reason}")]
    Construction { class: ClassId, reason: String },
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("field `{field}` of `{class}`: {source}")]
    Field {
        class: ClassId,
        field: &'static str,
        source: Box<CodecError>,
    },
}

impl CodecError {
    /// Returns the failure class, looking through field wrappers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Construction { .. } => ErrorKind::Construction,
            Self::Encode(_) => ErrorKind::Encode,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Field { source, .. } => source.kind(),
        }
    }

    /// Returns the innermost error, below every field wrapper.
    pub fn root(&self) -> &Self {
        match self {
            Self::Field { source, .. } => source.root(),
            other => other,
        }
    }

    /// Wraps the error with the field it was raised in.
    #[inline]
    pub fn in_field(self, class: ClassId, field: &'static str) -> Self {
        Self::Field {
            class,
            field,
            source: Box::new(self),
        }
    }
}

impl From<AccessError> for CodecError {
    #[inline]
    fn from(value: AccessError) -> Self {
        Self::Config(ConfigError::Access(value))
    }
}

impl From<RegistryError> for CodecError {
    #[inline]
    fn from(value: RegistryError) -> Self {
        Self::Config(ConfigError::Registry(value))
    }
}

#[cfg(test)]
mod tests {
    use super::{CodecError, DecodeError, EncodeError, ErrorKind};
    use oc_reflect::info::ClassId;

    #[test]
    fn kind_looks_through_fields() {
        let err = CodecError::from(DecodeError::UnexpectedNull)
            .in_field(ClassId::new("t::Inner"), "value")
            .in_field(ClassId::new("t::Outer"), "inner");
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(err.root(), &CodecError::Decode(DecodeError::UnexpectedNull));
    }

    #[test]
    fn encode_kind() {
        assert_eq!(CodecError::from(EncodeError::NullValue).kind(), ErrorKind::Encode);
    }
}
