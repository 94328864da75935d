//! Primitive errors

/// A pair of values, one of which is expected and one of which is actual.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error("got {got}, expected {expected}")]
pub struct GotExpected<T> {
    /// The actual value.
    pub got: T,
    /// The expected value.
    pub expected: T,
}

impl<T> From<(T, T)> for GotExpected<T> {
    #[inline]
    fn from((got, expected): (T, T)) -> Self {
        Self::new(got, expected)
    }
}

impl<T> GotExpected<T> {
    /// Creates a new error from a pair of values.
    #[inline]
    pub const fn new(got: T, expected: T) -> Self {
        Self { got, expected }
    }
}

/// A value violates its entry in a field schema.
///
/// Raised while constructing a header or transaction, never during consensus validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// The value is longer than the field allows.
    #[error("the field {name} must not have more than {max} bytes, got {len}")]
    TooLong {
        /// Field name.
        name: &'static str,
        /// Maximum number of bytes.
        max: usize,
        /// Actual number of bytes.
        len: usize,
    },
    /// The field must not be empty.
    #[error("the field {name} must not be empty")]
    Empty {
        /// Field name.
        name: &'static str,
    },
    /// A field without a usable default was not provided.
    #[error("the field {name} is required")]
    Missing {
        /// Field name.
        name: &'static str,
    },
    /// A raw field array has the wrong number of entries.
    #[error("wrong number of fields: {0}")]
    Arity(GotExpected<usize>),
}

/// Errors that can occur when decoding a block from its raw form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlockDecodeError {
    /// The input is not a well formed RLP block.
    #[error("invalid rlp: {0}")]
    Rlp(#[from] alloy_rlp::Error),
    /// A header, uncle header or transaction violates its field schema.
    #[error(transparent)]
    Field(#[from] FieldError),
}
