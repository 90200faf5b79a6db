/// A result type defaulting to [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors produced while constructing identifiers and validated values
/// from external input.
///
/// Every variant describes bad client input: callers at an HTTP or RPC
/// boundary map all of them to a client-error response. Allocator transport
/// failures are not represented here; they belong to the [`Allocator`]
/// implementation.
///
/// [`Allocator`]: crate::Allocator
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The identifier string is empty or contains a non-digit character.
    #[error("guid ({input}) is not a number")]
    FormatError {
        /// The rejected input, verbatim.
        input: String,
    },

    /// The integer does not carry the allocator bit pattern (bit 63 clear,
    /// bit 62 set).
    #[error("invalid guid: {value}")]
    InvalidIdentifier {
        /// The rejected value, rendered in decimal.
        value: String,
    },

    /// The integer is not the value of any member of the enumeration.
    #[error("{value} is not a valid {target} value")]
    OutOfRange {
        /// The rejected value, rendered in decimal.
        value: String,
        /// The enumeration type name.
        target: &'static str,
    },

    /// The string is not the name of any member of the enumeration.
    #[error("{name} is not a valid key of {target}")]
    UnknownName {
        /// The rejected name, verbatim.
        name: String,
        /// The enumeration type name.
        target: &'static str,
    },

    /// The input shape is not one the target type knows how to validate.
    #[error("{found} can not be converted to {target}")]
    TypeMismatch {
        /// The JSON shape of the input (`boolean`, `number`, ...).
        found: &'static str,
        /// The target type name.
        target: &'static str,
    },
}
