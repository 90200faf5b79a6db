use crate::{Error, Result, SchemaFragment};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A value handed to [`Validated::validate`].
///
/// External input arrives either as something already typed (an identifier
/// produced elsewhere in the process) or as loosely typed JSON from a request
/// body, query string or persisted row.
#[derive(Clone, Debug, PartialEq)]
pub enum Candidate<T> {
    /// Already an instance of the target type; returned unchanged.
    Typed(T),
    /// Untyped input that must go through [`Validated::try_construct`].
    Untyped(Value),
}

impl<T> From<Value> for Candidate<T> {
    fn from(value: Value) -> Self {
        Self::Untyped(value)
    }
}

/// A type that can build a trustworthy instance of itself from loosely typed
/// input and describe its documentation schema.
///
/// Implementors only decide two things: which input shapes they recognize,
/// and whether a recognized value is semantically valid. The provided
/// [`validate`](Validated::validate) method turns an unrecognized shape into
/// [`Error::TypeMismatch`], so call sites never special-case `None`.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use stockid::{Candidate, Error, Guid, Validated};
///
/// let id = Guid::validate_value(&json!("4731797472099266561")).unwrap();
/// assert_eq!(Guid::validate(Candidate::Typed(id)).unwrap(), id);
///
/// let err = Guid::validate_value(&json!(true)).unwrap_err();
/// assert_eq!(err, Error::TypeMismatch { found: "boolean", target: "GUID" });
/// ```
pub trait Validated: Sized {
    /// Type name reported in [`Error::TypeMismatch`].
    const TYPE_NAME: &'static str;

    /// Attempts to construct `Self` from `input`.
    ///
    /// Returns `Ok(None)` when the input shape is not one this type
    /// recognizes at all, and `Err(_)` when the shape is recognized but the
    /// value is invalid. `Ok(Some(_))` is always a fully valid instance.
    ///
    /// # Errors
    ///
    /// Returns the type-specific error for a recognized but invalid value.
    fn try_construct(input: &Value) -> Result<Option<Self>>;

    /// Describes the type for externally published API documentation.
    fn schema() -> SchemaFragment;

    /// Builds a valid instance or fails, passing typed candidates through.
    ///
    /// # Errors
    ///
    /// - [`Error::TypeMismatch`] if the input shape is not recognized
    /// - any error returned by [`Self::try_construct`]
    fn validate(candidate: Candidate<Self>) -> Result<Self> {
        match candidate {
            Candidate::Typed(value) => Ok(value),
            Candidate::Untyped(raw) => {
                Self::try_construct(&raw)?.ok_or_else(|| Error::TypeMismatch {
                    found: shape_name(&raw),
                    target: Self::TYPE_NAME,
                })
            }
        }
    }

    /// Shorthand for validating a borrowed JSON value.
    ///
    /// # Errors
    ///
    /// Same as [`Self::validate`].
    fn validate_value(input: &Value) -> Result<Self> {
        Self::try_construct(input)?.ok_or_else(|| Error::TypeMismatch {
            found: shape_name(input),
            target: Self::TYPE_NAME,
        })
    }
}

/// Returns the JSON shape name of `value`, as used in type-mismatch errors.
pub fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Deserializes any self-describing input into `T` through its validation
/// capability.
///
/// This is the bridge that lets domain records `#[derive(Deserialize)]` while
/// every [`Validated`] field is still checked.
///
/// # Errors
///
/// Returns a deserializer error carrying the validation error message.
pub fn deserialize_validated<'de, T, D>(deserializer: D) -> core::result::Result<T, D::Error>
where
    T: Validated,
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    T::validate(Candidate::Untyped(raw)).map_err(serde::de::Error::custom)
}
