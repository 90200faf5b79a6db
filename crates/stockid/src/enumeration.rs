use crate::{Error, Result, SchemaFragment};
use serde_json::{Value, json};

/// A closed set of named integer-valued members that validates external
/// input by member value or member name.
///
/// Implementations are normally generated by [`define_validated_enum!`],
/// which also wires the type into [`Validated`] and serde.
///
/// [`Validated`]: crate::Validated
pub trait ValidatedEnum: Copy + 'static {
    /// Type name reported in errors.
    const TYPE_NAME: &'static str;

    /// Every member, in declaration order.
    const MEMBERS: &'static [Self];

    /// The member's wire name.
    fn name(self) -> &'static str;

    /// The member's integer value.
    fn value(self) -> i64;

    /// Looks up the member whose value is `value`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if no member has that value.
    fn from_value(value: i64) -> Result<Self> {
        Self::MEMBERS
            .iter()
            .copied()
            .find(|member| member.value() == value)
            .ok_or_else(|| Error::OutOfRange {
                value: value.to_string(),
                target: Self::TYPE_NAME,
            })
    }

    /// Looks up the member named `name` (exact, case-sensitive).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownName`] if no member has that name.
    fn from_name(name: &str) -> Result<Self> {
        Self::MEMBERS
            .iter()
            .copied()
            .find(|member| member.name() == name)
            .ok_or_else(|| Error::UnknownName {
                name: name.to_string(),
                target: Self::TYPE_NAME,
            })
    }
}

/// Validation capability shared by every [`ValidatedEnum`].
///
/// Integers select by value, strings by name. Anything else, booleans and
/// floats included, is an unrecognized shape.
///
/// # Errors
///
/// - [`Error::OutOfRange`] for an integer that is no member's value
///   (including integers that do not fit in `i64`)
/// - [`Error::UnknownName`] for a string that is no member's name
pub fn construct_enum<E: ValidatedEnum>(input: &Value) -> Result<Option<E>> {
    match input {
        Value::Number(n) if n.is_f64() => Ok(None),
        Value::Number(n) => match n.as_i64() {
            Some(value) => E::from_value(value).map(Some),
            None => Err(Error::OutOfRange {
                value: n.to_string(),
                target: E::TYPE_NAME,
            }),
        },
        Value::String(name) => E::from_name(name).map(Some),
        _ => Ok(None),
    }
}

/// Documentation fragment for a [`ValidatedEnum`]: every member name, and the
/// first member's name and value as examples.
pub fn enum_schema<E: ValidatedEnum>() -> SchemaFragment {
    let examples = E::MEMBERS
        .first()
        .map(|first| vec![json!(first.name()), json!(first.value())])
        .unwrap_or_default();
    SchemaFragment::string(examples)
        .with_members(E::MEMBERS.iter().map(|m| m.name().to_string()).collect())
}

/// Declares a validated enumeration.
///
/// Each member is written `Variant = value => "WIRE_NAME"`. The enum is
/// `#[repr(i64)]`, so two members with the same value are rejected at compile
/// time as duplicate discriminants.
///
/// The generated type implements [`ValidatedEnum`], [`Validated`],
/// `Display` (wire name), `FromStr` (by name), `TryFrom<i64>` (by value),
/// `Serialize` (member value) and `Deserialize` (value or name, through
/// [`Validated`]).
///
/// ```
/// use serde_json::json;
/// use stockid::{Validated, define_validated_enum};
///
/// define_validated_enum!(
///     /// Whether a shelf accepts new items.
///     pub enum ShelfStatus {
///         Closed = 0 => "CLOSED",
///         Open = 1 => "OPEN",
///     }
/// );
///
/// assert_eq!(ShelfStatus::validate_value(&json!(1)).unwrap(), ShelfStatus::Open);
/// assert_eq!(ShelfStatus::validate_value(&json!("CLOSED")).unwrap(), ShelfStatus::Closed);
/// assert_eq!(ShelfStatus::Open.to_string(), "OPEN");
/// assert_eq!(serde_json::to_value(ShelfStatus::Open).unwrap(), json!(1));
///
/// let err = ShelfStatus::validate_value(&json!(7)).unwrap_err();
/// assert_eq!(err.to_string(), "7 is not a valid ShelfStatus value");
/// ```
///
/// ```compile_fail
/// stockid::define_validated_enum!(
///     pub enum Clash {
///         A = 0 => "A",
///         B = 0 => "B",
///     }
/// );
/// ```
///
/// [`Validated`]: crate::Validated
#[macro_export]
macro_rules! define_validated_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $value:literal => $wire:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        #[repr(i64)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant = $value,
            )+
        }

        impl $crate::ValidatedEnum for $name {
            const TYPE_NAME: &'static str = stringify!($name);
            const MEMBERS: &'static [Self] = &[$(Self::$variant),+];

            fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }

            fn value(self) -> i64 {
                self as i64
            }
        }

        impl $crate::Validated for $name {
            const TYPE_NAME: &'static str = stringify!($name);

            fn try_construct(
                input: &$crate::__private::serde_json::Value,
            ) -> $crate::Result<Option<Self>> {
                $crate::construct_enum::<Self>(input)
            }

            fn schema() -> $crate::SchemaFragment {
                $crate::enum_schema::<Self>()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str($crate::ValidatedEnum::name(*self))
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::Error;

            fn from_str(s: &str) -> $crate::Result<Self> {
                <Self as $crate::ValidatedEnum>::from_name(s)
            }
        }

        impl ::core::convert::TryFrom<i64> for $name {
            type Error = $crate::Error;

            fn try_from(value: i64) -> $crate::Result<Self> {
                <Self as $crate::ValidatedEnum>::from_value(value)
            }
        }

        impl $crate::__private::serde::Serialize for $name {
            fn serialize<S>(&self, s: S) -> ::core::result::Result<S::Ok, S::Error>
            where
                S: $crate::__private::serde::Serializer,
            {
                s.serialize_i64($crate::ValidatedEnum::value(*self))
            }
        }

        impl<'de> $crate::__private::serde::Deserialize<'de> for $name {
            fn deserialize<D>(d: D) -> ::core::result::Result<Self, D::Error>
            where
                D: $crate::__private::serde::Deserializer<'de>,
            {
                $crate::deserialize_validated(d)
            }
        }
    };
}
