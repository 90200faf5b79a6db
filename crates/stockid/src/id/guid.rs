use crate::{Allocator, EPOCH_MILLIS, Error, Result, SchemaFragment, Validated};
use chrono::{DateTime, Local, Utc};
use core::{fmt, str::FromStr};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Value, json};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// A 64-bit globally unique identifier issued by the allocator service.
///
/// - 1 bit sign (always 0)
/// - 41 bits timestamp (ms since [`EPOCH`])
/// - 2 bits datacenter index
/// - 8 bits worker index
/// - 12 bits sequence
///
/// ```text
///  Bit Index:  63      63 62            22 21              20 19          12 11             0
///              +---------+----------------+------------------+--------------+---------------+
///  Field:      | sign(1) | timestamp (41) | datacenter (2)   | worker (8)   | sequence (12) |
///              +---------+----------------+------------------+--------------+---------------+
///              |<----------------------- MSB ---- 64 bits ---- LSB ------------------------>|
/// ```
///
/// Every identifier the allocator issues has bit 63 clear and bit 62 set (see
/// [`Guid::is_structurally_valid`]). Identifiers arriving from outside the
/// process are checked against that pattern; identifiers from the allocator
/// are trusted.
///
/// The canonical external form is the decimal string returned by
/// `to_string()`. Values above 2^53 do not survive a round-trip through a
/// double-precision JSON number, so identifiers always cross API boundaries
/// as strings.
///
/// [`EPOCH`]: crate::EPOCH
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Guid {
    id: u64,
}

impl Guid {
    pub const TIMESTAMP_BITS: u64 = 41;
    pub const DATACENTER_BITS: u64 = 2;
    pub const WORKER_BITS: u64 = 8;
    pub const SEQUENCE_BITS: u64 = 12;

    pub const SEQUENCE_SHIFT: u64 = 0;
    pub const WORKER_SHIFT: u64 = Self::SEQUENCE_SHIFT + Self::SEQUENCE_BITS;
    pub const DATACENTER_SHIFT: u64 = Self::WORKER_SHIFT + Self::WORKER_BITS;
    pub const TIMESTAMP_SHIFT: u64 = Self::DATACENTER_SHIFT + Self::DATACENTER_BITS;

    pub const TIMESTAMP_MASK: u64 = (1 << Self::TIMESTAMP_BITS) - 1;
    pub const DATACENTER_MASK: u64 = (1 << Self::DATACENTER_BITS) - 1;
    pub const WORKER_MASK: u64 = (1 << Self::WORKER_BITS) - 1;
    pub const SEQUENCE_MASK: u64 = (1 << Self::SEQUENCE_BITS) - 1;

    /// Packs the given components, masking each one to its field width.
    ///
    /// The result is not checked against the structural invariant.
    #[must_use]
    pub const fn from_components(
        timestamp: u64,
        datacenter: u64,
        worker: u64,
        sequence: u64,
    ) -> Self {
        let t = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let d = (datacenter & Self::DATACENTER_MASK) << Self::DATACENTER_SHIFT;
        let w = (worker & Self::WORKER_MASK) << Self::WORKER_SHIFT;
        let s = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
        Self { id: t | d | w | s }
    }

    /// Requests a fresh identifier from the allocator.
    ///
    /// The allocator is the trust boundary: the returned value is wrapped as
    /// is, without the structural check.
    ///
    /// # Errors
    ///
    /// Returns the allocator's error if the round-trip fails. Nothing is
    /// retried.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub async fn allocate<A>(allocator: &A) -> Result<Self, A::Error>
    where
        A: Allocator,
    {
        let raw = allocator.fetch_raw_identifier().await?;
        Ok(Self::from_raw(raw))
    }

    /// Parses the canonical decimal form.
    ///
    /// # Errors
    ///
    /// - [`Error::FormatError`] if `input` is empty or contains anything but
    ///   ASCII digits (signs and whitespace included)
    /// - [`Error::InvalidIdentifier`] if the number does not fit in 64 bits
    ///   or fails the structural check
    pub fn parse(input: &str) -> Result<Self> {
        if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::FormatError {
                input: input.to_string(),
            });
        }
        // All digits, so the only possible failure is overflow, and anything
        // above u64::MAX certainly has a bit above 62 set.
        let value = input.parse::<u64>().map_err(|_| Error::InvalidIdentifier {
            value: input.to_string(),
        })?;
        Self::from_integer(value, true)
    }

    /// Wraps an integer, optionally enforcing the structural check.
    ///
    /// With `verify == false` the value is stored unmodified whatever its
    /// bits are.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentifier`] if `verify` is set and the value
    /// is not structurally valid.
    pub fn from_integer(value: u64, verify: bool) -> Result<Self> {
        if verify {
            Self::verified(value)
        } else {
            Ok(Self::from_raw(value))
        }
    }

    /// Wraps a signed integer (for example a `BIGINT` column) after
    /// reinterpreting its bits, with the structural check enforced.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentifier`] for negative values and for
    /// values failing the structural check.
    pub fn from_signed(value: i64) -> Result<Self> {
        Self::verified(value as u64).map_err(|_| Error::InvalidIdentifier {
            value: value.to_string(),
        })
    }

    fn verified(value: u64) -> Result<Self> {
        if Self::is_structurally_valid(value) {
            Ok(Self { id: value })
        } else {
            Err(Error::InvalidIdentifier {
                value: value.to_string(),
            })
        }
    }

    /// Returns `true` if bit 63 is clear and bit 62 is set.
    #[must_use]
    pub const fn is_structurally_valid(value: u64) -> bool {
        value >> 62 == 1
    }

    /// Returns `true` if this identifier passes [`Self::is_structurally_valid`].
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        Self::is_structurally_valid(self.id)
    }

    /// Converts this type into its raw type representation
    #[must_use]
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Converts a raw type into this type, without verification
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// Extracts the 41-bit timestamp field (ms since [`EPOCH`]).
    ///
    /// [`EPOCH`]: crate::EPOCH
    #[must_use]
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Creation time in milliseconds since the UNIX epoch.
    #[must_use]
    pub const fn created_at_millis(&self) -> u64 {
        self.timestamp() + EPOCH_MILLIS
    }

    /// Creation time as a UTC date-time.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        // 41 bits of millis past 1987 stay far inside chrono's range.
        DateTime::from_timestamp_millis(self.created_at_millis() as i64).unwrap_or_default()
    }

    /// Creation time in the local timezone, formatted `YYYY-MM-DD HH:MM:SS`.
    #[must_use]
    pub fn created_at_formatted(&self) -> String {
        self.created_at()
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }

    /// Extracts the 2-bit datacenter index.
    #[must_use]
    pub const fn datacenter_index(&self) -> u64 {
        (self.id >> Self::DATACENTER_SHIFT) & Self::DATACENTER_MASK
    }

    /// Extracts the 8-bit worker index.
    #[must_use]
    pub const fn worker_index(&self) -> u64 {
        (self.id >> Self::WORKER_SHIFT) & Self::WORKER_MASK
    }

    /// Extracts the 12-bit sequence number.
    #[must_use]
    pub const fn sequence_index(&self) -> u64 {
        (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
    }

    /// Returns the maximum possible value for the sequence field.
    #[must_use]
    pub const fn max_sequence() -> u64 {
        Self::SEQUENCE_MASK
    }

    /// Returns the maximum possible value for the timestamp field.
    #[must_use]
    pub const fn max_timestamp() -> u64 {
        Self::TIMESTAMP_MASK
    }

    /// Returns every field decoded, for diagnostics and API responses.
    #[must_use]
    pub fn details(&self) -> GuidDetails {
        GuidDetails {
            guid: *self,
            timestamp: self.created_at_millis(),
            time_str: self.created_at_formatted(),
            data_center: self.datacenter_index(),
            worker: self.worker_index(),
            sequence: self.sequence_index(),
        }
    }

    /// A representative identifier used in documentation examples.
    ///
    /// Issued 2023-03-10T06:33:49.894Z by datacenter 1, worker 23, sequence 1.
    pub const SAMPLE: Self = Self {
        id: 4_731_797_472_099_266_561,
    };
}

/// All decoded fields of a [`Guid`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GuidDetails {
    pub guid: Guid,
    pub timestamp: u64,
    pub time_str: String,
    pub data_center: u64,
    pub worker: u64,
    pub sequence: u64,
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl FromStr for Guid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<u64> for Guid {
    type Error = Error;

    fn try_from(value: u64) -> Result<Self> {
        Self::verified(value)
    }
}

impl From<Guid> for u64 {
    fn from(guid: Guid) -> Self {
        guid.id
    }
}

impl Validated for Guid {
    const TYPE_NAME: &'static str = "GUID";

    fn try_construct(input: &Value) -> Result<Option<Self>> {
        match input {
            Value::Number(n) => {
                if let Some(value) = n.as_u64() {
                    Self::verified(value).map(Some)
                } else if let Some(value) = n.as_i64() {
                    Self::from_signed(value).map(Some)
                } else {
                    Ok(None)
                }
            }
            Value::String(s) => Self::parse(s).map(Some),
            _ => Ok(None),
        }
    }

    fn schema() -> SchemaFragment {
        SchemaFragment::string(vec![
            json!(Self::SAMPLE.to_string()),
            json!(Self::SAMPLE.to_raw()),
        ])
    }
}

impl Serialize for Guid {
    fn serialize<S: Serializer>(&self, s: S) -> core::result::Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Guid {
    fn deserialize<D: Deserializer<'de>>(d: D) -> core::result::Result<Self, D::Error> {
        crate::deserialize_validated(d)
    }
}
