use crate::Guid;

/// A wire-format value an identifier can be compared against.
///
/// Identifiers travel as decimal strings, JSON numbers (possibly already
/// coerced to doubles by a client), database integers, or typed values.
/// [`Guid::matches`] is the single place those representations are compared;
/// `==` on [`Guid`] stays same-type only.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Comparand<'a> {
    Guid(Guid),
    Unsigned(u64),
    Signed(i64),
    /// Compared by truncation toward zero; never matches when not finite.
    Float(f64),
    /// Compared against the canonical decimal form, byte for byte.
    Text(&'a str),
}

impl From<Guid> for Comparand<'_> {
    fn from(value: Guid) -> Self {
        Self::Guid(value)
    }
}

impl From<u64> for Comparand<'_> {
    fn from(value: u64) -> Self {
        Self::Unsigned(value)
    }
}

impl From<i64> for Comparand<'_> {
    fn from(value: i64) -> Self {
        Self::Signed(value)
    }
}

impl From<f64> for Comparand<'_> {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl<'a> From<&'a str> for Comparand<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(value)
    }
}

impl<'a> From<&'a String> for Comparand<'a> {
    fn from(value: &'a String) -> Self {
        Self::Text(value.as_str())
    }
}

impl Guid {
    /// Cross-representation equality.
    ///
    /// # Example
    ///
    /// ```
    /// use stockid::Guid;
    ///
    /// let id = Guid::SAMPLE;
    /// assert!(id.matches(4_731_797_472_099_266_561_u64));
    /// assert!(id.matches("4731797472099266561"));
    /// assert!(!id.matches("04731797472099266561"));
    /// ```
    pub fn matches<'a>(&self, other: impl Into<Comparand<'a>>) -> bool {
        let raw = self.to_raw();
        match other.into() {
            Comparand::Guid(other) => raw == other.to_raw(),
            Comparand::Unsigned(other) => raw == other,
            Comparand::Signed(other) => i128::from(raw) == i128::from(other),
            Comparand::Float(other) => {
                // `as` saturates, so only finite values inside the u64 range
                // can compare equal.
                other.is_finite()
                    && other.trunc() >= 0.0
                    && other.trunc() < 18_446_744_073_709_551_616.0
                    && raw == other.trunc() as u64
            }
            Comparand::Text(other) => self.to_string() == other,
        }
    }
}
