//! Alternative serde representations for [`Guid`].
//!
//! The default `Serialize` impl writes the decimal string, which is what every
//! external API sees. Paths that are 64-bit safe end to end (binary formats,
//! an internal queue) can opt into the native integer with
//! `#[serde(with = "stockid::wire::as_native")]`.
//!
//! [`Guid`]: crate::Guid

pub mod as_native {
    use crate::Guid;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a [`Guid`] as its native `u64`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &Guid, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        id.to_raw().serialize(s)
    }

    /// Deserialize a [`Guid`] from its native `u64`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying deserializer fails
    /// - The value is not structurally valid
    pub fn deserialize<'de, D>(d: D) -> Result<Guid, D::Error>
    where
        D: Deserializer<'de>,
    {
        let n = u64::deserialize(d)?;
        Guid::try_from(n).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use crate::Guid;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Internal {
        #[serde(with = "super::as_native")]
        id: Guid,
    }

    #[test]
    fn native_integer_form() {
        let row = Internal { id: Guid::SAMPLE };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json, json!({"id": 4_731_797_472_099_266_561_u64}));
        assert_eq!(serde_json::from_value::<Internal>(json).unwrap(), row);
    }

    #[test]
    fn rejects_invalid_integers() {
        let err = serde_json::from_value::<Internal>(json!({"id": 42})).unwrap_err();
        assert_eq!(err.to_string(), "invalid guid: 42");
    }

    #[test]
    fn rejects_strings() {
        assert!(serde_json::from_value::<Internal>(json!({"id": "4731797472099266561"})).is_err());
    }
}
