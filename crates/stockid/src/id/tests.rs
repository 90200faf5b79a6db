use crate::{Allocator, AllocatorStats, Candidate, EPOCH_MILLIS, Error, Guid, Validated};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};

const SAMPLE_BITS: u64 =
    0b0_10000011010101010111000101110110001000110_01_00010111_000000000001;

struct CountingAllocator {
    next: AtomicU64,
}

#[derive(Debug, thiserror::Error)]
#[error("allocator offline")]
struct Offline;

impl Allocator for CountingAllocator {
    type Error = Offline;

    async fn fetch_raw_identifier(&self) -> Result<u64, Self::Error> {
        Ok(self.next.fetch_add(1, Ordering::Relaxed))
    }

    async fn health_stats(&self) -> Result<AllocatorStats, Self::Error> {
        Ok(AllocatorStats::default())
    }
}

struct OfflineAllocator;

impl Allocator for OfflineAllocator {
    type Error = Offline;

    async fn fetch_raw_identifier(&self) -> Result<u64, Self::Error> {
        Err(Offline)
    }

    async fn health_stats(&self) -> Result<AllocatorStats, Self::Error> {
        Err(Offline)
    }
}

#[test]
fn sample_fields() {
    let id = Guid::from_integer(SAMPLE_BITS, true).unwrap();
    assert_eq!(id, Guid::SAMPLE);
    assert_eq!(id.datacenter_index(), 1);
    assert_eq!(id.worker_index(), 23);
    assert_eq!(id.sequence_index(), 1);
    assert_eq!(id.timestamp(), 1_128_148_429_894);
    assert_eq!(id.created_at_millis(), 1_128_148_429_894 + EPOCH_MILLIS);
    assert_eq!(
        id.created_at().to_rfc3339(),
        "2023-03-10T06:33:49.894+00:00"
    );
}

#[test]
fn components_roundtrip_and_mask() {
    let id = Guid::from_components(Guid::max_timestamp(), 3, 255, Guid::max_sequence());
    assert_eq!(id.timestamp(), Guid::max_timestamp());
    assert_eq!(id.datacenter_index(), 3);
    assert_eq!(id.worker_index(), 255);
    assert_eq!(id.sequence_index(), Guid::max_sequence());
    assert_eq!(id.to_raw() >> 63, 0);

    // Out-of-range components are masked, not spilled into neighbours.
    let id = Guid::from_components(0, 4, 256, 4096);
    assert_eq!(id.to_raw(), 0);
}

#[test]
fn structural_validity_is_top_two_bits() {
    for value in [
        0,
        1,
        1 << 61,
        (1 << 62) - 1,
        1 << 62,
        (1 << 62) | 12345,
        u64::MAX >> 1,
        1 << 63,
        (1 << 63) | (1 << 62),
        u64::MAX,
    ] {
        assert_eq!(Guid::is_structurally_valid(value), value >> 62 == 1, "{value}");
    }
}

#[test]
fn from_integer_verify_flag() {
    for value in [0, 42, u64::MAX, (1 << 63) | (1 << 62)] {
        assert!(matches!(
            Guid::from_integer(value, true),
            Err(Error::InvalidIdentifier { .. })
        ));
        let unchecked = Guid::from_integer(value, false).unwrap();
        assert_eq!(unchecked.to_raw(), value);
        assert!(!unchecked.is_valid());
    }
}

#[test]
fn from_signed_rejects_negative() {
    assert_eq!(
        Guid::from_signed(SAMPLE_BITS as i64).unwrap(),
        Guid::SAMPLE
    );
    assert_eq!(
        Guid::from_signed(-1),
        Err(Error::InvalidIdentifier {
            value: "-1".to_string()
        })
    );
}

#[test]
fn parse_roundtrip() {
    let text = Guid::SAMPLE.to_string();
    assert_eq!(text, "4731797472099266561");
    assert_eq!(Guid::parse(&text).unwrap(), Guid::SAMPLE);
    assert_eq!(text.parse::<Guid>().unwrap(), Guid::SAMPLE);

    let edge = Guid::from_components(Guid::max_timestamp(), 3, 255, Guid::max_sequence());
    assert_eq!(Guid::parse(&edge.to_string()).unwrap(), edge);
}

#[test]
fn parse_rejects_non_digits() {
    for input in [
        "",
        " 4731797472099266561",
        "4731797472099266561 ",
        "+4731797472099266561",
        "-4731797472099266561",
        "4731797472099266561.0",
        "0x41aab8bb11917001",
        "47317974720992665a1",
        "４７",
    ] {
        assert_eq!(
            Guid::parse(input),
            Err(Error::FormatError {
                input: input.to_string()
            }),
            "{input:?}"
        );
    }
}

#[test]
fn parse_rejects_structurally_invalid_digits() {
    for input in ["0", "42", "18446744073709551615", "99999999999999999999999"] {
        assert!(
            matches!(Guid::parse(input), Err(Error::InvalidIdentifier { .. })),
            "{input}"
        );
    }
}

#[test]
fn error_messages() {
    assert_eq!(
        Guid::parse("abc").unwrap_err().to_string(),
        "guid (abc) is not a number"
    );
    assert_eq!(
        Guid::parse("42").unwrap_err().to_string(),
        "invalid guid: 42"
    );
}

#[test]
fn matches_across_representations() {
    // Low ten bits clear, so the value is exact as an f64.
    let id = Guid::from_components(1_128_148_429_894, 1, 23, 0);
    let n = id.to_raw();
    assert!(id.is_valid());

    assert!(id.matches(id));
    assert!(id.matches(n));
    assert!(id.matches(n as i64));
    assert!(id.matches(n as f64));
    assert!(id.matches(n as f64 + 0.5));
    assert!(id.matches(n.to_string().as_str()));
    assert!(id.matches(&n.to_string()));

    assert!(!id.matches(Guid::SAMPLE));
    assert!(!id.matches(n + 1));
    assert!(!id.matches(-(n as i64)));
    assert!(!id.matches(f64::NAN));
    assert!(!id.matches(f64::INFINITY));
    assert!(!id.matches(-1.0));
    assert!(!id.matches((n + 1).to_string().as_str()));
    assert!(!id.matches(format!("0{n}").as_str()));
    assert!(!id.matches(format!(" {n}").as_str()));
}

#[test]
fn float_comparison_is_lossy_above_2_pow_53() {
    // The sample has sequence 1, which a double cannot represent at this
    // magnitude. Clients that coerce identifiers to numbers lose it.
    let n = Guid::SAMPLE.to_raw();
    assert!(!Guid::SAMPLE.matches(n as f64));
    assert!(Guid::SAMPLE.matches(n.to_string().as_str()));
}

#[test]
fn validated_accepts_integers_and_strings() {
    let n = Guid::SAMPLE.to_raw();
    assert_eq!(Guid::validate_value(&json!(n)).unwrap(), Guid::SAMPLE);
    assert_eq!(
        Guid::validate_value(&json!(n.to_string())).unwrap(),
        Guid::SAMPLE
    );
    assert_eq!(
        Guid::validate(Candidate::Typed(Guid::from_raw(7))).unwrap(),
        Guid::from_raw(7)
    );
}

#[test]
fn validated_rejects_bad_values() {
    assert!(matches!(
        Guid::validate_value(&json!(42)),
        Err(Error::InvalidIdentifier { .. })
    ));
    assert!(matches!(
        Guid::validate_value(&json!(-1)),
        Err(Error::InvalidIdentifier { .. })
    ));
    assert!(matches!(
        Guid::validate_value(&json!("12ab")),
        Err(Error::FormatError { .. })
    ));
}

#[test]
fn validated_unknown_shapes() {
    for (input, shape) in [
        (json!(true), "boolean"),
        (json!(null), "null"),
        (json!(4.7e18), "number"),
        (json!([1]), "array"),
        (json!({"id": 1}), "object"),
    ] {
        assert_eq!(Guid::try_construct(&input), Ok(None));
        assert_eq!(
            Guid::validate_value(&input),
            Err(Error::TypeMismatch {
                found: shape,
                target: "GUID"
            })
        );
    }
}

#[test]
fn schema_uses_sample() {
    assert_eq!(
        serde_json::to_value(Guid::schema()).unwrap(),
        json!({
            "type": "string",
            "examples": ["4731797472099266561", 4_731_797_472_099_266_561_u64]
        })
    );
}

#[test]
fn serde_uses_decimal_strings() {
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: Guid,
    }

    let row = Row { id: Guid::SAMPLE };
    let json = serde_json::to_value(&row).unwrap();
    assert_eq!(json, json!({"id": "4731797472099266561"}));
    assert_eq!(serde_json::from_value::<Row>(json).unwrap(), row);

    // Integers are accepted on the way in.
    let row: Row = serde_json::from_value(json!({"id": 4_731_797_472_099_266_561_u64})).unwrap();
    assert_eq!(row.id, Guid::SAMPLE);

    let err = serde_json::from_value::<Row>(json!({"id": "1"})).unwrap_err();
    assert_eq!(err.to_string(), "invalid guid: 1");
    let err = serde_json::from_value::<Row>(json!({"id": false})).unwrap_err();
    assert_eq!(err.to_string(), "boolean can not be converted to GUID");
}

#[test]
fn details_report_every_field() {
    let details = Guid::SAMPLE.details();
    assert_eq!(details.guid, Guid::SAMPLE);
    assert_eq!(details.timestamp, Guid::SAMPLE.created_at_millis());
    assert_eq!(details.data_center, 1);
    assert_eq!(details.worker, 23);
    assert_eq!(details.sequence, 1);
    assert_eq!(details.time_str, Guid::SAMPLE.created_at_formatted());

    let json = serde_json::to_value(&details).unwrap();
    assert_eq!(json["guid"], json!("4731797472099266561"));
}

#[test]
fn formatted_time_shape() {
    let formatted = Guid::SAMPLE.created_at_formatted();
    // Local timezone varies between machines; the shape does not.
    assert_eq!(formatted.len(), "2023-03-10 06:33:49".len());
    assert!(formatted.starts_with("2023-03-"));
    assert_eq!(&formatted[4..5], "-");
    assert_eq!(&formatted[10..11], " ");
    assert_eq!(&formatted[13..14], ":");
}

#[test]
fn debug_output() {
    assert_eq!(format!("{:?}", Guid::SAMPLE), "Guid(4731797472099266561)");
    let table = format!("{:#?}", Guid::SAMPLE);
    println!("{table}");
    assert!(table.contains("0x41aab8bb11917001"));
    assert!(table.contains("datacenter (2)"));
    assert!(table.contains("worker (8)"));
    assert!(table.contains("0x17"));
}

#[tokio::test]
async fn allocate_skips_verification() {
    let allocator = CountingAllocator {
        next: AtomicU64::new(5),
    };
    let first = Guid::allocate(&allocator).await.unwrap();
    let second = Guid::allocate(&allocator).await.unwrap();
    assert_eq!(first.to_raw(), 5);
    assert_eq!(second.to_raw(), 6);
    assert!(!first.is_valid());
}

#[tokio::test]
async fn allocate_surfaces_allocator_errors() {
    let err = Guid::allocate(&OfflineAllocator).await.unwrap_err();
    assert_eq!(err.to_string(), "allocator offline");
}
