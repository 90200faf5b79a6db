//! Inventory records and the path that creates them.
//!
//! Creation always runs the same steps: deserialize external JSON (every
//! [`Guid`](stockid::Guid) and enumeration field goes through its validation
//! capability), check the record's own constraints, then ask the allocator
//! for the new record's identifier.

mod cabinet;
mod rule;
mod status;

pub use cabinet::*;
pub use rule::*;
pub use status::*;

/// Longest accepted record name, in characters.
pub const NAME_MAX_CHARS: usize = 64;

/// Longest accepted free-text comment, in characters.
pub const COMMENT_MAX_CHARS: usize = 255;

/// Most allocator calls a single command keeps open at once.
pub const MAX_ALLOCATIONS_IN_FLIGHT: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("invalid record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} may only contain Chinese characters, ASCII letters, digits, '_' and '-'")]
    InvalidName { field: &'static str },

    #[error("{field} is longer than {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} must be greater than 0")]
    NotPositive { field: &'static str },

    #[error("current_number ({current}) is greater than max_number ({max})")]
    OverCapacity { current: u64, max: u64 },

    #[error("identifier allocation failed")]
    Allocation(#[source] Box<dyn core::error::Error + Send + Sync>),
}

impl RecordError {
    pub(crate) fn allocation<E>(err: E) -> Self
    where
        E: core::error::Error + Send + Sync + 'static,
    {
        Self::Allocation(Box::new(err))
    }
}

pub(crate) fn check_name(field: &'static str, name: &str) -> Result<(), RecordError> {
    if name.trim().is_empty() {
        return Err(RecordError::Empty { field });
    }
    if name.chars().count() > NAME_MAX_CHARS {
        return Err(RecordError::TooLong {
            field,
            max: NAME_MAX_CHARS,
        });
    }
    if !name.chars().all(is_name_char) {
        return Err(RecordError::InvalidName { field });
    }
    Ok(())
}

/// CJK unified ideographs (U+4E00..=U+9FA5), ASCII letters and digits, `_`
/// and `-`.
fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || ('\u{4e00}'..='\u{9fa5}').contains(&c) || matches!(c, '_' | '-')
}

pub(crate) fn check_comment(field: &'static str, comment: Option<&str>) -> Result<(), RecordError> {
    match comment {
        Some(text) if text.chars().count() > COMMENT_MAX_CHARS => Err(RecordError::TooLong {
            field,
            max: COMMENT_MAX_CHARS,
        }),
        _ => Ok(()),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert!(check_name("cabinet_name", "Cabinet_1").is_ok());
        assert!(check_name("cabinet_name", "储物柜-2").is_ok());
        for name in ["имя", "اسم", "x²", "Cabinet 1", "ｃａｂ"] {
            assert!(
                matches!(
                    check_name("cabinet_name", name),
                    Err(RecordError::InvalidName { .. })
                ),
                "{name} accepted"
            );
        }
        assert!(matches!(
            check_name("cabinet_name", "  "),
            Err(RecordError::Empty { field: "cabinet_name" })
        ));
        assert!(matches!(
            check_name("cabinet_name", "a/b"),
            Err(RecordError::InvalidName { .. })
        ));
        let long = "x".repeat(NAME_MAX_CHARS + 1);
        assert_eq!(
            check_name("rule_name", &long).unwrap_err().to_string(),
            "rule_name is longer than 64 characters"
        );
    }

    #[test]
    fn comments() {
        assert!(check_comment("rule_comment", None).is_ok());
        assert!(check_comment("rule_comment", Some("")).is_ok());
        let long = "x".repeat(COMMENT_MAX_CHARS + 1);
        assert!(matches!(
            check_comment("rule_comment", Some(&long)),
            Err(RecordError::TooLong { max: 255, .. })
        ));
    }
}
