use super::{
    MAX_ALLOCATIONS_IN_FLIGHT, RecordError, RuleStatus, RuleType, StorageLocationType,
    check_comment, check_name,
};
use futures::{StreamExt, TryStreamExt, stream};
use serde::{Deserialize, Serialize};
use stockid::{Allocator, Guid};

/// Name given to a rule submitted without one.
pub const DEFAULT_RULE_NAME: &str = "Unnamed Storage Rule";

fn default_rule_status() -> RuleStatus {
    RuleStatus::Disabled
}

fn default_rule_type() -> RuleType {
    RuleType::AllForbid
}

fn default_location_type() -> StorageLocationType {
    StorageLocationType::Room
}

/// A storage rule as submitted for creation, with the locations it lists.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewStorageRule {
    #[serde(default)]
    pub rule_name: Option<String>,
    #[serde(default = "default_rule_status")]
    pub rule_status: RuleStatus,
    #[serde(default = "default_rule_type")]
    pub rule_type: RuleType,
    #[serde(default)]
    pub rule_comment: Option<String>,
    #[serde(default)]
    pub records: Vec<NewRuleRecord>,
}

/// One location/category pair listed by a rule.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewRuleRecord {
    #[serde(default = "default_location_type")]
    pub storage_location_type: StorageLocationType,
    /// A room or cabinet identifier, per `storage_location_type`.
    pub storage_location: Guid,
    pub instrument_category: Guid,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StorageRule {
    pub rule_id: Guid,
    pub rule_name: String,
    pub rule_status: RuleStatus,
    pub rule_type: RuleType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_comment: Option<String>,
    pub records: Vec<RuleRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RuleRecord {
    pub record_id: Guid,
    pub storage_rule: Guid,
    pub storage_location_type: StorageLocationType,
    pub storage_location: Guid,
    pub instrument_category: Guid,
}

impl NewStorageRule {
    /// Deserializes and checks a storage rule submitted as JSON.
    pub fn from_json(input: &str) -> Result<Self, RecordError> {
        let rule: Self = serde_json::from_str(input)?;
        rule.check()?;
        Ok(rule)
    }

    fn check(&self) -> Result<(), RecordError> {
        if let Some(name) = &self.rule_name {
            check_name("rule_name", name)?;
        }
        check_comment("rule_comment", self.rule_comment.as_deref())
    }

    /// Assigns identifiers to the rule and each of its records. Record
    /// identifiers are requested concurrently; the first failure aborts the
    /// whole rule.
    pub async fn create<A: Allocator>(self, allocator: &A) -> Result<StorageRule, RecordError> {
        self.check()?;
        let rule_id = Guid::allocate(allocator)
            .await
            .map_err(RecordError::allocation)?;

        let records: Vec<RuleRecord> = stream::iter(self.records)
            .map(|record| async move {
                let record_id = Guid::allocate(allocator)
                    .await
                    .map_err(RecordError::allocation)?;
                Ok::<_, RecordError>(RuleRecord {
                    record_id,
                    storage_rule: rule_id,
                    storage_location_type: record.storage_location_type,
                    storage_location: record.storage_location,
                    instrument_category: record.instrument_category,
                })
            })
            .buffered(MAX_ALLOCATIONS_IN_FLIGHT)
            .try_collect()
            .await?;

        tracing::info!(%rule_id, records = records.len(), "storage rule created");
        Ok(StorageRule {
            rule_id,
            rule_name: self
                .rule_name
                .unwrap_or_else(|| DEFAULT_RULE_NAME.to_string()),
            rule_status: self.rule_status,
            rule_type: self.rule_type,
            rule_comment: self.rule_comment,
            records,
        })
    }
}
