use super::{CabinetStatus, RecordError, check_comment, check_name};
use serde::{Deserialize, Serialize};
use stockid::{Allocator, Guid};

/// Name given to a cabinet submitted without one. Applied after the name
/// check, which rejects its space.
pub const DEFAULT_CABINET_NAME: &str = "Unnamed Cabinet";

fn default_cabinet_status() -> CabinetStatus {
    CabinetStatus::Disabled
}

/// A cabinet as submitted for creation.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewCabinet {
    /// The room holding the cabinet.
    pub located_room: Guid,
    #[serde(default)]
    pub cabinet_name: Option<String>,
    #[serde(default)]
    pub cabinet_comment: Option<String>,
    /// Capacity. Use a very large value for an unbounded cabinet.
    pub max_number: u64,
    #[serde(default)]
    pub current_number: u64,
    #[serde(default = "default_cabinet_status")]
    pub status: CabinetStatus,
}

/// A created cabinet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Cabinet {
    pub cabinet_id: Guid,
    pub located_room: Guid,
    pub cabinet_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cabinet_comment: Option<String>,
    pub max_number: u64,
    pub current_number: u64,
    pub status: CabinetStatus,
}

impl NewCabinet {
    /// Deserializes and checks a cabinet submitted as JSON.
    pub fn from_json(input: &str) -> Result<Self, RecordError> {
        let cabinet: Self = serde_json::from_str(input)?;
        cabinet.check()?;
        Ok(cabinet)
    }

    fn check(&self) -> Result<(), RecordError> {
        if let Some(name) = &self.cabinet_name {
            check_name("cabinet_name", name)?;
        }
        check_comment("cabinet_comment", self.cabinet_comment.as_deref())?;
        if self.max_number == 0 {
            return Err(RecordError::NotPositive {
                field: "max_number",
            });
        }
        if self.current_number > self.max_number {
            return Err(RecordError::OverCapacity {
                current: self.current_number,
                max: self.max_number,
            });
        }
        Ok(())
    }

    /// Assigns the cabinet an identifier. Nothing is allocated for a cabinet
    /// that fails its checks.
    pub async fn create<A: Allocator>(self, allocator: &A) -> Result<Cabinet, RecordError> {
        self.check()?;
        let cabinet_id = Guid::allocate(allocator)
            .await
            .map_err(RecordError::allocation)?;

        let status = if self.current_number == self.max_number {
            CabinetStatus::FullLoad
        } else {
            self.status
        };

        let cabinet_name = self
            .cabinet_name
            .unwrap_or_else(|| DEFAULT_CABINET_NAME.to_string());

        tracing::info!(%cabinet_id, cabinet_name = %cabinet_name, "cabinet created");
        Ok(Cabinet {
            cabinet_id,
            located_room: self.located_room,
            cabinet_name,
            cabinet_comment: self.cabinet_comment,
            max_number: self.max_number,
            current_number: self.current_number,
            status,
        })
    }
}
