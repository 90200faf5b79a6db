use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Documentation metadata a validated type publishes for API docs.
///
/// Serializes to `{"type": "string", "enum": [...], "examples": [...]}`, with
/// `enum` omitted for open-ended types such as [`Guid`]. Nothing at runtime
/// reads it back; validation lives entirely in [`Validated::try_construct`].
///
/// [`Guid`]: crate::Guid
/// [`Validated::try_construct`]: crate::Validated::try_construct
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SchemaFragment {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<String>>,
    #[serde(default)]
    pub examples: Vec<Value>,
}

impl SchemaFragment {
    /// A `"string"` fragment with the given examples and no member list.
    pub fn string(examples: Vec<Value>) -> Self {
        Self {
            kind: "string".to_string(),
            members: None,
            examples,
        }
    }

    /// Attaches the closed list of allowed values.
    #[must_use]
    pub fn with_members(mut self, members: Vec<String>) -> Self {
        self.members = Some(members);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn open_fragment_omits_enum_key() {
        let fragment = SchemaFragment::string(vec![json!("1")]);
        assert_eq!(
            serde_json::to_value(&fragment).unwrap(),
            json!({"type": "string", "examples": ["1"]})
        );
    }

    #[test]
    fn closed_fragment_lists_members() {
        let fragment = SchemaFragment::string(vec![json!("ROOM"), json!(0)])
            .with_members(vec!["ROOM".into(), "CABINET".into()]);
        assert_eq!(
            serde_json::to_value(&fragment).unwrap(),
            json!({
                "type": "string",
                "enum": ["ROOM", "CABINET"],
                "examples": ["ROOM", 0]
            })
        );
    }
}
