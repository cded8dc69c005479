use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parameter bag handed to an intent handler.
pub type Params = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionSuggestion {
    pub intent: String,
    pub score: f32,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub params: Params,
}

/// What a handler (or a failed resolution) hands back to the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set by `open_extrawork` so a UI can jump to the record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigate_to: Option<i64>,
}

impl ActionOutcome {
    /// Successful outcome carrying `data` as JSON. A payload that cannot be
    /// serialized turns the outcome into a failure.
    pub fn ok(data: impl Serialize, message: impl Into<String>) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => Self {
                success: true,
                data: Some(data),
                message: Some(message.into()),
                ..Self::default()
            },
            Err(err) => {
                log::error!("Failed to serialize action result: {}", err);
                Self::failure(format!("Failed to serialize result: {}", err))
            }
        }
    }

    pub fn failure(error: impl ToString) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentInfo {
    pub name: String,
    pub keywords: Vec<String>,
    pub description: String,
}

/// An identifier that may arrive as a JSON string ("EW-001", "7") or number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference {
    Number(i64),
    Text(String),
}

impl Reference {
    pub fn into_string(self) -> String {
        match self {
            Reference::Number(n) => n.to_string(),
            Reference::Text(s) => s.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionLogEntry {
    pub id: i64,
    pub query: Option<String>,
    pub intent: String,
    pub params: Params,
    pub success: bool,
    pub message: Option<String>,
    pub executed_at: i64,
}
