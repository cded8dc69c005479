use serde::{Deserialize, Serialize};

/// Result of running the text parser over one palette query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedQuery {
    pub original_query: String,
    pub intention: Option<String>,
    pub entities: QueryEntities,
}

impl ParsedQuery {
    pub fn new(original_query: &str) -> Self {
        Self {
            original_query: original_query.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryEntities {
    pub extra_work_id: Option<String>,
    pub extra_work_code: Option<String>,
    pub resource_name: Option<String>,
    pub resource_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub query: Option<String>,
}
