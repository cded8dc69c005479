use serde::{Deserialize, Serialize};

pub const AVAILABLE: &str = "available";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub availability: String,
    pub url: Option<String>,
    pub metadata: Option<String>,
    pub extra_work_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Resource {
    pub fn is_assigned(&self) -> bool {
        self.extra_work_id.is_some()
    }

    pub fn is_available(&self) -> bool {
        self.availability.eq_ignore_ascii_case(AVAILABLE)
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewResource {
    pub name: String,
    pub resource_type: String,
    pub availability: Option<String>,
    pub url: Option<String>,
    pub metadata: Option<String>,
    pub extra_work_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct ResourceChanges {
    pub name: Option<String>,
    pub resource_type: Option<String>,
    pub availability: Option<String>,
    pub url: Option<String>,
    pub metadata: Option<String>,
}

impl ResourceChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.resource_type.is_none()
            && self.availability.is_none()
            && self.url.is_none()
            && self.metadata.is_none()
    }
}
