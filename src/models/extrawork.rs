use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Resource;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExtraWork {
    pub id: i64,
    pub code: String,
    pub title: String,
    pub description: String,
    pub status: ExtraWorkStatus,
    pub priority: Priority,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExtraWorkStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
    OnHold,
}

impl ExtraWorkStatus {
    pub const ALL: [ExtraWorkStatus; 5] = [
        ExtraWorkStatus::Pending,
        ExtraWorkStatus::InProgress,
        ExtraWorkStatus::Completed,
        ExtraWorkStatus::Cancelled,
        ExtraWorkStatus::OnHold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExtraWorkStatus::Pending => "pending",
            ExtraWorkStatus::InProgress => "in_progress",
            ExtraWorkStatus::Completed => "completed",
            ExtraWorkStatus::Cancelled => "cancelled",
            ExtraWorkStatus::OnHold => "on_hold",
        }
    }
}

impl fmt::Display for ExtraWorkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the canonical names plus the Spanish words the command palette
/// understands ("pendiente", "en progreso", "completado", ...).
impl FromStr for ExtraWorkStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "pending" | "pendiente" => Ok(ExtraWorkStatus::Pending),
            "in_progress" | "en_progreso" | "en_curso" => Ok(ExtraWorkStatus::InProgress),
            "completed" | "completado" | "completada" | "terminado" | "terminada" => {
                Ok(ExtraWorkStatus::Completed)
            }
            "cancelled" | "canceled" | "cancelado" | "cancelada" => Ok(ExtraWorkStatus::Cancelled),
            "on_hold" | "en_espera" | "pausado" | "pausada" => Ok(ExtraWorkStatus::OnHold),
            _ => Err(format!(
                "Invalid status \"{}\". Expected one of: {}",
                s,
                ExtraWorkStatus::ALL.map(|st| st.as_str()).join(", ")
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "baja" => Ok(Priority::Low),
            "medium" | "media" => Ok(Priority::Medium),
            "high" | "alta" => Ok(Priority::High),
            "critical" | "critica" | "crítica" => Ok(Priority::Critical),
            _ => Err(format!("Invalid priority \"{}\"", s)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewExtraWork {
    pub code: Option<String>,
    pub title: String,
    pub description: String,
    pub status: ExtraWorkStatus,
    pub priority: Priority,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ExtraWorkChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<ExtraWorkStatus>,
    pub priority: Option<Priority>,
}

impl ExtraWorkChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_spanish_and_canonical_names() {
        assert_eq!("in_progress".parse(), Ok(ExtraWorkStatus::InProgress));
        assert_eq!("En progreso".parse(), Ok(ExtraWorkStatus::InProgress));
        assert_eq!("completado".parse(), Ok(ExtraWorkStatus::Completed));
        assert_eq!("on-hold".parse(), Ok(ExtraWorkStatus::OnHold));
        assert!("archived".parse::<ExtraWorkStatus>().is_err());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&ExtraWorkStatus::OnHold).unwrap();
        assert_eq!(json, "\"on_hold\"");
    }
}
