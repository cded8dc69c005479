use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub version: String,
    #[serde(default)]
    pub general: GeneralSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub resolver: ResolverSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            general: GeneralSettings::default(),
            database: DatabaseSettings::default(),
            resolver: ResolverSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralSettings {
    pub language: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            language: "es".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseSettings {
    /// Relative paths are resolved against the data directory.
    pub path: String,
    #[serde(default = "default_seed_demo_data")]
    pub seed_demo_data: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "extraworks.db".to_string(),
            seed_demo_data: true,
        }
    }
}

fn default_seed_demo_data() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolverSettings {
    pub min_confidence: f32,
    pub suggestion_threshold: f32,
    pub contextual_suggestions: bool,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            min_confidence: 0.3,
            suggestion_threshold: 0.3,
            contextual_suggestions: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
