use anyhow::Context;
use std::path::{Path, PathBuf};

use crate::models::Settings;

pub const ENV_DB_PATH: &str = "EXTRAWORKS_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "EXTRAWORKS_LOG_LEVEL";
pub const ENV_DATA_DIR: &str = "EXTRAWORKS_DATA_DIR";

const DEFAULT_DATA_DIR: &str = "data";

pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `--data-dir` wins, then `EXTRAWORKS_DATA_DIR`, then `./data`.
pub fn resolve_data_dir(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| env_value(ENV_DATA_DIR).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

pub fn settings_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config").join("settings.json")
}

/// Reads `config/settings.json` under `data_dir` (defaults when absent) and
/// applies environment overrides.
pub fn load_settings(data_dir: &Path) -> anyhow::Result<Settings> {
    let config_path = settings_path(data_dir);

    let mut settings = if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("reading {}", config_path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", config_path.display()))?
    } else {
        Settings::default()
    };

    apply_env_defaults(&mut settings);
    Ok(settings)
}

pub fn save_settings(data_dir: &Path, settings: &Settings) -> anyhow::Result<()> {
    let config_path = settings_path(data_dir);
    if let Some(config_dir) = config_path.parent() {
        std::fs::create_dir_all(config_dir)?;
    }

    let content = serde_json::to_string_pretty(settings)?;
    std::fs::write(&config_path, content)?;
    Ok(())
}

pub fn apply_env_defaults(settings: &mut Settings) {
    apply_overrides(settings, env_value);
}

fn apply_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(path) = lookup(ENV_DB_PATH) {
        settings.database.path = path;
    }
    if let Some(level) = lookup(ENV_LOG_LEVEL) {
        settings.logging.level = level;
    }
}

/// Relative database paths live under the data directory.
pub fn resolve_db_path(data_dir: &Path, settings: &Settings) -> PathBuf {
    let path = Path::new(&settings.database.path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        data_dir.join(path)
    }
}
