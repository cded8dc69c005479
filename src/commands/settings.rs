use std::path::Path;

use crate::models::Settings;
use crate::utils::config;

pub fn get_settings(data_dir: &Path) -> Result<Settings, String> {
    config::load_settings(data_dir).map_err(|e| e.to_string())
}

pub fn update_settings(data_dir: &Path, settings: &Settings) -> Result<(), String> {
    config::save_settings(data_dir, settings).map_err(|e| e.to_string())
}
