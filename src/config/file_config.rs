use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub db_path: Option<String>,
    pub export_dir: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<String>,

    // Record defaults
    pub default_genre: Option<String>,
    pub unknown_artist: Option<String>,

    pub harvest: Option<HarvestConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct HarvestConfig {
    /// Phrases that introduce an attribution paragraph, e.g. "Music provided by".
    pub credit_markers: Option<Vec<String>>,
    /// Genre names recognised in free text. Replaces the built-in list.
    pub genres: Option<Vec<String>>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
