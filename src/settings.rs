use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TallyError};
use crate::tagger::TagRuleSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default)]
    pub default_period: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            default_period: String::new(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("tally")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("tally")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| TallyError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn settings_file_exists() -> bool {
    settings_path().exists()
}

pub fn get_data_dir() -> PathBuf {
    PathBuf::from(&load_settings().data_dir)
}

// ---------------------------------------------------------------------------
// Read-only config inputs, loaded once per run from the data dir
// ---------------------------------------------------------------------------

/// Ordered matcher -> tag pairs. A missing file means an empty rule table,
/// not an error: imports then fall through to the default tag.
pub fn load_tag_rules(data_dir: &Path) -> Result<TagRuleSet> {
    let path = data_dir.join("tag_rules.json");
    if !path.exists() {
        return Ok(TagRuleSet::default());
    }
    let content = std::fs::read_to_string(&path)?;
    TagRuleSet::from_json(&content)
}

/// word -> replacement map applied to displayed text only, never to stored
/// ledger values.
pub type SensitiveWords = HashMap<String, String>;

pub fn load_sensitive_words(data_dir: &Path) -> Result<SensitiveWords> {
    let path = data_dir.join("sensitive_words.json");
    if !path.exists() {
        return Ok(SensitiveWords::new());
    }
    let content = std::fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&content)?)
}
