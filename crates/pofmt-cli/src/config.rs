use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::CliError;

/// Project-wide defaults, overridable per invocation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub exact_match: bool,
    pub allow_empty_translations: bool,
    pub allow_fuzzy: bool,
    pub formattable_strings: bool,
    pub generated_dir: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            exact_match: false,
            allow_empty_translations: true,
            allow_fuzzy: true,
            formattable_strings: false,
            generated_dir: "generated".to_string(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<CliConfig, CliError> {
    let contents = fs::read_to_string(path)?;
    let config = toml::from_str(&contents)?;
    Ok(config)
}

pub fn load_config_or_default(path: &Path) -> Result<CliConfig, CliError> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(CliConfig::default())
    }
}
