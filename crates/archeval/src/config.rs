//! CLI configuration loaded from `.archeval.toml` next to the model file.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const CONFIG_FILE_NAME: &str = ".archeval.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
        }
    }
}

fn default_format() -> String {
    "text".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    #[serde(default = "default_template_version")]
    pub template_version: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            template_version: default_template_version(),
        }
    }
}

fn default_template_version() -> String {
    "0.1.0".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Load `.archeval.toml` from the given directory, falling back to the
    /// defaults when it does not exist. A present but malformed config is
    /// reported as a warning, not an error.
    pub fn load_or_default(dir: &Path) -> Self {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if !candidate.exists() {
            return Self::default();
        }
        match Self::load(&candidate) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: {e:#}; using defaults");
                Self::default()
            }
        }
    }

    pub fn default_toml() -> &'static str {
        r#"# archeval configuration

[output]
# report format: "text" or "json"
format = "text"

[export]
# version stamped into exported service templates
template_version = "0.1.0"
"#
    }
}
