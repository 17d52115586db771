use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::resolve::ResolveOptions;

/// Top-level project configuration loaded from `.oas-slice.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SliceConfig {
    pub input: String,
    pub format: OutputFormat,
    /// Endpoints used by `extract` when none are given on the command line.
    pub endpoints: Vec<String>,
    pub resolve: ResolveConfig,
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            format: OutputFormat::Yaml,
            endpoints: Vec::new(),
            resolve: ResolveConfig::default(),
        }
    }
}

/// Serialization format for command output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

/// Reference discovery settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Reject inline `allOf` members instead of skipping them.
    pub strict_composition: bool,
}

impl From<&ResolveConfig> for ResolveOptions {
    fn from(cfg: &ResolveConfig) -> Self {
        ResolveOptions {
            strict_composition: cfg.strict_composition,
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".oas-slice.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<SliceConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let display = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: display.clone(),
        source,
    })?;
    let config: SliceConfig = serde_yaml_ng::from_str(&content).map_err(|source| {
        ConfigError::Yaml {
            path: display,
            source,
        }
    })?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# oas-slice configuration
input: openapi.yaml
format: yaml          # yaml | json

# Endpoints extracted when `oas-slice extract` is run without arguments.
# A value matches any registered path that ends with it.
endpoints: []
  # - /users
  # - /orders/{id}

resolve:
  strict_composition: false   # fail on inline allOf members instead of skipping them
"#
}
