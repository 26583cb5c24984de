use serde::Deserialize;
use std::fs;

use crate::OutputFormat;

/// Defaults read from `--config` / `FINPLAN_CONFIG`. Command-line flags win.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub output: OutputFormat,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            output: OutputFormat::Json,
            log_filter: "warn".to_string(),
        }
    }
}

impl CliConfig {
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config '{}': {}", path, e))?;
        let config: CliConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config '{}': {}", path, e))?;
        Ok(config)
    }
}
