//! Parser for processing configuration files
//!
//! YAML and JSON are both accepted; the file extension picks the parser.

use crate::config::{ConfigFormat, ProcessingConfig};
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Load and validate a processing configuration file
///
/// # Examples
///
/// ```ignore
/// let config = load_config("./sync.yaml")?;
/// let config = load_config("./sync.json")?;
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ProcessingConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::config(format!("Configuration file '{}' not found", path.display()))
        } else {
            Error::config(format!(
                "Failed to read configuration file '{}': {}",
                path.display(),
                e
            ))
        }
    })?;
    load_config_from_str(&content, ConfigFormat::from_path(path))
}

/// Load and validate a processing configuration from a string
pub fn load_config_from_str(content: &str, format: ConfigFormat) -> Result<ProcessingConfig> {
    let config: ProcessingConfig = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse configuration YAML: {e}")))?,
        ConfigFormat::Json => serde_json::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse configuration JSON: {e}")))?,
    };

    config.validate()?;
    Ok(config)
}
