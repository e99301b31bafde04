//! Persisting configuration changes between runs

use super::types::ConfigPatch;
use crate::config::ConfigFormat;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

/// Applies a [`ConfigPatch`] to wherever the configuration lives
#[async_trait]
pub trait ConfigPatcher: Send + Sync {
    /// Persist the patch
    async fn patch_config(&self, patch: &ConfigPatch) -> Result<()>;
}

/// Discards patches, for embedders that read the patch from the sync report
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopConfigPatcher;

#[async_trait]
impl ConfigPatcher for NoopConfigPatcher {
    async fn patch_config(&self, _patch: &ConfigPatch) -> Result<()> {
        Ok(())
    }
}

/// Rewrites a YAML or JSON configuration file in place
///
/// Keys other than `datasetMode` and `dataset` are kept as they are.
#[derive(Debug, Clone)]
pub struct FileConfigPatcher {
    path: PathBuf,
}

impl FileConfigPatcher {
    /// Create a patcher for the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the patched file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ConfigPatcher for FileConfigPatcher {
    async fn patch_config(&self, patch: &ConfigPatch) -> Result<()> {
        let format = ConfigFormat::from_path(&self.path);
        let content = tokio::fs::read_to_string(&self.path).await?;

        let mut document: Value = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(&content)?,
            ConfigFormat::Json => serde_json::from_str(&content)?,
        };
        apply_patch(&mut document, patch)?;

        let output = match format {
            ConfigFormat::Yaml => serde_yaml::to_string(&document)?,
            ConfigFormat::Json => serde_json::to_string_pretty(&document)? + "\n",
        };
        tokio::fs::write(&self.path, output).await?;

        info!(
            "Switched {} to update mode on dataset '{}'",
            self.path.display(),
            patch.dataset.id
        );
        Ok(())
    }
}

/// Merge `patch` into a configuration document
pub fn apply_patch(document: &mut Value, patch: &ConfigPatch) -> Result<()> {
    let Value::Object(root) = document else {
        return Err(Error::config("configuration root must be a mapping"));
    };

    root.insert(
        "datasetMode".to_string(),
        serde_json::to_value(patch.dataset_mode)?,
    );

    let dataset = root
        .entry("dataset")
        .or_insert_with(|| Value::Object(serde_json::Map::new()));
    if !dataset.is_object() {
        *dataset = Value::Object(serde_json::Map::new());
    }
    if let Value::Object(dataset) = dataset {
        dataset.insert("id".to_string(), Value::String(patch.dataset.id.clone()));
        dataset.insert(
            "title".to_string(),
            Value::String(patch.dataset.title.clone()),
        );
    }
    Ok(())
}
