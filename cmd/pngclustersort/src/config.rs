//! Run settings, loadable from a YAML or JSON file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gvm::ReduceOptions;
use serde::Deserialize;

/// Everything a run needs besides the input image.
///
/// ```yaml
/// clusters: 128
/// columns: 256
/// out_dir: out
/// reduce:
///   max_variance: 40.0
///   min_clusters: 8
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Cluster capacity.
    pub clusters: usize,

    /// Width of the output images.
    pub columns: usize,

    /// Directory receiving `clusters.png` and `sorted.png`.
    pub out_dir: PathBuf,

    /// Post-clustering reduction, skipped when absent.
    pub reduce: Option<ReduceOptions>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            clusters: 256,
            columns: 256,
            out_dir: PathBuf::from("."),
            reduce: None,
        }
    }
}

impl Settings {
    /// Loads settings from a YAML or JSON file, chosen by extension.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("yaml");

        let settings = match ext.to_lowercase().as_str() {
            "json" => serde_json::from_str(&content)?,
            _ => serde_yaml::from_str(&content)?,
        };
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.clusters > 0, "clusters must be positive");
        anyhow::ensure!(self.columns > 0, "columns must be positive");
        anyhow::ensure!(
            u32::try_from(self.columns).is_ok(),
            "columns too large: {}",
            self.columns
        );
        Ok(())
    }
}
