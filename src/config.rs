//! Configuration for attest paths and policy thresholds.
//!
//! Configuration sources (highest priority first):
//! 1. CLI `--root` argument
//! 2. Environment variable (ATTEST_ROOT)
//! 3. Config file (.attest/config.yaml)
//! 4. Defaults (current directory, policy thresholds)
//!
//! Config file discovery:
//! - Searches current directory and parents for .attest/config.yaml
//! - Paths in the config file are relative to the pipeline root

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::consolidate::IntegrityThresholds;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub thresholds: Option<IntegrityThresholds>,
}

/// Per-artifact path overrides, relative to the pipeline root.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    pub manifest: Option<String>,
    pub quotes: Option<String>,
    pub validation_report: Option<String>,
    pub mapping: Option<String>,
    pub consolidated: Option<String>,
    pub crosswalk: Option<String>,
    pub consolidation_report: Option<String>,
}

/// Resolved configuration with absolute paths and final thresholds.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Pipeline root all artifact paths resolve against.
    pub root: PathBuf,
    /// Transcript manifest (JSON).
    pub manifest: PathBuf,
    /// Source quotes table.
    pub quotes: PathBuf,
    /// Quote-validation report output.
    pub validation_report: PathBuf,
    /// Tag-mapping payload (JSON).
    pub mapping: PathBuf,
    /// Consolidated quotes table.
    pub consolidated: PathBuf,
    /// Tag crosswalk table.
    pub crosswalk: PathBuf,
    /// Consolidation report (markdown) output.
    pub consolidation_report: PathBuf,
    /// Integrity policy bounds.
    pub thresholds: IntegrityThresholds,
    /// Path to the config file, if one was found.
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Load configuration from all sources.
    ///
    /// `cli_root` wins over `ATTEST_ROOT`, which wins over the directory
    /// holding a discovered `.attest/config.yaml`, which wins over the
    /// current directory.
    pub fn load(cli_root: Option<&Path>) -> Result<Self> {
        let config_path = find_config_file();
        let config_file = match &config_path {
            Some(path) => Some(load_config_file(path)?),
            None => None,
        };

        let root = match cli_root {
            Some(path) => path.to_path_buf(),
            None => match std::env::var_os("ATTEST_ROOT") {
                Some(var) => PathBuf::from(var),
                None => match &config_path {
                    // .attest/config.yaml -> the directory containing .attest
                    Some(path) => path
                        .parent()
                        .and_then(Path::parent)
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| PathBuf::from(".")),
                    None => std::env::current_dir().context("Could not resolve current directory")?,
                },
            },
        };

        Ok(Self::resolve(root, config_file, config_path))
    }

    /// Resolve a configuration against an explicit root, with no file or
    /// environment discovery. Used by tests and embedding callers.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self::resolve(root.into(), None, None)
    }

    fn resolve(
        root: PathBuf,
        config_file: Option<ConfigFile>,
        config_path: Option<PathBuf>,
    ) -> Self {
        let (paths, thresholds) = match config_file {
            Some(file) => (file.paths, file.thresholds.unwrap_or_default()),
            None => (PathsConfig::default(), IntegrityThresholds::default()),
        };

        let join = |override_path: Option<String>, default_name: &str| -> PathBuf {
            root.join(override_path.as_deref().unwrap_or(default_name))
        };

        Self {
            manifest: join(paths.manifest, "manifest.json"),
            quotes: join(paths.quotes, "quotes.csv"),
            validation_report: join(paths.validation_report, "quote-validation-report.csv"),
            mapping: join(paths.mapping, "tag-mapping.json"),
            consolidated: join(paths.consolidated, "consolidated-quotes.csv"),
            crosswalk: join(paths.crosswalk, "tag-crosswalk.csv"),
            consolidation_report: join(paths.consolidation_report, "tag-consolidation-report.md"),
            thresholds,
            config_file: config_path,
            root,
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".attest").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_relative_to_root() {
        let config = ResolvedConfig::for_root("/data/pipeline");
        assert_eq!(config.quotes, PathBuf::from("/data/pipeline/quotes.csv"));
        assert_eq!(
            config.validation_report,
            PathBuf::from("/data/pipeline/quote-validation-report.csv")
        );
        assert_eq!(config.thresholds.consolidated_count_min, 35);
    }

    #[test]
    fn test_config_file_overrides() {
        let yaml = r#"
version: "1"
paths:
  quotes: process/p1/quotes.csv
  crosswalk: process/p4/tag-crosswalk.csv
thresholds:
  consolidated_count_min: 20
  consolidated_count_max: 30
"#;
        let file: ConfigFile = serde_yaml::from_str(yaml).unwrap();
        let config = ResolvedConfig::resolve(PathBuf::from("/r"), Some(file), None);

        assert_eq!(config.quotes, PathBuf::from("/r/process/p1/quotes.csv"));
        assert_eq!(config.manifest, PathBuf::from("/r/manifest.json"));
        assert_eq!(config.thresholds.consolidated_count_min, 20);
        // Serde defaults fill whatever the file leaves out.
        assert_eq!(config.thresholds.max_dominant_row_ratio, 0.20);
    }
}
