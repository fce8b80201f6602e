//! Dashboard configuration.
//!
//! Read from the JSON file named by `CAR_DASH_CONFIG`, else `dashboard.json`
//! in the working directory when it exists, else built-in defaults.  Keys
//! left out of the file keep their defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::{PipelineConfig, Source};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "CAR_DASH_CONFIG";
/// File picked up from the working directory when the variable is unset.
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Listing file, relative to the working directory.
    pub source: PathBuf,
    /// Separator override for delimited sources (single ASCII character).
    pub delimiter: Option<char>,
    /// How long a loaded dataset is reused before the file is read again.
    pub cache_ttl_secs: u64,
    pub histogram_bins: usize,
    pub pipeline: PipelineConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("vehicles.csv"),
            delimiter: None,
            cache_ttl_secs: 3600,
            histogram_bins: 40,
            pipeline: PipelineConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Locate and load the configuration for this process.
    pub fn discover() -> Result<Self> {
        let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        Self::discover_from(explicit.as_deref(), Path::new(DEFAULT_CONFIG_FILE))
    }

    /// An explicitly named file must exist; the fallback file is optional.
    pub fn discover_from(explicit: Option<&Path>, fallback: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            log::info!("Using config {}", path.display());
            return Self::from_file(path);
        }
        if fallback.is_file() {
            log::info!("Using config {}", fallback.display());
            return Self::from_file(fallback);
        }
        log::debug!("No config file found; using defaults");
        Ok(Self::default())
    }

    fn validate(&self) -> Result<()> {
        if let Some(d) = self.delimiter {
            if !d.is_ascii() {
                bail!("delimiter must be a single ASCII character, got {d:?}");
            }
        }
        if self.histogram_bins == 0 {
            bail!("histogram_bins must be at least 1");
        }
        Ok(())
    }

    /// The configured listing source.
    pub fn source(&self) -> Source {
        // `validate` guarantees ASCII, so the cast keeps the byte intact.
        Source::new(&self.source).with_delimiter(self.delimiter.map(|d| d as u8))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config_file(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let file = config_file(
            r#"{ "cache_ttl_secs": 5, "pipeline": { "min_group_count": 50,
                 "required_columns": ["price", "manufacturer"] } }"#,
        );
        let config = DashboardConfig::from_file(file.path()).unwrap();
        assert_eq!(config.cache_ttl(), Duration::from_secs(5));
        assert_eq!(config.source, PathBuf::from("vehicles.csv"));
        assert_eq!(config.pipeline.min_group_count, 50);
        assert_eq!(config.pipeline.required_columns, vec!["price", "manufacturer"]);
        assert_eq!(config.pipeline.group_column, "manufacturer");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let file = config_file(r#"{ "sauce": "vehicles.csv" }"#);
        assert!(DashboardConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn non_ascii_delimiter_is_rejected() {
        let file = config_file(r#"{ "delimiter": "→" }"#);
        assert!(DashboardConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn delimiter_reaches_source() {
        let file = config_file(r#"{ "source": "data/cars.txt", "delimiter": ";" }"#);
        let source = DashboardConfig::from_file(file.path()).unwrap().source();
        assert_eq!(source, Source::new("data/cars.txt").with_delimiter(Some(b';')));
    }

    #[test]
    fn discovery_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("dashboard.json");
        let config = DashboardConfig::discover_from(None, &missing).unwrap();
        assert_eq!(config, DashboardConfig::default());

        assert!(DashboardConfig::discover_from(Some(&missing), &missing).is_err());
    }
}
