use std::env;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use crate::flattener::AbsentTypeFlags;
use crate::openbeta_client::queries::AREAS_PAGE_SIZE;
use crate::row_filter::TypeFlag;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config file {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Top-level export configuration, loaded from `config.yaml` and then
/// adjusted by environment variables and CLI flags.
#[derive(Clone, Debug, Default, Validate, Serialize, Deserialize)]
pub struct ExportConfig {
    #[validate(nested)]
    #[serde(default)]
    pub export: ExportSection,

    /// Optional row filter. Absent means every climb is exported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterConfig>,
}

#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
pub struct ExportSection {
    /// OpenBeta GraphQL endpoint
    #[validate(length(min = 1, message = "API URL cannot be empty"))]
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Areas fetched per page (the API caps this at 500)
    #[validate(range(min = 1, max = 500, message = "page size must be between 1 and 500"))]
    #[serde(default = "default_page_size")]
    pub page_size: i64,

    /// Emit the free-text description column
    #[serde(default = "default_true")]
    pub include_description: bool,

    /// Whether discipline flags missing from the source become null or false
    #[serde(default)]
    pub absent_type_flags: AbsentTypeFlags,

    /// Rows of the sample table printed after an export
    #[validate(range(max = 100, message = "sample rows capped at 100"))]
    #[serde(default = "default_sample_rows")]
    pub sample_rows: usize,

    #[validate(nested)]
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Parquet output path
    #[validate(length(min = 1, message = "output filename cannot be empty"))]
    #[serde(default = "default_filename")]
    pub filename: String,

    #[serde(default)]
    pub compression: CompressionKind,

    /// Summary JSON written next to the Parquet file
    #[validate(length(min = 1, message = "stats filename cannot be empty"))]
    #[serde(default = "default_stats_filename")]
    pub stats_filename: String,
}

/// Row filter section: every listed test must hold for a climb to be kept.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Restrict to these country-level path tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countries: Option<Vec<String>>,

    /// Discipline flags that must be true
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub climb_types: Option<Vec<TypeFlag>>,
}

/// Parquet compression codec names as accepted in config and on the CLI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionKind {
    #[default]
    Snappy,
    Zstd,
    Gzip,
    Lz4,
    #[serde(rename = "none", alias = "uncompressed")]
    Uncompressed,
}

impl CompressionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CompressionKind::Snappy => "snappy",
            CompressionKind::Zstd => "zstd",
            CompressionKind::Gzip => "gzip",
            CompressionKind::Lz4 => "lz4",
            CompressionKind::Uncompressed => "none",
        }
    }
}

impl FromStr for CompressionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "snappy" => Ok(CompressionKind::Snappy),
            "zstd" => Ok(CompressionKind::Zstd),
            "gzip" => Ok(CompressionKind::Gzip),
            "lz4" => Ok(CompressionKind::Lz4),
            "none" | "uncompressed" => Ok(CompressionKind::Uncompressed),
            other => Err(format!(
                "unknown compression '{other}' (expected snappy, zstd, gzip, lz4 or none)"
            )),
        }
    }
}

/// CLI overrides applied on top of the loaded configuration.
#[derive(Clone, Debug, Default)]
pub struct CliOverrides {
    pub output: Option<String>,
    pub compression: Option<CompressionKind>,
    pub countries: Vec<String>,
    pub no_description: bool,
    pub sample_rows: Option<usize>,
}

impl Default for ExportSection {
    fn default() -> Self {
        ExportSection {
            api_url: default_api_url(),
            page_size: default_page_size(),
            include_description: true,
            absent_type_flags: AbsentTypeFlags::default(),
            sample_rows: default_sample_rows(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            filename: default_filename(),
            compression: CompressionKind::default(),
            stats_filename: default_stats_filename(),
        }
    }
}

impl ExportConfig {
    /// Load and validate a YAML configuration file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_display = path.as_ref().display().to_string();
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path_display.clone(),
            source,
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path_display,
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Environment overrides. Only the endpoint is env-controlled; everything
    /// else lives in the config file or on the CLI.
    pub fn apply_env(&mut self) {
        if let Ok(url) = env::var("OPENBETA_API_URL") {
            if !url.is_empty() {
                self.export.api_url = url;
            }
        }
    }

    /// Apply CLI overrides and re-validate the merged result.
    pub fn apply_overrides(&mut self, overrides: CliOverrides) -> Result<(), ConfigError> {
        if let Some(filename) = overrides.output {
            self.export.output.filename = filename;
        }
        if let Some(compression) = overrides.compression {
            self.export.output.compression = compression;
        }
        if !overrides.countries.is_empty() {
            self.filter
                .get_or_insert_with(FilterConfig::default)
                .countries = Some(overrides.countries);
        }
        if overrides.no_description {
            self.export.include_description = false;
        }
        if let Some(sample_rows) = overrides.sample_rows {
            self.export.sample_rows = sample_rows;
        }

        self.validate()?;
        Ok(())
    }
}

fn default_api_url() -> String {
    "https://api.openbeta.io".to_string()
}

fn default_page_size() -> i64 {
    AREAS_PAGE_SIZE
}

fn default_true() -> bool {
    true
}

fn default_sample_rows() -> usize {
    5
}

fn default_filename() -> String {
    "openbeta-climbs.parquet".to_string()
}

fn default_stats_filename() -> String {
    "export-stats.json".to_string()
}
