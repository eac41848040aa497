//! Pipeline configuration.
//!
//! A [`PipelineConfig`] is built once at startup and passed by reference to
//! every stage. It deserializes from TOML; all fields have defaults that
//! reproduce the reference run over `raw_data/`.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Default date format accepted for raw birth and analysis dates.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Default number of merged rows shown in the preview table.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// A named source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub name: String,
    pub path: PathBuf,
}

impl SourceSpec {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

impl FromStr for SourceSpec {
    type Err = ModelError;

    /// Parses `NAME=PATH`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let Some((name, path)) = value.split_once('=') else {
            return Err(ModelError::InvalidSourceSpec {
                value: value.to_string(),
            });
        };
        let name = name.trim();
        let path = path.trim();
        if name.is_empty() || path.is_empty() {
            return Err(ModelError::InvalidSourceSpec {
                value: value.to_string(),
            });
        }
        Ok(Self::new(name, path))
    }
}

/// Settings for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Sources in merge order.
    pub sources: Vec<SourceSpec>,
    /// Destination of the merged CSV.
    pub output: PathBuf,
    /// Directory for chart images.
    pub charts_dir: PathBuf,
    /// Whether charts are rendered.
    pub charts: bool,
    /// Year used for age derivation. `None` means the current year.
    pub reference_year: Option<i32>,
    /// The single format accepted for raw dates (chrono syntax).
    pub date_format: String,
    /// Merged rows shown in the terminal preview.
    pub preview_rows: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            output: PathBuf::from("processed_data/combined_data.csv"),
            charts_dir: PathBuf::from("processed_data/charts"),
            charts: true,
            reference_year: None,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

impl PipelineConfig {
    /// The year ages are computed against.
    #[must_use]
    pub fn effective_reference_year(&self) -> i32 {
        self.reference_year.unwrap_or_else(|| Local::now().year())
    }

    /// Checks settings that serde cannot.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.sources.is_empty() {
            return Err(ModelError::NoSources);
        }
        for (idx, source) in self.sources.iter().enumerate() {
            if self.sources[..idx]
                .iter()
                .any(|other| other.name.eq_ignore_ascii_case(&source.name))
            {
                return Err(ModelError::DuplicateSource {
                    name: source.name.clone(),
                });
            }
        }
        if self.date_format.trim().is_empty() {
            return Err(ModelError::EmptyDateFormat);
        }
        Ok(())
    }
}

fn default_sources() -> Vec<SourceSpec> {
    ["covid", "dengue", "influenza"]
        .into_iter()
        .map(|name| SourceSpec::new(name, format!("raw_data/{name}.csv")))
        .collect()
}
