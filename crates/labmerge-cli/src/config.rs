//! Run configuration: TOML file, then command-line overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use labmerge_model::{PipelineConfig, SourceSpec};

/// Settings given on the command line. Unset fields keep the file value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Replaces the configured sources when non-empty.
    pub sources: Vec<SourceSpec>,
    pub output: Option<PathBuf>,
    pub charts_dir: Option<PathBuf>,
    pub reference_year: Option<i32>,
    pub date_format: Option<String>,
    pub preview_rows: Option<usize>,
    pub no_charts: bool,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut PipelineConfig) {
        if !self.sources.is_empty() {
            config.sources = self.sources.clone();
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(dir) = &self.charts_dir {
            config.charts_dir = dir.clone();
        }
        if self.reference_year.is_some() {
            config.reference_year = self.reference_year;
        }
        if let Some(format) = &self.date_format {
            config.date_format = format.clone();
        }
        if let Some(rows) = self.preview_rows {
            config.preview_rows = rows;
        }
        if self.no_charts {
            config.charts = false;
        }
    }
}

/// Reads a TOML config file. Missing keys take their defaults.
pub fn load_config_file(path: &Path) -> Result<PipelineConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let config: PipelineConfig =
        toml::from_str(&content).with_context(|| format!("parse config {}", path.display()))?;
    debug!(path = %path.display(), sources = config.sources.len(), "config file loaded");
    Ok(config)
}

/// Builds the effective configuration for one run and validates it.
pub fn resolve_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<PipelineConfig> {
    let mut config = match path {
        Some(path) => load_config_file(path)?,
        None => PipelineConfig::default(),
    };
    overrides.apply(&mut config);
    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn flags_override_file_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "output = \"from_file.csv\"\nreference_year = 2020\n\n[[sources]]\nname = \"covid\"\npath = \"a.csv\""
        )
        .unwrap();

        let overrides = ConfigOverrides {
            reference_year: Some(2024),
            no_charts: true,
            ..ConfigOverrides::default()
        };
        let config = resolve_config(Some(file.path()), &overrides).unwrap();

        assert_eq!(config.output, PathBuf::from("from_file.csv"));
        assert_eq!(config.reference_year, Some(2024));
        assert!(!config.charts);
        assert_eq!(config.sources, vec![SourceSpec::new("covid", "a.csv")]);
    }

    #[test]
    fn source_flags_replace_defaults() {
        let overrides = ConfigOverrides {
            sources: vec![SourceSpec::new("malaria", "m.csv")],
            ..ConfigOverrides::default()
        };
        let config = resolve_config(None, &overrides).unwrap();
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].name, "malaria");
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let overrides = ConfigOverrides {
            date_format: Some("  ".to_string()),
            ..ConfigOverrides::default()
        };
        let error = resolve_config(None, &overrides).unwrap_err();
        assert!(format!("{error:#}").contains("invalid configuration"));
    }

    #[test]
    fn missing_config_file_names_the_path() {
        let error = resolve_config(Some(Path::new("does/not/exist.toml")), &ConfigOverrides::default())
            .unwrap_err();
        assert!(error.to_string().contains("does/not/exist.toml"));
    }
}
