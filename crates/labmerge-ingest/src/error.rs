//! Error types for source ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading source extracts.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The file is missing, unreadable or not parseable as delimited data.
    #[error("source '{source_name}' unavailable at {path}: {reason}")]
    SourceUnavailable {
        source_name: String,
        path: PathBuf,
        reason: String,
    },

    /// Failed DataFrame operation while extracting cells.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl IngestError {
    pub(crate) fn unavailable(
        source_name: &str,
        path: &std::path::Path,
        reason: impl ToString,
    ) -> Self {
        Self::SourceUnavailable {
            source_name: source_name.to_string(),
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::unavailable(
            "covid",
            std::path::Path::new("raw_data/covid.csv"),
            "file not found",
        );
        assert_eq!(
            err.to_string(),
            "source 'covid' unavailable at raw_data/covid.csv: file not found"
        );
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("test".into());
        let ingest_err: IngestError = polars_err.into();
        assert!(matches!(ingest_err, IngestError::DataFrame { .. }));
    }
}
