//! Reads source extracts into [`RawTable`]s.
//!
//! Every column is read as text: schema inference is disabled so that type
//! coercion happens in one place, the normalizer.

use std::path::Path;

use polars::prelude::{CsvReadOptions, DataFrame, SerReader};
use tracing::{debug, info_span};

use labmerge_model::{RawRecord, RawTable, SourceSpec};

use crate::error::{IngestError, Result};
use crate::polars_utils::any_to_string_non_empty;

/// Reads every configured source, preserving the configured order.
///
/// Fails on the first source that cannot be read.
pub fn read_sources(sources: &[SourceSpec]) -> Result<Vec<RawTable>> {
    sources
        .iter()
        .map(|source| read_source(&source.name, &source.path))
        .collect()
}

/// Reads one named CSV file.
pub fn read_source(name: &str, path: &Path) -> Result<RawTable> {
    let span = info_span!("read_source", source = %name, path = %path.display());
    let _guard = span.enter();

    let metadata = std::fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::unavailable(name, path, "file not found")
        } else {
            IngestError::unavailable(name, path, e)
        }
    })?;
    if !metadata.is_file() {
        return Err(IngestError::unavailable(name, path, "not a regular file"));
    }

    let df = read_text_frame(path).map_err(|e| IngestError::unavailable(name, path, e))?;
    let mut table = dataframe_to_raw(name, &df)?;
    table.path = path.to_path_buf();

    debug!(
        rows = table.rows.len(),
        columns = table.headers.len(),
        "source loaded"
    );
    Ok(table)
}

/// Loads a CSV with every column typed as String.
fn read_text_frame(path: &Path) -> polars::prelude::PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
}

/// Copies a text DataFrame into a [`RawTable`], row by row.
fn dataframe_to_raw(name: &str, df: &DataFrame) -> Result<RawTable> {
    let headers: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|header| normalize_header(header.as_str()))
        .collect();
    let columns = df.get_columns();
    let mut rows = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let mut cells = Vec::with_capacity(columns.len());
        for column in columns {
            cells.push(any_to_string_non_empty(column.get(idx)?));
        }
        rows.push(RawRecord::new(cells));
    }
    Ok(RawTable::new(name, headers, rows))
}

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_read_source_keeps_text_and_order() {
        let file = create_temp_csv("id,gender,dengue\n2,F,1\n1,M,0\n");
        let table = read_source("dengue", file.path()).unwrap();

        assert_eq!(table.source, "dengue");
        assert_eq!(table.headers, vec!["id", "gender", "dengue"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].get(0), Some("2"));
        assert_eq!(table.rows[1].get(1), Some("M"));
        assert_eq!(table.path, file.path());
    }

    #[test]
    fn test_empty_cells_are_none() {
        let file = create_temp_csv("id,email,birth\n1,,1990-05-01\n");
        let table = read_source("covid", file.path()).unwrap();

        assert_eq!(table.rows[0].cells[1], None);
        assert_eq!(table.rows[0].get(2), Some("1990-05-01"));
    }

    #[test]
    fn test_header_only_file_is_empty_table() {
        let file = create_temp_csv("id,birth,date\n");
        let table = read_source("covid", file.path()).unwrap();

        assert_eq!(table.headers.len(), 3);
        assert!(table.is_empty());
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let result = read_source("covid", Path::new("/definitely/not/here.csv"));
        assert!(matches!(
            result,
            Err(IngestError::SourceUnavailable { ref source_name, .. }) if source_name == "covid"
        ));
    }

    #[test]
    fn test_directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_source("covid", dir.path());
        assert!(matches!(result, Err(IngestError::SourceUnavailable { .. })));
    }
}
