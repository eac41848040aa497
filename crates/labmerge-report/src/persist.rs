//! Flat CSV output of the merged table.

use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use labmerge_model::MergedTable;

use crate::error::{ReportError, Result};

/// Creates `dir` and its parents if they do not exist yet.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(dir).map_err(|source| ReportError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// A fully written CSV that is not yet visible at its destination.
///
/// Dropping it without [`StagedCsv::commit`] removes the temporary file and
/// leaves the destination untouched.
#[derive(Debug)]
pub struct StagedCsv {
    file: NamedTempFile,
    dest: PathBuf,
    rows: usize,
}

impl StagedCsv {
    /// Destination the CSV moves to on commit.
    pub fn dest(&self) -> &Path {
        &self.dest
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Moves the staged file over the destination.
    pub fn commit(self) -> Result<PathBuf> {
        let Self { file, dest, rows } = self;
        file.persist(&dest).map_err(|err| ReportError::Persist {
            path: dest.clone(),
            source: err.error,
        })?;
        info!(path = %dest.display(), rows, "merged dataset written");
        Ok(dest)
    }
}

/// Writes the merged table to a temporary file next to `path`.
///
/// The header is the key followed by the merged column order. Missing cells
/// are written as empty fields.
pub fn stage_merged_csv(path: &Path, table: &MergedTable) -> Result<StagedCsv> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    ensure_dir(parent)?;
    let mut file = NamedTempFile::new_in(parent).map_err(|source| ReportError::CreateFile {
        path: path.to_path_buf(),
        source,
    })?;
    let csv_error = |source| ReportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    {
        let mut writer = csv::Writer::from_writer(&mut file);
        writer.write_record(table.header()).map_err(csv_error)?;
        for record in &table.records {
            let mut row = Vec::with_capacity(record.cells.len() + 1);
            row.push(record.id.clone());
            row.extend(
                record
                    .cells
                    .iter()
                    .map(|cell| cell.as_ref().map(ToString::to_string).unwrap_or_default()),
            );
            writer.write_record(&row).map_err(csv_error)?;
        }
        writer.flush().map_err(|source| ReportError::Flush {
            path: path.to_path_buf(),
            source,
        })?;
    }

    debug!(path = %path.display(), rows = table.len(), "merged dataset staged");
    Ok(StagedCsv {
        file,
        dest: path.to_path_buf(),
        rows: table.len(),
    })
}

/// Writes the merged table as one CSV file and returns the number of rows.
pub fn write_merged_csv(path: &Path, table: &MergedTable) -> Result<usize> {
    let staged = stage_merged_csv(path, table)?;
    let rows = staged.rows();
    staged.commit()?;
    Ok(rows)
}
