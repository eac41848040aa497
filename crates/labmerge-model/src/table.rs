//! Table types passed between pipeline stages.
//!
//! - [`RawTable`]: text cells exactly as read from one source file
//! - [`NormalizedTable`]: one source mapped onto the canonical schema
//! - [`MergedTable`]: all sources unioned into a single schema

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::schema::{
    AGE_COLUMN, ANALYSIS_DATE_COLUMN, BIRTH_DATE_COLUMN, CONTACT_COLUMN, EMAIL_COLUMN, FieldKind,
    GENDER_COLUMN, KEY_COLUMN,
};
use crate::value::{Indicator, Value};

/// One row of a source file. `None` marks an empty cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub cells: Vec<Option<String>>,
}

impl RawRecord {
    pub fn new(cells: Vec<Option<String>>) -> Self {
        Self { cells }
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.cells.get(idx).and_then(|cell| cell.as_deref())
    }
}

/// Raw rows of one named source, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    /// Logical source name (e.g. "covid").
    pub source: String,
    /// File the rows were read from.
    pub path: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<RawRecord>,
}

impl RawTable {
    pub fn new(source: impl Into<String>, headers: Vec<String>, rows: Vec<RawRecord>) -> Self {
        Self {
            source: source.into(),
            path: PathBuf::new(),
            headers,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a header, compared case-insensitively.
    pub fn header_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|header| header.trim().eq_ignore_ascii_case(name))
    }
}

/// Name and semantic kind of an output column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub kind: FieldKind,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// A canonical row with every value present.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub id: String,
    /// Values aligned with [`NormalizedTable::columns`].
    pub values: Vec<Value>,
}

/// One source after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    pub source: String,
    /// Output columns, excluding the key.
    pub columns: Vec<ColumnDef>,
    pub records: Vec<NormalizedRecord>,
}

impl NormalizedTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }

    /// Typed view over one record.
    pub fn view<'a>(&'a self, record: &'a NormalizedRecord) -> RecordView<'a> {
        RecordView {
            columns: &self.columns,
            id: &record.id,
            cells: record.values.iter().map(Some).collect(),
        }
    }

    pub fn views(&self) -> impl Iterator<Item = RecordView<'_>> {
        self.records.iter().map(|record| self.view(record))
    }
}

/// A row of the merged table. `None` cells mean the source recorded nothing
/// for that column (e.g. no covid test in the dengue extract).
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    /// Source the row came from.
    pub source: String,
    pub id: String,
    /// Cells aligned with [`MergedTable::columns`].
    pub cells: Vec<Option<Value>>,
}

/// All sources unioned into a single schema.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedTable {
    /// Output columns, excluding the key. Always ends with
    /// `analysis_date`, `age`.
    pub columns: Vec<ColumnDef>,
    pub records: Vec<MergedRecord>,
}

impl MergedTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }

    /// Header row for persisted output: the key followed by every column.
    pub fn header(&self) -> Vec<&str> {
        std::iter::once(KEY_COLUMN)
            .chain(self.column_names())
            .collect()
    }

    /// Number of missing cells per column, in column order.
    pub fn missing_counts(&self) -> Vec<(&str, usize)> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let missing = self
                    .records
                    .iter()
                    .filter(|record| record.cells.get(idx).is_none_or(Option::is_none))
                    .count();
                (column.name.as_str(), missing)
            })
            .collect()
    }

    pub fn view<'a>(&'a self, record: &'a MergedRecord) -> RecordView<'a> {
        RecordView {
            columns: &self.columns,
            id: &record.id,
            cells: record.cells.iter().map(Option::as_ref).collect(),
        }
    }

    pub fn views(&self) -> impl Iterator<Item = RecordView<'_>> {
        self.records.iter().map(|record| self.view(record))
    }
}

/// Read-only, typed access to a normalized or merged row.
#[derive(Debug, Clone)]
pub struct RecordView<'a> {
    columns: &'a [ColumnDef],
    id: &'a str,
    cells: Vec<Option<&'a Value>>,
}

impl<'a> RecordView<'a> {
    pub fn id(&self) -> &'a str {
        self.id
    }

    pub fn get(&self, name: &str) -> Option<&'a Value> {
        let idx = self.columns.iter().position(|column| column.name == name)?;
        self.cells.get(idx).copied().flatten()
    }

    pub fn email(&self) -> Option<&'a str> {
        self.get(EMAIL_COLUMN).and_then(Value::as_text)
    }

    pub fn contact(&self) -> Option<&'a str> {
        self.get(CONTACT_COLUMN).and_then(Value::as_text)
    }

    pub fn gender(&self) -> Option<&'a str> {
        self.get(GENDER_COLUMN).and_then(Value::as_text)
    }

    pub fn birth_date(&self) -> Option<NaiveDate> {
        self.get(BIRTH_DATE_COLUMN).and_then(Value::as_date)
    }

    pub fn analysis_date(&self) -> Option<NaiveDate> {
        self.get(ANALYSIS_DATE_COLUMN).and_then(Value::as_date)
    }

    pub fn age(&self) -> Option<i64> {
        self.get(AGE_COLUMN).and_then(Value::as_integer)
    }

    /// Indicator columns that carry a value in this row.
    pub fn test_flags(&self) -> Vec<(&'a str, Indicator)> {
        self.columns
            .iter()
            .zip(self.cells.iter())
            .filter(|(column, _)| column.kind == FieldKind::Indicator)
            .filter_map(|(column, cell)| {
                cell.and_then(Value::as_indicator)
                    .map(|indicator| (column.name.as_str(), indicator))
            })
            .collect()
    }
}
