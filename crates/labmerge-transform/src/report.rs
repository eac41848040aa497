//! Diagnostics produced alongside normalized and merged tables.

use std::fmt;

use labmerge_model::FieldKind;

/// Why a raw row did not survive null elimination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// The key cell is empty.
    MissingKey,
    /// A kept column has an empty cell.
    Missing { column: String },
    /// A date cell does not match the accepted format.
    UnparseableDate { column: String, value: String },
    /// A cell cannot be coerced to the column's declared kind.
    TypeMismatch {
        column: String,
        value: String,
        expected: FieldKind,
    },
}

impl DropReason {
    /// Column the reason refers to, if any.
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::MissingKey => None,
            Self::Missing { column }
            | Self::UnparseableDate { column, .. }
            | Self::TypeMismatch { column, .. } => Some(column),
        }
    }

    /// Short label without the offending value, safe to log.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MissingKey => "missing key",
            Self::Missing { .. } => "missing value",
            Self::UnparseableDate { .. } => "unparseable date",
            Self::TypeMismatch { .. } => "type mismatch",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingKey => write!(f, "missing key"),
            Self::Missing { column } => write!(f, "missing {column}"),
            Self::UnparseableDate { column, value } => {
                write!(f, "unparseable date in {column}: '{value}'")
            }
            Self::TypeMismatch {
                column,
                value,
                expected,
            } => write!(f, "{column}: '{value}' is not a valid {expected}"),
        }
    }
}

/// A raw row removed by null elimination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedRow {
    /// 1-based data row number in the source file (header excluded).
    pub row: usize,
    pub id: Option<String>,
    pub reasons: Vec<DropReason>,
}

/// Schema irregularities that do not stop the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaWarning {
    /// Two raw headers resolve to the same output column; the first wins.
    ColumnCollision {
        source: String,
        column: String,
        raw_header: String,
    },
    /// A column carries different kinds in different sources; the first-seen
    /// kind is kept.
    SchemaMismatchOnMerge {
        column: String,
        source: String,
        expected: FieldKind,
        found: FieldKind,
    },
}

impl fmt::Display for SchemaWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ColumnCollision {
                source,
                column,
                raw_header,
            } => write!(
                f,
                "{source}: header '{raw_header}' collides with column '{column}' and was ignored"
            ),
            Self::SchemaMismatchOnMerge {
                column,
                source,
                expected,
                found,
            } => write!(
                f,
                "{source}: column '{column}' is {found} but was first seen as {expected}"
            ),
        }
    }
}

/// Outcome counts for one normalized source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub source: String,
    pub input_rows: usize,
    pub dropped: Vec<DroppedRow>,
    pub warnings: Vec<SchemaWarning>,
}

impl NormalizeReport {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }

    pub fn kept_count(&self) -> usize {
        self.input_rows - self.dropped.len()
    }
}

/// Outcome of a merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Rows contributed by each source, in merge order.
    pub rows_per_source: Vec<(String, usize)>,
    pub warnings: Vec<SchemaWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_reason_display_and_label() {
        let reason = DropReason::UnparseableDate {
            column: "birth_date".to_string(),
            value: "1990/05/01".to_string(),
        };
        assert_eq!(
            reason.to_string(),
            "unparseable date in birth_date: '1990/05/01'"
        );
        assert_eq!(reason.label(), "unparseable date");
        assert_eq!(reason.column(), Some("birth_date"));
        assert_eq!(DropReason::MissingKey.column(), None);
    }

    #[test]
    fn report_counts() {
        let report = NormalizeReport {
            source: "covid".to_string(),
            input_rows: 3,
            dropped: vec![DroppedRow {
                row: 2,
                id: None,
                reasons: vec![DropReason::MissingKey],
            }],
            warnings: vec![],
        };
        assert_eq!(report.dropped_count(), 1);
        assert_eq!(report.kept_count(), 2);
    }
}
