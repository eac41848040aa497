//! Unions normalized sources into one table.
//!
//! Columns are the union of every source's columns in first-seen order, with
//! `analysis_date` and `age` moved to the end. Rows are concatenated in
//! source order; a column a source does not carry is a missing cell in that
//! source's rows. Nothing is deduplicated: the merged table holds one row per
//! test record, so the same person can appear once per source.

use tracing::{info, info_span, warn};

use labmerge_model::{
    AGE_COLUMN, ANALYSIS_DATE_COLUMN, ColumnDef, FieldKind, MergedRecord, MergedTable,
    NormalizedTable, TRAILING_COLUMNS,
};

use crate::report::{MergeReport, SchemaWarning};

/// A merged table and its diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Merged {
    pub table: MergedTable,
    pub report: MergeReport,
}

/// Merges sources in the given order.
pub fn merge_tables(tables: &[NormalizedTable]) -> Merged {
    let span = info_span!("merge", sources = tables.len());
    let _guard = span.enter();

    let mut warnings = Vec::new();
    let columns = union_columns(tables, &mut warnings);
    for warning in &warnings {
        warn!(%warning, "schema mismatch on merge");
    }

    let total: usize = tables.iter().map(NormalizedTable::len).sum();
    let mut records = Vec::with_capacity(total);
    let mut rows_per_source = Vec::with_capacity(tables.len());
    for table in tables {
        let positions: Vec<Option<usize>> = columns
            .iter()
            .map(|column| table.column_index(&column.name))
            .collect();
        for record in &table.records {
            let cells = positions
                .iter()
                .map(|position| position.and_then(|idx| record.values.get(idx).cloned()))
                .collect();
            records.push(MergedRecord {
                source: table.source.clone(),
                id: record.id.clone(),
                cells,
            });
        }
        rows_per_source.push((table.source.clone(), table.len()));
    }

    info!(
        rows = records.len(),
        columns = columns.len(),
        "sources merged"
    );

    Merged {
        table: MergedTable { columns, records },
        report: MergeReport {
            rows_per_source,
            warnings,
        },
    }
}

/// Union of column sets in first-seen order, trailing columns last.
fn union_columns(tables: &[NormalizedTable], warnings: &mut Vec<SchemaWarning>) -> Vec<ColumnDef> {
    let mut union: Vec<ColumnDef> = Vec::new();
    for table in tables {
        for column in &table.columns {
            match union.iter().find(|seen| seen.name == column.name) {
                Some(seen) if seen.kind != column.kind => {
                    warnings.push(SchemaWarning::SchemaMismatchOnMerge {
                        column: column.name.clone(),
                        source: table.source.clone(),
                        expected: seen.kind,
                        found: column.kind,
                    });
                }
                Some(_) => {}
                None => union.push(column.clone()),
            }
        }
    }

    for name in TRAILING_COLUMNS {
        let column = match union.iter().position(|column| column.name == name) {
            Some(idx) => union.remove(idx),
            None => ColumnDef::new(name, trailing_kind(name)),
        };
        union.push(column);
    }
    union
}

fn trailing_kind(name: &str) -> FieldKind {
    match name {
        ANALYSIS_DATE_COLUMN => FieldKind::Date,
        AGE_COLUMN => FieldKind::Integer,
        _ => FieldKind::Indicator,
    }
}
