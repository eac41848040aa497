//! Maps one source onto the canonical schema.
//!
//! The steps run in a fixed order:
//!
//! 1. **Re-key** on the identifier column
//! 2. **Rename** headers through the [`CanonicalSchemaMap`]
//! 3. **Coerce** cells to each column's declared kind
//! 4. **Prune** discarded columns (names)
//! 5. **Drop** every row with an empty or uncoercible kept cell
//! 6. **Derive** `age` from the birth year and the reference year
//!
//! Rows keep their relative order. Duplicate keys are kept.

use chrono::Datelike;
use tracing::{debug, info, info_span, warn};

use labmerge_model::{
    AGE_COLUMN, BIRTH_DATE_COLUMN, CanonicalSchemaMap, ColumnDef, FieldKind, NormalizedRecord,
    NormalizedTable, PipelineConfig, RawRecord, RawTable, Value, is_reserved_column,
};

use crate::datetime::parse_date;
use crate::error::{Result, TransformError};
use crate::indicator::parse_indicator;
use crate::report::{DropReason, DroppedRow, NormalizeReport, SchemaWarning};

/// Settings shared by every source of one run.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeOptions<'a> {
    pub schema: &'a CanonicalSchemaMap,
    /// The single accepted date format.
    pub date_format: &'a str,
    /// Year ages are computed against.
    pub reference_year: i32,
}

impl<'a> NormalizeOptions<'a> {
    pub fn new(schema: &'a CanonicalSchemaMap, date_format: &'a str, reference_year: i32) -> Self {
        Self {
            schema,
            date_format,
            reference_year,
        }
    }

    /// Options for a configured run; resolves the reference year once.
    pub fn from_config(schema: &'a CanonicalSchemaMap, config: &'a PipelineConfig) -> Self {
        Self::new(
            schema,
            &config.date_format,
            config.effective_reference_year(),
        )
    }
}

/// A normalized source and its diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub table: NormalizedTable,
    pub report: NormalizeReport,
}

/// Raw column selected for output, after renaming.
#[derive(Debug, Clone)]
struct PlannedColumn {
    raw_index: usize,
    column: ColumnDef,
}

/// Normalizes every source in order, failing on the first fatal error.
pub fn normalize_sources(
    raw: &[RawTable],
    options: &NormalizeOptions<'_>,
) -> Result<Vec<Normalized>> {
    raw.iter()
        .map(|table| normalize_source(table, options))
        .collect()
}

/// Normalizes one source.
pub fn normalize_source(raw: &RawTable, options: &NormalizeOptions<'_>) -> Result<Normalized> {
    let span = info_span!("normalize", source = %raw.source);
    let _guard = span.enter();

    // 1. Re-key
    let key_raw = options.schema.key_raw_name();
    let key_index = raw
        .header_index(key_raw)
        .ok_or_else(|| TransformError::MissingKeyColumn {
            source_name: raw.source.clone(),
            column: key_raw.to_string(),
        })?;

    // 2. Rename
    let mut warnings = Vec::new();
    let plan = plan_columns(raw, key_index, options.schema, &mut warnings);
    for warning in &warnings {
        warn!(%warning, "schema collision");
    }
    for required in options.schema.required_columns() {
        if !plan.iter().any(|planned| planned.column.name == required) {
            return Err(TransformError::MissingRequiredColumn {
                source_name: raw.source.clone(),
                column: required.to_string(),
            });
        }
    }

    // Output columns: the plan without discarded fields.
    let kept: Vec<&PlannedColumn> = plan
        .iter()
        .filter(|planned| planned.column.kind != FieldKind::Discard)
        .collect();

    let mut records = Vec::with_capacity(raw.rows.len());
    let mut dropped = Vec::new();
    for (row_idx, row) in raw.rows.iter().enumerate() {
        // 3. Coerce every planned cell, then 4. prune discarded ones
        let coerced: Vec<(&PlannedColumn, std::result::Result<Value, DropReason>)> = plan
            .iter()
            .map(|planned| (planned, coerce_cell(row, planned, options.date_format)))
            .filter(|(planned, _)| planned.column.kind != FieldKind::Discard)
            .collect();

        // 5. Null elimination
        let id = row.get(key_index).map(str::to_string);
        let mut reasons = Vec::new();
        if id.is_none() {
            reasons.push(DropReason::MissingKey);
        }
        let mut values = Vec::with_capacity(coerced.len() + 1);
        let mut birth_date = None;
        for (planned, cell) in coerced {
            match cell {
                Ok(value) => {
                    if planned.column.name == BIRTH_DATE_COLUMN {
                        birth_date = value.as_date();
                    }
                    values.push(value);
                }
                Err(reason) => reasons.push(reason),
            }
        }
        // A clean row always carries a coerced birth date: the column is
        // required and date-typed.
        let (id, birth_date) = match (id, birth_date) {
            (Some(id), Some(birth_date)) if reasons.is_empty() => (id, birth_date),
            (id, _) => {
                debug!(
                    row = row_idx + 1,
                    reasons = ?reasons.iter().map(DropReason::label).collect::<Vec<_>>(),
                    "row dropped"
                );
                dropped.push(DroppedRow {
                    row: row_idx + 1,
                    id,
                    reasons,
                });
                continue;
            }
        };

        // 6. Age derivation
        values.push(Value::Integer(derive_age(
            options.reference_year,
            birth_date.year(),
        )));

        records.push(NormalizedRecord { id, values });
    }

    let mut columns: Vec<ColumnDef> = kept.iter().map(|planned| planned.column.clone()).collect();
    columns.push(ColumnDef::new(AGE_COLUMN, FieldKind::Integer));

    let report = NormalizeReport {
        source: raw.source.clone(),
        input_rows: raw.rows.len(),
        dropped,
        warnings,
    };
    info!(
        input_rows = report.input_rows,
        kept = report.kept_count(),
        dropped = report.dropped_count(),
        "source normalized"
    );

    Ok(Normalized {
        table: NormalizedTable {
            source: raw.source.clone(),
            columns,
            records,
        },
        report,
    })
}

/// Age in whole years, ignoring day of year.
///
/// Someone born in December counts a full year in January of the next year.
pub fn derive_age(reference_year: i32, birth_year: i32) -> i64 {
    i64::from(reference_year) - i64::from(birth_year)
}

/// Resolves raw headers to output columns, in header order.
fn plan_columns(
    raw: &RawTable,
    key_index: usize,
    schema: &CanonicalSchemaMap,
    warnings: &mut Vec<SchemaWarning>,
) -> Vec<PlannedColumn> {
    let mut plan: Vec<PlannedColumn> = Vec::with_capacity(raw.headers.len());
    for (raw_index, header) in raw.headers.iter().enumerate() {
        if raw_index == key_index {
            continue;
        }
        let resolved = schema.resolve(header);
        let kind = if resolved.mapped || column_holds_indicators(raw, raw_index) {
            resolved.kind
        } else {
            FieldKind::Text
        };
        let collides = resolved.kind == FieldKind::Key
            || is_reserved_column(resolved.name)
            || plan
                .iter()
                .any(|planned| planned.column.name.eq_ignore_ascii_case(resolved.name));
        if collides {
            warnings.push(SchemaWarning::ColumnCollision {
                source: raw.source.clone(),
                column: resolved.name.to_string(),
                raw_header: header.clone(),
            });
            continue;
        }
        plan.push(PlannedColumn {
            raw_index,
            column: ColumnDef::new(resolved.name, kind),
        });
    }
    plan
}

/// True when every non-empty cell of an unmapped column reads as a test
/// result. Columns that fail this pass through as text.
fn column_holds_indicators(raw: &RawTable, raw_index: usize) -> bool {
    raw.rows
        .iter()
        .filter_map(|row| row.get(raw_index))
        .all(|cell| parse_indicator(cell).is_some())
}

/// Coerces one raw cell to its column's kind.
fn coerce_cell(
    row: &RawRecord,
    planned: &PlannedColumn,
    date_format: &str,
) -> std::result::Result<Value, DropReason> {
    let column = &planned.column;
    let Some(text) = row.get(planned.raw_index) else {
        return Err(DropReason::Missing {
            column: column.name.clone(),
        });
    };
    match column.kind {
        FieldKind::Date => parse_date(text, date_format).map(Value::Date).ok_or_else(|| {
            DropReason::UnparseableDate {
                column: column.name.clone(),
                value: text.to_string(),
            }
        }),
        FieldKind::Indicator => {
            parse_indicator(text)
                .map(Value::Indicator)
                .ok_or_else(|| DropReason::TypeMismatch {
                    column: column.name.clone(),
                    value: text.to_string(),
                    expected: FieldKind::Indicator,
                })
        }
        // Integer columns are derived (`age`) and never planned from a source.
        FieldKind::Key
        | FieldKind::Text
        | FieldKind::Category
        | FieldKind::Integer
        | FieldKind::Discard => Ok(Value::Text(text.trim().to_string())),
    }
}
