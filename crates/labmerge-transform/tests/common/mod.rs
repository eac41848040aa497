#![allow(dead_code)]

use labmerge_model::{CanonicalSchemaMap, RawRecord, RawTable};
use labmerge_transform::NormalizeOptions;

pub const ISO: &str = "%Y-%m-%d";

/// Builds a raw table; empty strings become missing cells.
pub fn raw_table(source: &str, headers: &[&str], rows: &[&[&str]]) -> RawTable {
    RawTable::new(
        source,
        headers.iter().map(|h| (*h).to_string()).collect(),
        rows.iter()
            .map(|row| {
                RawRecord::new(
                    row.iter()
                        .map(|cell| {
                            if cell.is_empty() {
                                None
                            } else {
                                Some((*cell).to_string())
                            }
                        })
                        .collect(),
                )
            })
            .collect(),
    )
}

pub fn options(schema: &CanonicalSchemaMap, reference_year: i32) -> NormalizeOptions<'_> {
    NormalizeOptions::new(schema, ISO, reference_year)
}

pub const FULL_HEADERS: &[&str] = &[
    "id",
    "first_name",
    "last_name",
    "email",
    "phone",
    "gender",
    "birth",
    "covid",
    "date",
];
