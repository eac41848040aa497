//! Data model for the lab-result merge pipeline.
//!
//! - **schema**: the fixed raw-to-canonical column map and field kinds
//! - **value**: typed, non-null cell values
//! - **table**: raw, normalized and merged tables
//! - **config**: run configuration passed to every stage

pub mod config;
pub mod error;
pub mod schema;
pub mod table;
pub mod value;

pub use config::{DEFAULT_DATE_FORMAT, DEFAULT_PREVIEW_ROWS, PipelineConfig, SourceSpec};
pub use error::{ModelError, Result};
pub use schema::{
    AGE_COLUMN, ANALYSIS_DATE_COLUMN, BIRTH_DATE_COLUMN, CONTACT_COLUMN, CanonicalSchemaMap,
    EMAIL_COLUMN, FieldKind, FieldMapping, GENDER_COLUMN, KEY_COLUMN, Resolved, TRAILING_COLUMNS,
    is_reserved_column,
};
pub use table::{
    ColumnDef, MergedRecord, MergedTable, NormalizedRecord, NormalizedTable, RawRecord, RawTable,
    RecordView,
};
pub use value::{Indicator, OUTPUT_DATE_FORMAT, Value, format_numeric};
