//! Normalization and merge of lab-result tables.
//!
//! - **datetime**: single-format date parsing
//! - **indicator**: boolean-like / numeric test result parsing
//! - **normalize**: raw source → canonical [`labmerge_model::NormalizedTable`]
//! - **merge**: N normalized tables → one [`labmerge_model::MergedTable`]
//! - **report**: dropped rows and schema warnings

pub mod datetime;
pub mod error;
pub mod indicator;
pub mod merge;
pub mod normalize;
pub mod report;

pub use datetime::parse_date;
pub use error::{Result, TransformError};
pub use indicator::parse_indicator;
pub use merge::{Merged, merge_tables};
pub use normalize::{NormalizeOptions, Normalized, derive_age, normalize_source, normalize_sources};
pub use report::{DropReason, DroppedRow, MergeReport, NormalizeReport, SchemaWarning};
