//! Fatal errors raised while normalizing a source.
//!
//! Row-level problems (unparseable dates, bad indicators, empty cells) are not
//! errors: they drop the row and are recorded as [`crate::DropReason`]s.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    /// The source has no identifier column to key rows by.
    #[error("source '{source_name}' has no key column '{column}'")]
    MissingKeyColumn { source_name: String, column: String },

    /// A column needed for coercion or age derivation is absent.
    #[error("source '{source_name}' has no '{column}' column after renaming")]
    MissingRequiredColumn { source_name: String, column: String },
}

pub type Result<T> = std::result::Result<T, TransformError>;
