//! Errors raised while building pipeline configuration.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// A `--source` value that is not `NAME=PATH`.
    #[error("invalid source '{value}': expected NAME=PATH")]
    InvalidSourceSpec { value: String },

    #[error("no sources configured")]
    NoSources,

    #[error("source '{name}' is configured more than once")]
    DuplicateSource { name: String },

    #[error("date format must not be empty")]
    EmptyDateFormat,
}

pub type Result<T> = std::result::Result<T, ModelError>;
