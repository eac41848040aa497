//! Source reader for lab-result extracts.
//!
//! Loads each named CSV file into a [`labmerge_model::RawTable`] of text
//! cells. No renaming, coercion or validation happens here beyond checking
//! that the file is readable delimited data.
//!
//! # Example
//!
//! ```ignore
//! use labmerge_ingest::read_sources;
//! use labmerge_model::PipelineConfig;
//!
//! let config = PipelineConfig::default();
//! let tables = read_sources(&config.sources)?;
//! ```

mod error;
mod polars_utils;
mod reader;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading ===
pub use reader::{read_source, read_sources};
