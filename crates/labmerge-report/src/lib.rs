//! Output side of the pipeline.
//!
//! - **persist**: the merged table as one flat CSV file
//! - **summary**: exploratory statistics (missing values, age, genders, tests)
//! - **charts**: PNG bar charts drawn from the summary

pub mod charts;
pub mod error;
pub mod persist;
pub mod summary;

pub use charts::{AGE_CHART, DISEASE_CHART, GENDER_CHART, render_charts};
pub use error::{ReportError, Result};
pub use persist::{StagedCsv, ensure_dir, stage_merged_csv, write_merged_csv};
pub use summary::{AGE_BIN_WIDTH, AgeBin, AgeStats, ColumnOverview, DatasetSummary, DiseaseCount};
