use std::path::PathBuf;

use labmerge_model::MergedTable;
use labmerge_report::DatasetSummary;
use labmerge_transform::{MergeReport, NormalizeReport};

/// Everything one run produced, for the terminal summary.
#[derive(Debug)]
pub struct RunResult {
    pub reference_year: i32,
    /// Per-source diagnostics, in merge order.
    pub sources: Vec<NormalizeReport>,
    pub merge: MergeReport,
    pub merged: MergedTable,
    pub summary: DatasetSummary,
    pub outputs: OutputPaths,
    pub preview_rows: usize,
    pub dry_run: bool,
}

impl RunResult {
    pub fn dropped_rows(&self) -> usize {
        self.sources.iter().map(NormalizeReport::dropped_count).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.sources
            .iter()
            .map(|report| report.warnings.len())
            .sum::<usize>()
            + self.merge.warnings.len()
    }
}

/// Files written by the persist stage. Empty on a dry run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputPaths {
    pub csv: Option<PathBuf>,
    pub charts: Vec<PathBuf>,
}
