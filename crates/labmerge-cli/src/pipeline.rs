//! Pipeline stages, run in order:
//!
//! 1. **Ingest**: read every configured source as raw text
//! 2. **Normalize**: map each source onto the canonical schema
//! 3. **Merge**: union the sources into one table
//! 4. **Summarize**: exploratory statistics
//! 5. **Persist**: write the charts and then the merged CSV
//!
//! A stage only starts once the previous one succeeded, so a failing source
//! leaves the output location untouched.

use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use labmerge_ingest::read_sources;
use labmerge_model::{CanonicalSchemaMap, MergedTable, PipelineConfig, RawTable};
use labmerge_report::{DatasetSummary, render_charts, stage_merged_csv};
use labmerge_transform::{
    Merged, NormalizeOptions, NormalizeReport, Normalized, merge_tables, normalize_sources,
};

use crate::types::{OutputPaths, RunResult};

// ============================================================================
// Stage 1: Ingest
// ============================================================================

pub fn ingest(config: &PipelineConfig) -> Result<Vec<RawTable>> {
    let span = info_span!("ingest", sources = config.sources.len());
    let _guard = span.enter();
    let tables = read_sources(&config.sources).context("read sources")?;
    info!(
        rows = tables.iter().map(RawTable::len).sum::<usize>(),
        "sources read"
    );
    Ok(tables)
}

// ============================================================================
// Stage 2: Normalize
// ============================================================================

pub fn normalize(
    raw: &[RawTable],
    schema: &CanonicalSchemaMap,
    config: &PipelineConfig,
) -> Result<Vec<Normalized>> {
    let options = NormalizeOptions::from_config(schema, config);
    normalize_sources(raw, &options).context("normalize sources")
}

// ============================================================================
// Stage 3: Merge
// ============================================================================

/// Merges normalized sources, handing back their reports in the same order.
pub fn merge(normalized: Vec<Normalized>) -> (Merged, Vec<NormalizeReport>) {
    let (tables, reports): (Vec<_>, Vec<_>) = normalized
        .into_iter()
        .map(|source| (source.table, source.report))
        .unzip();
    (merge_tables(&tables), reports)
}

// ============================================================================
// Stage 4: Summarize
// ============================================================================

pub fn summarize(table: &MergedTable) -> Result<DatasetSummary> {
    DatasetSummary::from_table(table).context("summarize merged table")
}

// ============================================================================
// Stage 5: Persist
// ============================================================================

pub fn persist(
    config: &PipelineConfig,
    table: &MergedTable,
    summary: &DatasetSummary,
) -> Result<OutputPaths> {
    let span = info_span!("persist", output = %config.output.display());
    let _guard = span.enter();

    // The CSV only lands once every chart rendered.
    let staged = stage_merged_csv(&config.output, table)
        .with_context(|| format!("write {}", config.output.display()))?;
    let charts = if config.charts {
        render_charts(summary, &config.charts_dir)
            .with_context(|| format!("render charts to {}", config.charts_dir.display()))?
    } else {
        Vec::new()
    };
    let csv = staged
        .commit()
        .with_context(|| format!("write {}", config.output.display()))?;
    Ok(OutputPaths {
        csv: Some(csv),
        charts,
    })
}

/// Runs every stage for a validated configuration.
///
/// With `dry_run` set, nothing is written.
pub fn run_pipeline(config: &PipelineConfig, dry_run: bool) -> Result<RunResult> {
    let start = Instant::now();
    let reference_year = config.effective_reference_year();
    let span = info_span!("run", reference_year, dry_run);
    let _guard = span.enter();

    let schema = CanonicalSchemaMap::standard();
    // Pin the year so every source and the summary agree on it.
    let config = PipelineConfig {
        reference_year: Some(reference_year),
        ..config.clone()
    };

    let raw = ingest(&config)?;
    let normalized = normalize(&raw, &schema, &config)?;
    drop(raw);
    let (merged, sources) = merge(normalized);
    let summary = summarize(&merged.table)?;
    let outputs = if dry_run {
        info!("dry run, skipping output");
        OutputPaths::default()
    } else {
        persist(&config, &merged.table, &summary)?
    };

    info!(
        rows = merged.table.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "pipeline finished"
    );
    Ok(RunResult {
        reference_year,
        sources,
        merge: merged.report,
        merged: merged.table,
        summary,
        outputs,
        preview_rows: config.preview_rows,
        dry_run,
    })
}
