//! End-to-end tests for the pipeline stages.

use std::fs;
use std::path::Path;

use labmerge_cli::config::{ConfigOverrides, resolve_config};
use labmerge_cli::pipeline::{ingest, merge, normalize, run_pipeline};
use labmerge_model::{CanonicalSchemaMap, PipelineConfig, SourceSpec};

const HEADER: &str = "id,first_name,last_name,email,phone,gender,birth";

fn write_source(dir: &Path, disease: &str, rows: &[&str]) -> SourceSpec {
    let path = dir.join(format!("{disease}.csv"));
    let mut content = format!("{HEADER},{disease},date\n");
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    fs::write(&path, content).unwrap();
    SourceSpec::new(disease, path)
}

fn reference_sources(dir: &Path) -> Vec<SourceSpec> {
    vec![
        write_source(
            dir,
            "covid",
            &[
                "1,Ana,Silva,ana@example.org,555-0101,F,1990-05-01,1,2024-01-10",
                "2,Ben,Lee,ben@example.org,555-0102,M,1985-02-02,0,2024-01-11",
            ],
        ),
        write_source(
            dir,
            "dengue",
            &[
                "3,Caio,Reis,caio@example.org,555-0103,M,2000-12-31,1,2024-02-01",
                "4,Dana,Moss,,555-0104,F,1999-01-01,0,2024-02-02",
            ],
        ),
        write_source(
            dir,
            "influenza",
            &["1,Ana,Silva,ana@example.org,555-0101,F,1990-05-01,0,2024-03-05"],
        ),
    ]
}

fn config_for(dir: &Path, sources: Vec<SourceSpec>) -> PipelineConfig {
    PipelineConfig {
        sources,
        output: dir.join("processed_data").join("combined_data.csv"),
        charts_dir: dir.join("processed_data").join("charts"),
        reference_year: Some(2024),
        ..PipelineConfig::default()
    }
}

#[test]
fn reference_run_writes_merged_csv() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), reference_sources(dir.path()));

    let result = run_pipeline(&config, false).unwrap();

    assert_eq!(result.reference_year, 2024);
    assert_eq!(result.merged.len(), 4);
    assert_eq!(result.dropped_rows(), 1);
    assert_eq!(result.warning_count(), 0);
    assert_eq!(result.outputs.charts.len(), 3);

    let written = fs::read_to_string(&config.output).unwrap();
    insta::assert_snapshot!(written, @r"
    id,email,contact,gender,birth_date,covid,dengue,influenza,analysis_date,age
    1,ana@example.org,555-0101,F,1990-05-01,1,,,2024-01-10,34
    2,ben@example.org,555-0102,M,1985-02-02,0,,,2024-01-11,39
    3,caio@example.org,555-0103,M,2000-12-31,,1,,2024-02-01,24
    1,ana@example.org,555-0101,F,1990-05-01,,,0,2024-03-05,34
    ");
}

#[test]
fn per_source_reports_follow_merge_order() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), reference_sources(dir.path()));

    let result = run_pipeline(&config, true).unwrap();

    let counts: Vec<_> = result
        .sources
        .iter()
        .map(|report| {
            (
                report.source.as_str(),
                report.input_rows,
                report.kept_count(),
                report.dropped_count(),
            )
        })
        .collect();
    assert_eq!(
        counts,
        vec![("covid", 2, 2, 0), ("dengue", 2, 1, 1), ("influenza", 1, 1, 0)]
    );
    assert_eq!(result.sources[1].dropped[0].row, 2);
    assert_eq!(
        result.merge.rows_per_source,
        vec![
            ("covid".to_string(), 2),
            ("dengue".to_string(), 1),
            ("influenza".to_string(), 1),
        ]
    );
}

#[test]
fn dry_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), reference_sources(dir.path()));

    let result = run_pipeline(&config, true).unwrap();

    assert!(result.dry_run);
    assert!(result.outputs.csv.is_none());
    assert!(!config.output.exists());
    assert!(!config.charts_dir.exists());
    assert_eq!(result.summary.rows, 4);
}

#[test]
fn missing_source_leaves_output_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let mut sources = reference_sources(dir.path());
    sources[1].path = dir.path().join("absent.csv");
    let config = config_for(dir.path(), sources);

    let error = run_pipeline(&config, false).unwrap_err();

    let message = format!("{error:#}");
    assert!(message.contains("dengue"), "{message}");
    assert!(!config.output.exists());
}

#[test]
fn source_without_key_column_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("covid.csv");
    fs::write(&path, "patient,birth,date\n1,1990-05-01,2024-01-10\n").unwrap();
    let config = config_for(dir.path(), vec![SourceSpec::new("covid", path)]);

    let error = run_pipeline(&config, false).unwrap_err();

    assert!(format!("{error:#}").contains("normalize sources"));
    assert!(!config.output.exists());
}

#[test]
fn chart_failure_leaves_output_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(dir.path(), reference_sources(dir.path()));
    // A regular file where the charts directory should go.
    config.charts_dir = dir.path().join("charts");
    fs::write(&config.charts_dir, "not a directory").unwrap();

    let error = run_pipeline(&config, false).unwrap_err();

    assert!(format!("{error:#}").contains("render charts"), "{error:#}");
    assert!(!config.output.exists());
    let leftovers: Vec<_> = fs::read_dir(config.output.parent().unwrap())
        .unwrap()
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn charts_can_be_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let sources = reference_sources(dir.path());
    let overrides = ConfigOverrides {
        sources,
        output: Some(dir.path().join("out.csv")),
        charts_dir: Some(dir.path().join("charts")),
        reference_year: Some(2024),
        no_charts: true,
        ..ConfigOverrides::default()
    };
    let config = resolve_config(None, &overrides).unwrap();

    let result = run_pipeline(&config, false).unwrap();

    assert!(result.outputs.charts.is_empty());
    assert!(dir.path().join("out.csv").exists());
    assert!(!dir.path().join("charts").exists());
}

#[test]
fn stages_compose_without_the_runner() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), reference_sources(dir.path()));
    let schema = CanonicalSchemaMap::standard();

    let raw = ingest(&config).unwrap();
    assert_eq!(raw.len(), 3);
    let normalized = normalize(&raw, &schema, &config).unwrap();
    let (merged, reports) = merge(normalized);

    assert_eq!(reports.len(), 3);
    let ages: Vec<_> = merged.table.views().filter_map(|view| view.age()).collect();
    assert_eq!(ages, vec![34, 39, 24, 34]);
}
