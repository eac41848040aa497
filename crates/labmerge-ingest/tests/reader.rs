use std::fs;
use std::path::PathBuf;

use labmerge_ingest::{IngestError, read_sources};
use labmerge_model::SourceSpec;

fn write_source(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(format!("{name}.csv"));
    fs::write(&path, contents).expect("write file");
    path
}

#[test]
fn reads_sources_in_configured_order() {
    let dir = tempfile::tempdir().expect("temp dir");
    let influenza = write_source(&dir, "influenza", "id,influenza\n7,1\n");
    let covid = write_source(&dir, "covid", "id,covid\n1,0\n2,1\n");

    let tables = read_sources(&[
        SourceSpec::new("influenza", &influenza),
        SourceSpec::new("covid", &covid),
    ])
    .expect("read sources");

    let names: Vec<_> = tables.iter().map(|t| t.source.as_str()).collect();
    assert_eq!(names, vec!["influenza", "covid"]);
    assert_eq!(tables[1].len(), 2);
    assert_eq!(tables[1].rows[1].get(0), Some("2"));
}

#[test]
fn strips_byte_order_mark_from_headers() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_source(&dir, "dengue", "\u{feff}id,dengue\n1,1\n");

    let tables = read_sources(&[SourceSpec::new("dengue", &path)]).expect("read sources");

    assert_eq!(tables[0].headers, vec!["id", "dengue"]);
    assert_eq!(tables[0].header_index("id"), Some(0));
}

#[test]
fn keeps_values_as_text() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_source(
        &dir,
        "covid",
        "id,phone,birth,covid\n001,+1 555 0100,1990-05-01,True\n",
    );

    let tables = read_sources(&[SourceSpec::new("covid", &path)]).expect("read sources");
    let row = &tables[0].rows[0];

    assert_eq!(row.get(0), Some("001"));
    assert_eq!(row.get(1), Some("+1 555 0100"));
    assert_eq!(row.get(3), Some("True"));
}

#[test]
fn first_missing_source_aborts() {
    let dir = tempfile::tempdir().expect("temp dir");
    let covid = write_source(&dir, "covid", "id,covid\n1,0\n");

    let result = read_sources(&[
        SourceSpec::new("covid", &covid),
        SourceSpec::new("dengue", dir.path().join("dengue.csv")),
    ]);

    match result {
        Err(IngestError::SourceUnavailable { source_name, .. }) => {
            assert_eq!(source_name, "dengue");
        }
        other => panic!("expected SourceUnavailable, got {other:?}"),
    }
}
