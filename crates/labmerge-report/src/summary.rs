//! Exploratory statistics over a merged table.

use polars::prelude::*;
use tracing::{debug, info_span};

use labmerge_model::{AGE_COLUMN, FieldKind, MergedTable};

use crate::error::Result;

/// Width of one age histogram bin, in years.
pub const AGE_BIN_WIDTH: i64 = 10;

/// Presence of one merged column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnOverview {
    pub name: String,
    pub kind: FieldKind,
    pub present: usize,
    pub missing: usize,
}

/// Descriptive statistics of the `age` column.
#[derive(Debug, Clone, PartialEq)]
pub struct AgeStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min: i64,
    pub max: i64,
}

/// Tests recorded for one disease column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiseaseCount {
    pub disease: String,
    /// Rows with a value in the column.
    pub tested: usize,
    pub positive: usize,
}

/// Ages in `[lower, upper)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeBin {
    pub lower: i64,
    pub upper: i64,
    pub count: usize,
}

/// Everything the run summary and the charts are drawn from.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub rows: usize,
    pub columns: Vec<ColumnOverview>,
    pub age: Option<AgeStats>,
    /// Gender values by descending count, ties by name.
    pub genders: Vec<(String, usize)>,
    pub diseases: Vec<DiseaseCount>,
    pub age_histogram: Vec<AgeBin>,
}

impl DatasetSummary {
    /// Summarizes a merged table.
    pub fn from_table(table: &MergedTable) -> Result<Self> {
        let span = info_span!("summarize", rows = table.len());
        let _guard = span.enter();

        let columns = table
            .columns
            .iter()
            .zip(table.missing_counts())
            .map(|(column, (_, missing))| ColumnOverview {
                name: column.name.clone(),
                kind: column.kind,
                present: table.len() - missing,
                missing,
            })
            .collect();

        let ages: Vec<Option<i64>> = table.views().map(|view| view.age()).collect();
        let frame = df!(AGE_COLUMN => ages)?;
        let age = age_stats(&frame)?;
        let age_histogram = age
            .as_ref()
            .map(|stats| age_histogram(&frame, stats))
            .transpose()?
            .unwrap_or_default();

        let summary = Self {
            rows: table.len(),
            columns,
            age,
            genders: gender_distribution(table),
            diseases: disease_counts(table),
            age_histogram,
        };
        debug!(
            genders = summary.genders.len(),
            diseases = summary.diseases.len(),
            "summary computed"
        );
        Ok(summary)
    }

    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(|column| column.missing).sum()
    }
}

fn age_stats(frame: &DataFrame) -> Result<Option<AgeStats>> {
    let ages = frame.column(AGE_COLUMN)?.as_materialized_series().i64()?;
    let count = ages.len() - ages.null_count();
    let (Some(mean), Some(median), Some(std_dev), Some(min), Some(max)) = (
        ages.mean(),
        ages.median(),
        ages.std(0),
        ages.min(),
        ages.max(),
    ) else {
        return Ok(None);
    };
    Ok(Some(AgeStats {
        count,
        mean,
        median,
        std_dev,
        min,
        max,
    }))
}

/// Fixed-width bins from the bin holding the minimum to the one holding the
/// maximum. Empty bins in between are kept.
fn age_histogram(frame: &DataFrame, stats: &AgeStats) -> Result<Vec<AgeBin>> {
    let first = stats.min.div_euclid(AGE_BIN_WIDTH) * AGE_BIN_WIDTH;
    let last = stats.max.div_euclid(AGE_BIN_WIDTH) * AGE_BIN_WIDTH;
    let mut bins: Vec<AgeBin> = (first..=last)
        .step_by(AGE_BIN_WIDTH as usize)
        .map(|lower| AgeBin {
            lower,
            upper: lower + AGE_BIN_WIDTH,
            count: 0,
        })
        .collect();

    let ages = frame.column(AGE_COLUMN)?.as_materialized_series().i64()?;
    for age in ages.into_iter().flatten() {
        let idx = ((age - first) / AGE_BIN_WIDTH) as usize;
        if let Some(bin) = bins.get_mut(idx) {
            bin.count += 1;
        }
    }
    Ok(bins)
}

fn gender_distribution(table: &MergedTable) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for gender in table.views().filter_map(|view| view.gender()) {
        match counts.iter_mut().find(|(name, _)| name == gender) {
            Some((_, count)) => *count += 1,
            None => counts.push((gender.to_string(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

fn disease_counts(table: &MergedTable) -> Vec<DiseaseCount> {
    let mut diseases: Vec<DiseaseCount> = table
        .columns
        .iter()
        .filter(|column| column.kind == FieldKind::Indicator)
        .map(|column| DiseaseCount {
            disease: column.name.clone(),
            tested: 0,
            positive: 0,
        })
        .collect();
    for view in table.views() {
        for (name, indicator) in view.test_flags() {
            if let Some(entry) = diseases.iter_mut().find(|entry| entry.disease == name) {
                entry.tested += 1;
                if indicator.is_positive() {
                    entry.positive += 1;
                }
            }
        }
    }
    diseases
}

#[cfg(test)]
mod tests {
    use super::*;
    use labmerge_model::{ColumnDef, Indicator, MergedRecord, Value};

    fn record(id: &str, gender: Option<&str>, covid: Option<bool>, age: i64) -> MergedRecord {
        MergedRecord {
            source: "covid".to_string(),
            id: id.to_string(),
            cells: vec![
                gender.map(|g| Value::Text(g.to_string())),
                covid.map(|flag| Value::Indicator(Indicator::Boolean(flag))),
                Some(Value::Integer(age)),
            ],
        }
    }

    fn table(records: Vec<MergedRecord>) -> MergedTable {
        MergedTable {
            columns: vec![
                ColumnDef::new("gender", FieldKind::Category),
                ColumnDef::new("covid", FieldKind::Indicator),
                ColumnDef::new(AGE_COLUMN, FieldKind::Integer),
            ],
            records,
        }
    }

    #[test]
    fn age_stats_use_population_std() {
        let table = table(vec![
            record("1", Some("F"), Some(true), 20),
            record("2", Some("M"), Some(false), 30),
            record("3", Some("F"), None, 40),
            record("4", None, Some(true), 50),
        ]);

        let summary = DatasetSummary::from_table(&table).unwrap();
        let age = summary.age.unwrap();

        assert_eq!(age.count, 4);
        assert!((age.mean - 35.0).abs() < 1e-9);
        assert!((age.median - 35.0).abs() < 1e-9);
        assert!((age.std_dev - 125.0_f64.sqrt()).abs() < 1e-9);
        assert_eq!((age.min, age.max), (20, 50));
    }

    #[test]
    fn counts_genders_and_tests() {
        let table = table(vec![
            record("1", Some("F"), Some(true), 20),
            record("2", Some("M"), Some(false), 30),
            record("3", Some("F"), None, 40),
            record("4", None, Some(true), 50),
        ]);

        let summary = DatasetSummary::from_table(&table).unwrap();

        assert_eq!(
            summary.genders,
            vec![("F".to_string(), 2), ("M".to_string(), 1)]
        );
        assert_eq!(
            summary.diseases,
            vec![DiseaseCount {
                disease: "covid".to_string(),
                tested: 3,
                positive: 2,
            }]
        );
        assert_eq!(summary.columns[0].missing, 1);
        assert_eq!(summary.columns[1].present, 3);
        assert_eq!(summary.total_missing(), 2);
    }

    #[test]
    fn histogram_keeps_empty_bins() {
        let table = table(vec![
            record("1", None, None, 18),
            record("2", None, None, 19),
            record("3", None, None, 42),
        ]);

        let summary = DatasetSummary::from_table(&table).unwrap();
        let bins: Vec<_> = summary
            .age_histogram
            .iter()
            .map(|bin| (bin.lower, bin.count))
            .collect();
        assert_eq!(bins, vec![(10, 2), (20, 0), (30, 0), (40, 1)]);
    }

    #[test]
    fn empty_table_has_no_age_stats() {
        let summary = DatasetSummary::from_table(&table(vec![])).unwrap();
        assert_eq!(summary.rows, 0);
        assert!(summary.age.is_none());
        assert!(summary.age_histogram.is_empty());
        assert!(summary.diseases[0].tested == 0);
    }
}
