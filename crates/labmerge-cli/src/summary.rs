use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use labmerge_cli::logging::redact_value;
use labmerge_cli::types::RunResult;
use labmerge_model::{CONTACT_COLUMN, EMAIL_COLUMN, MergedTable, format_numeric};
use labmerge_report::DatasetSummary;
use labmerge_transform::NormalizeReport;

pub fn print_summary(result: &RunResult) {
    println!("Reference year: {}", result.reference_year);
    println!(
        "Rows: {} merged, {} dropped",
        result.summary.rows,
        result.dropped_rows()
    );
    match &result.outputs.csv {
        Some(path) => println!("Output: {}", path.display()),
        None if result.dry_run => println!("Output: dry run, nothing written"),
        None => {}
    }
    for path in &result.outputs.charts {
        println!("Chart: {}", path.display());
    }

    print_source_table(&result.sources, result.summary.rows);
    print_drop_reasons(&result.sources);
    print_column_table(&result.summary);
    print_statistics(&result.summary);
    print_preview(&result.merged, result.preview_rows);

    if result.warning_count() > 0 {
        eprintln!("Warnings:");
        let warnings = result
            .sources
            .iter()
            .flat_map(|report| report.warnings.iter())
            .chain(result.merge.warnings.iter());
        for warning in warnings {
            eprintln!("- {warning}");
        }
    }
}

fn print_source_table(sources: &[NormalizeReport], merged_rows: usize) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("Input"),
        header_cell("Kept"),
        header_cell("Dropped"),
        header_cell("Warnings"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=4 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    let mut total_input = 0usize;
    let mut total_dropped = 0usize;
    let mut total_warnings = 0usize;
    for report in sources {
        total_input += report.input_rows;
        total_dropped += report.dropped_count();
        total_warnings += report.warnings.len();
        table.add_row(vec![
            Cell::new(&report.source)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(report.input_rows),
            Cell::new(report.kept_count()),
            count_cell(report.dropped_count(), Color::Red),
            count_cell(report.warnings.len(), Color::Yellow),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total_input).add_attribute(Attribute::Bold),
        Cell::new(merged_rows).add_attribute(Attribute::Bold),
        count_cell(total_dropped, Color::Red).add_attribute(Attribute::Bold),
        count_cell(total_warnings, Color::Yellow).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

/// Dropped rows grouped by source and reason label. Offending values are not
/// shown since they may be contact details.
fn print_drop_reasons(sources: &[NormalizeReport]) {
    let mut counts: Vec<(&str, &str, Option<&str>, usize)> = Vec::new();
    for report in sources {
        for reason in report.dropped.iter().flat_map(|row| row.reasons.iter()) {
            let key = (report.source.as_str(), reason.label(), reason.column());
            match counts
                .iter_mut()
                .find(|(source, label, column, _)| (*source, *label, *column) == key)
            {
                Some(entry) => entry.3 += 1,
                None => counts.push((key.0, key.1, key.2, 1)),
            }
        }
    }
    if counts.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("Reason"),
        header_cell("Column"),
        header_cell("Rows"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for (source, label, column, count) in counts {
        table.add_row(vec![
            Cell::new(source),
            Cell::new(label).fg(Color::Red),
            column.map_or_else(|| dim_cell("-"), Cell::new),
            Cell::new(count),
        ]);
    }
    println!();
    println!("Dropped rows:");
    println!("{table}");
}

fn print_column_table(summary: &DatasetSummary) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Kind"),
        header_cell("Present"),
        header_cell("Missing"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for column in &summary.columns {
        table.add_row(vec![
            Cell::new(&column.name),
            dim_cell(column.kind),
            Cell::new(column.present),
            count_cell(column.missing, Color::Yellow),
        ]);
    }
    println!();
    println!("Columns ({} rows):", summary.rows);
    println!("{table}");
}

fn print_statistics(summary: &DatasetSummary) {
    if let Some(age) = &summary.age {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Count"),
            header_cell("Mean"),
            header_cell("Median"),
            header_cell("Std"),
            header_cell("Min"),
            header_cell("Max"),
        ]);
        apply_table_style(&mut table);
        table.add_row(vec![
            Cell::new(age.count),
            Cell::new(format!("{:.2}", age.mean)),
            Cell::new(format_numeric(age.median)),
            Cell::new(format!("{:.2}", age.std_dev)),
            Cell::new(age.min),
            Cell::new(age.max),
        ]);
        println!();
        println!("Age:");
        println!("{table}");
    }

    if !summary.age_histogram.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![header_cell("Age range"), header_cell("Rows")]);
        apply_table_style(&mut table);
        align_column(&mut table, 1, CellAlignment::Right);
        for bin in &summary.age_histogram {
            table.add_row(vec![
                Cell::new(format!("{}-{}", bin.lower, bin.upper - 1)),
                Cell::new(bin.count),
            ]);
        }
        println!("{table}");
    }

    if !summary.genders.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![header_cell("Gender"), header_cell("Rows")]);
        apply_table_style(&mut table);
        align_column(&mut table, 1, CellAlignment::Right);
        for (gender, count) in &summary.genders {
            table.add_row(vec![Cell::new(gender), Cell::new(count)]);
        }
        println!();
        println!("Gender:");
        println!("{table}");
    }

    if !summary.diseases.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Test"),
            header_cell("Tested"),
            header_cell("Positive"),
            header_cell("Rate"),
        ]);
        apply_table_style(&mut table);
        for index in 1..=3 {
            align_column(&mut table, index, CellAlignment::Right);
        }
        for disease in &summary.diseases {
            let rate = if disease.tested == 0 {
                dim_cell("-")
            } else {
                Cell::new(format!(
                    "{:.1}%",
                    disease.positive as f64 / disease.tested as f64 * 100.0
                ))
            };
            table.add_row(vec![
                Cell::new(&disease.disease),
                Cell::new(disease.tested),
                Cell::new(disease.positive),
                rate,
            ]);
        }
        println!();
        println!("Tests:");
        println!("{table}");
    }
}

fn print_preview(merged: &MergedTable, rows: usize) {
    if rows == 0 || merged.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(merged.header().into_iter().map(header_cell));
    apply_table_style(&mut table);
    for record in merged.records.iter().take(rows) {
        let mut cells = vec![Cell::new(&record.id)];
        for (column, cell) in merged.columns.iter().zip(&record.cells) {
            cells.push(match cell {
                Some(value) => {
                    let text = value.to_string();
                    if column.name == EMAIL_COLUMN || column.name == CONTACT_COLUMN {
                        Cell::new(redact_value(&text))
                    } else {
                        Cell::new(text)
                    }
                }
                None => dim_cell("-"),
            });
        }
        table.add_row(cells);
    }
    println!();
    println!("First {} of {} rows:", rows.min(merged.len()), merged.len());
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
