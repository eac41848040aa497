use anyhow::Result;
use comfy_table::Table;
use tracing::info_span;

use labmerge_cli::config::resolve_config;
use labmerge_cli::pipeline::run_pipeline;
use labmerge_cli::types::RunResult;
use labmerge_model::CanonicalSchemaMap;

use crate::cli::RunArgs;
use crate::summary::apply_table_style;

pub fn run_schema() {
    let schema = CanonicalSchemaMap::standard();
    let mut table = Table::new();
    table.set_header(vec!["Raw column", "Canonical column", "Kind"]);
    apply_table_style(&mut table);
    for field in schema.fields() {
        table.add_row(vec![field.raw, field.canonical, field.kind.as_str()]);
    }
    println!("{table}");
    println!("Other columns pass through unchanged as test indicators.");
}

pub fn run(args: &RunArgs) -> Result<RunResult> {
    let span = info_span!("command", name = "run");
    let _guard = span.enter();
    let config = resolve_config(args.config.as_deref(), &args.overrides())?;
    run_pipeline(&config, args.dry_run)
}
