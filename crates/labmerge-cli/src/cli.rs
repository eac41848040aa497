//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use labmerge_cli::config::ConfigOverrides;
use labmerge_model::SourceSpec;

#[derive(Parser)]
#[command(
    name = "labmerge",
    version,
    about = "Normalize and merge lab-result extracts into one dataset",
    long_about = "Normalize covid, dengue and influenza lab-result extracts onto one \
                  canonical schema and merge them into a single CSV.\n\n\
                  Rows with missing or malformed values are dropped and reported per source."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for humans, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Prefix log lines with a timestamp.
    #[arg(long = "log-timestamps", global = true)]
    pub log_timestamps: bool,

    /// Show emails and phone numbers in logs and the row preview.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Read, normalize and merge the sources, then write the merged CSV.
    Run(RunArgs),

    /// Print the raw-to-canonical column map.
    Schema,
}

#[derive(Parser)]
pub struct RunArgs {
    /// TOML file with pipeline settings. Flags below override it.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Source as NAME=PATH, in merge order. Repeat for each source.
    ///
    /// When given, replaces the configured sources entirely.
    #[arg(long = "source", value_name = "NAME=PATH")]
    pub sources: Vec<SourceSpec>,

    /// Destination of the merged CSV.
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Directory for chart images.
    #[arg(long = "charts-dir", value_name = "DIR")]
    pub charts_dir: Option<PathBuf>,

    /// Year ages are computed against (default: current year).
    #[arg(long = "reference-year", value_name = "YEAR")]
    pub reference_year: Option<i32>,

    /// The single accepted format for raw dates, in chrono syntax.
    #[arg(long = "date-format", value_name = "FORMAT")]
    pub date_format: Option<String>,

    /// Number of merged rows to preview (0 disables the preview).
    #[arg(long = "preview-rows", value_name = "N")]
    pub preview_rows: Option<usize>,

    /// Skip chart rendering.
    #[arg(long = "no-charts")]
    pub no_charts: bool,

    /// Run every stage and report without writing any file.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

impl RunArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            sources: self.sources.clone(),
            output: self.output.clone(),
            charts_dir: self.charts_dir.clone(),
            reference_year: self.reference_year,
            date_format: self.date_format.clone(),
            preview_rows: self.preview_rows,
            no_charts: self.no_charts,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
