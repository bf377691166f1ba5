//! CLI argument definitions for the abundance cleaning pipeline.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

use abund_ingest::{DEFAULT_INFER_SCHEMA_LENGTH, LoadOptions};
use abund_transform::{NormalizeOptions, RepairOptions, ZeroSumPolicy};

#[derive(Parser)]
#[command(
    name = "abund-prep",
    version,
    about = "Clean and normalize compositional abundance tables",
    long_about = "Remove duplicate rows, impute missing values, and convert \
                  compositional columns to standardized relative abundances.\n\n\
                  Numeric columns are filled with their median, categorical \
                  columns with their most frequent value."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Append logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the full cleaning pipeline and write the cleaned table.
    Run(RunArgs),

    /// Load a table and print its quality profile without changing anything.
    Profile(ProfileArgs),
}

#[derive(Parser)]
pub struct InputArgs {
    /// Path to the input CSV file.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Field separator: a single ASCII character, or "tab".
    #[arg(long = "separator", default_value = ",", value_parser = parse_separator)]
    pub separator: u8,

    /// Rows used to infer column types (0 scans the whole file).
    #[arg(long = "infer-schema-rows", default_value_t = DEFAULT_INFER_SCHEMA_LENGTH)]
    pub infer_schema_rows: usize,
}

impl InputArgs {
    pub fn load_options(&self) -> LoadOptions {
        let infer = (self.infer_schema_rows > 0).then_some(self.infer_schema_rows);
        LoadOptions::default()
            .with_separator(self.separator)
            .with_infer_schema_length(infer)
    }
}

#[derive(Parser)]
pub struct ProfileArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Parser)]
pub struct RunArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output CSV path (default: <INPUT-STEM>_cleaned.csv next to the input).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Column-name prefix marking compositional columns (repeatable).
    #[arg(long = "prefix", value_name = "PREFIX", default_value = "Species")]
    pub prefixes: Vec<String>,

    /// Value written for rows whose compositional sum is zero.
    #[arg(long = "zero-sum", value_enum, default_value = "undefined")]
    pub zero_sum: ZeroSumArg,

    /// Keep relative abundances instead of standardizing them.
    #[arg(long = "no-scale")]
    pub no_scale: bool,

    /// Keep exact-duplicate rows.
    #[arg(long = "keep-duplicates")]
    pub keep_duplicates: bool,

    /// Run every stage but do not write the cleaned table.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Write a JSON run report to this path.
    #[arg(long = "report-json", value_name = "PATH")]
    pub report_json: Option<PathBuf>,
}

impl RunArgs {
    pub fn repair_options(&self) -> RepairOptions {
        RepairOptions {
            drop_duplicates: !self.keep_duplicates,
        }
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions::new()
            .with_prefixes(self.prefixes.clone())
            .with_zero_sum(self.zero_sum.into())
            .with_scale(!self.no_scale)
    }
}

fn parse_separator(value: &str) -> Result<u8, String> {
    if value.eq_ignore_ascii_case("tab") || value == "\\t" {
        return Ok(b'\t');
    }
    match value.as_bytes() {
        [byte] if byte.is_ascii() && *byte != b'"' => Ok(*byte),
        _ => Err(format!("separator must be one ASCII character, got '{value}'")),
    }
}

/// CLI zero-sum policy choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum ZeroSumArg {
    Undefined,
    Zero,
}

impl From<ZeroSumArg> for ZeroSumPolicy {
    fn from(value: ZeroSumArg) -> Self {
        match value {
            ZeroSumArg::Undefined => ZeroSumPolicy::Undefined,
            ZeroSumArg::Zero => ZeroSumPolicy::Zero,
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
