use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use abund_ingest::LoadOptions;
use abund_report::TableProfile;
use abund_transform::{NormalizeOptions, NormalizeReport, RepairOptions, RepairReport};

/// Everything that controls one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunOptions {
    pub input: PathBuf,
    /// Cleaned table path; `None` derives `<stem>_cleaned.csv` from the input.
    pub output: Option<PathBuf>,
    pub dry_run: bool,
    pub report_json: Option<PathBuf>,
    pub load: LoadOptions,
    pub repair: RepairOptions,
    pub normalize: NormalizeOptions,
}

impl RunOptions {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: None,
            dry_run: false,
            report_json: None,
            load: LoadOptions::default(),
            repair: RepairOptions::default(),
            normalize: NormalizeOptions::default(),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(&self.input))
    }
}

/// `<dir>/<stem>_cleaned.csv` for an input `<dir>/<stem>.<ext>`.
pub fn default_output_path(input: &std::path::Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{stem}_cleaned.csv"))
}

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub input: PathBuf,
    /// Written cleaned table; `None` on a dry run.
    pub output: Option<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u128,
    pub before: TableProfile,
    pub after: TableProfile,
    pub repair: RepairReport,
    pub normalize: NormalizeReport,
    pub options: RunOptions,
}
