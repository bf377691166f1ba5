//! Cleaning pipeline driver with explicit stages.
//!
//! The pipeline follows these stages in order:
//! 1. **Loading**: Read the source CSV
//! 2. **ReportingBefore**: Profile the raw table
//! 3. **Repairing**: Drop duplicate rows, impute missing values
//! 4. **Normalizing**: Relative abundance, then standardization
//! 5. **ReportingAfter**: Profile the cleaned table
//! 6. **Persisting**: Write the cleaned CSV (and optional JSON run report)
//!
//! Any failure moves the run to `Failed` and skips every remaining stage,
//! so no output file is written.

use std::fmt;
use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use polars::prelude::DataFrame;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, info_span};

use abund_ingest::{LoadError, LoadOptions, load_table_with_options};
use abund_report::{
    TableProfile, discard_output, report, write_csv_output, write_run_report_json,
};
use abund_transform::{normalize, repair};

use crate::types::{RunOptions, RunSummary};

/// Stage of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Loading,
    ReportingBefore,
    Repairing,
    Normalizing,
    ReportingAfter,
    Persisting,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::ReportingBefore => "reporting_before",
            Self::Repairing => "repairing",
            Self::Normalizing => "normalizing",
            Self::ReportingAfter => "reporting_after",
            Self::Persisting => "persisting",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Stage that follows a successful `self`; `None` for terminal stages.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Loading => Some(Self::ReportingBefore),
            Self::ReportingBefore => Some(Self::Repairing),
            Self::Repairing => Some(Self::Normalizing),
            Self::Normalizing => Some(Self::ReportingAfter),
            Self::ReportingAfter => Some(Self::Persisting),
            Self::Persisting => Some(Self::Done),
            Self::Done | Self::Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a run ended in `Failed`.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The source table could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Anything not anticipated, raised by a stage after loading.
    #[error("{stage} stage failed: {error:#}")]
    Unexpected {
        stage: PipelineStage,
        error: anyhow::Error,
    },
}

impl PipelineError {
    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::Load(_) => PipelineStage::Loading,
            Self::Unexpected { stage, .. } => *stage,
        }
    }
}

/// Tracks the current stage and every stage entered.
#[derive(Debug)]
pub struct PipelineRun {
    stage: PipelineStage,
    history: Vec<PipelineStage>,
}

impl Default for PipelineRun {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineRun {
    pub fn new() -> Self {
        Self {
            stage: PipelineStage::Loading,
            history: vec![PipelineStage::Loading],
        }
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn history(&self) -> &[PipelineStage] {
        &self.history
    }

    /// Move to the next stage after `self.stage` completed.
    fn advance(&mut self) {
        if let Some(next) = self.stage.next() {
            info!(from = %self.stage, to = %next, "stage transition");
            self.stage = next;
            self.history.push(next);
        }
    }

    fn fail(&mut self, err: &PipelineError) {
        match err {
            PipelineError::Load(load) => error!(
                stage = %self.stage,
                kind = load.kind(),
                "{load}"
            ),
            PipelineError::Unexpected { stage, error } => error!(
                stage = %stage,
                "run aborted, nothing written: {error:?}"
            ),
        }
        self.stage = PipelineStage::Failed;
        self.history.push(PipelineStage::Failed);
    }

    fn unexpected(&self, error: anyhow::Error) -> PipelineError {
        PipelineError::Unexpected {
            stage: self.stage,
            error,
        }
    }

    /// Drive the run to `Done` or `Failed`.
    pub fn execute(&mut self, options: &RunOptions) -> Result<RunSummary, PipelineError> {
        let result = self.execute_stages(options);
        if let Err(err) = &result {
            self.fail(err);
        }
        result
    }

    fn execute_stages(&mut self, options: &RunOptions) -> Result<RunSummary, PipelineError> {
        let started_at = Utc::now();
        let start = Instant::now();
        let run_span = info_span!("run", input = %options.input.display());
        let _run_guard = run_span.enter();

        let df = info_span!("load").in_scope(|| load_stage(&options.input, &options.load))?;
        self.advance();

        let before = report(&df, "Before cleaning").map_err(|e| self.unexpected(e))?;
        self.advance();

        let (df, repair_report) = info_span!("repair")
            .in_scope(|| repair(df, &options.repair))
            .map_err(|e| self.unexpected(e))?;
        self.advance();

        let (mut df, normalize_report) = info_span!("normalize")
            .in_scope(|| normalize(df, &repair_report.classification, &options.normalize))
            .map_err(|e| self.unexpected(e))?;
        self.advance();

        let after = report(&df, "After cleaning").map_err(|e| self.unexpected(e))?;
        self.advance();

        let output = (!options.dry_run).then(|| options.output_path());
        let summary = RunSummary {
            input: options.input.clone(),
            output: output.clone(),
            started_at,
            duration_ms: start.elapsed().as_millis(),
            before,
            after,
            repair: repair_report,
            normalize: normalize_report,
            options: options.clone(),
        };
        info_span!("persist")
            .in_scope(|| persist_stage(&mut df, output.as_deref(), &summary, options))
            .map_err(|e| self.unexpected(e))?;
        self.advance();
        info!(duration_ms = summary.duration_ms, "run complete");
        Ok(summary)
    }
}

fn load_stage(path: &Path, options: &LoadOptions) -> Result<DataFrame, LoadError> {
    let df = load_table_with_options(path, options)?;
    println!(
        "Data loaded successfully: {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

/// Write the run report, then the cleaned table. When the table write fails
/// the report of this run is removed again.
fn persist_stage(
    df: &mut DataFrame,
    output: Option<&Path>,
    summary: &RunSummary,
    options: &RunOptions,
) -> anyhow::Result<()> {
    if let Some(path) = &options.report_json {
        write_run_report_json(path, summary)?;
    }
    let Some(path) = output else {
        info!("dry run; cleaned table not written");
        return Ok(());
    };
    if let Err(error) = write_csv_output(df, path, options.load.separator) {
        if let Some(report) = &options.report_json {
            discard_output(report);
        }
        return Err(error);
    }
    Ok(())
}

/// Run the whole pipeline once.
pub fn run_pipeline(options: &RunOptions) -> Result<RunSummary, PipelineError> {
    PipelineRun::new().execute(options)
}

/// Load a table and report its profile without transforming it.
pub fn profile_table(path: &Path, options: &LoadOptions) -> Result<TableProfile, PipelineError> {
    let df = load_stage(path, options).inspect_err(|err| {
        error!(kind = err.kind(), "{err}");
    })?;
    report(&df, "Profile").map_err(|error| PipelineError::Unexpected {
        stage: PipelineStage::ReportingBefore,
        error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        let mut stage = PipelineStage::Loading;
        let mut seen = vec![stage];
        while let Some(next) = stage.next() {
            seen.push(next);
            stage = next;
        }
        assert_eq!(
            seen,
            vec![
                PipelineStage::Loading,
                PipelineStage::ReportingBefore,
                PipelineStage::Repairing,
                PipelineStage::Normalizing,
                PipelineStage::ReportingAfter,
                PipelineStage::Persisting,
                PipelineStage::Done,
            ]
        );
        assert!(PipelineStage::Failed.is_terminal());
        assert_eq!(PipelineStage::Failed.next(), None);
    }

    #[test]
    fn test_unexpected_error_display() {
        let err = PipelineError::Unexpected {
            stage: PipelineStage::Normalizing,
            error: anyhow::anyhow!("boom").context("standardize"),
        };
        assert_eq!(err.stage(), PipelineStage::Normalizing);
        assert_eq!(err.to_string(), "normalizing stage failed: standardize: boom");
    }
}
