//! Persistence of the cleaned table and the JSON run report.
//!
//! Files are written to a sibling temporary path and renamed into place,
//! so a failed write never leaves a partial artifact at the target path.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use serde::Serialize;
use tracing::{debug, info, warn};

pub const RUN_REPORT_SCHEMA: &str = "abund.run_report";
pub const RUN_REPORT_SCHEMA_VERSION: u32 = 1;

/// Ensure a parent directory exists for a file path.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    Ok(())
}

/// Temporary sibling used while `path` is being written.
pub fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    path.with_file_name(format!(".{name}.partial"))
}

fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    ensure_parent_dir(path)?;
    let staging = staging_path(path);
    let result = (|| -> Result<()> {
        let mut file = File::create(&staging)
            .with_context(|| format!("create {}", staging.display()))?;
        write(&mut file)?;
        file.flush()
            .with_context(|| format!("flush {}", staging.display()))?;
        fs::rename(&staging, path)
            .with_context(|| format!("move {} into place", path.display()))?;
        Ok(())
    })();
    if result.is_err() {
        discard_output(&staging);
    }
    result
}

/// Remove an artifact written by an aborted run. Failures are logged only.
pub fn discard_output(path: &Path) {
    if !path.exists() {
        return;
    }
    debug!(path = %path.display(), "removing output of failed run");
    if let Err(error) = fs::remove_file(path) {
        warn!(path = %path.display(), %error, "could not remove output of failed run");
    }
}

/// Write the cleaned table as CSV with a header row.
pub fn write_csv_output(df: &mut DataFrame, path: &Path, separator: u8) -> Result<PathBuf> {
    write_atomically(path, |file| {
        CsvWriter::new(file)
            .include_header(true)
            .with_separator(separator)
            .finish(df)
            .with_context(|| format!("write csv {}", path.display()))
    })?;
    info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "cleaned data written"
    );
    Ok(path.to_path_buf())
}

#[derive(Serialize)]
struct RunReportPayload<'a, T: Serialize> {
    schema: &'static str,
    schema_version: u32,
    generated_at: String,
    run: &'a T,
}

/// Write a JSON run report wrapping `run`.
pub fn write_run_report_json<T: Serialize>(path: &Path, run: &T) -> Result<PathBuf> {
    let payload = RunReportPayload {
        schema: RUN_REPORT_SCHEMA,
        schema_version: RUN_REPORT_SCHEMA_VERSION,
        generated_at: Utc::now().to_rfc3339(),
        run,
    };
    let json = serde_json::to_string_pretty(&payload).context("serialize run report")?;
    write_atomically(path, |file| {
        file.write_all(format!("{json}\n").as_bytes())
            .with_context(|| format!("write {}", path.display()))
    })?;
    info!(path = %path.display(), "run report written");
    Ok(path.to_path_buf())
}
