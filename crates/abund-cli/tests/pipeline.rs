//! Integration tests for the pipeline driver.

use std::fs;
use std::path::{Path, PathBuf};

use abund_cli::pipeline::{PipelineError, PipelineRun, PipelineStage, run_pipeline};
use abund_cli::types::{RunOptions, default_output_path};
use abund_ingest::LoadError;

const SAMPLE: &str = "\
id,SpeciesA,SpeciesB,site
1,10,0,north
1,10,0,north
2,,5,south
3,4,4,south
";

fn write_input(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("microbiome.csv");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_run_writes_cleaned_csv() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), SAMPLE);
    let options = RunOptions::new(&input);

    let mut run = PipelineRun::new();
    let summary = run.execute(&options).unwrap();

    assert_eq!(run.stage(), PipelineStage::Done);
    assert_eq!(
        run.history(),
        &[
            PipelineStage::Loading,
            PipelineStage::ReportingBefore,
            PipelineStage::Repairing,
            PipelineStage::Normalizing,
            PipelineStage::ReportingAfter,
            PipelineStage::Persisting,
            PipelineStage::Done,
        ]
    );
    assert_eq!(summary.before.rows, 4);
    assert_eq!(summary.after.rows, 3);
    assert_eq!(summary.repair.duplicates_removed, 1);
    assert_eq!(summary.after.missing_total, 0);
    assert_eq!(
        summary.normalize.selection.columns,
        vec!["SpeciesA".to_string(), "SpeciesB".to_string()]
    );

    let output = default_output_path(&input);
    assert_eq!(summary.output.as_deref(), Some(output.as_path()));
    let written = fs::read_to_string(&output).unwrap();
    let mut lines = written.lines();
    assert_eq!(lines.next(), Some("id,SpeciesA,SpeciesB,site"));
    assert_eq!(lines.count(), 3);
}

#[test]
fn test_missing_input_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("absent.csv");
    let options = RunOptions::new(&input);

    let mut run = PipelineRun::new();
    let err = run.execute(&options).unwrap_err();

    assert!(matches!(err, PipelineError::Load(LoadError::NotFound { .. })));
    assert_eq!(err.stage(), PipelineStage::Loading);
    assert_eq!(run.stage(), PipelineStage::Failed);
    assert_eq!(run.history(), &[PipelineStage::Loading, PipelineStage::Failed]);
    assert!(!default_output_path(&input).exists());
}

#[test]
fn test_empty_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "");
    let err = run_pipeline(&RunOptions::new(&input)).unwrap_err();
    assert!(matches!(err, PipelineError::Load(LoadError::Empty { .. })));
    assert!(!default_output_path(&input).exists());
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), SAMPLE);
    let options = RunOptions {
        dry_run: true,
        ..RunOptions::new(&input)
    };

    let summary = run_pipeline(&options).unwrap();

    assert!(summary.output.is_none());
    assert_eq!(summary.after.rows, 3);
    assert!(!default_output_path(&input).exists());
}

#[test]
fn test_explicit_output_and_json_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), SAMPLE);
    let output = dir.path().join("out").join("clean.csv");
    let report = dir.path().join("out").join("run.json");
    let options = RunOptions {
        output: Some(output.clone()),
        report_json: Some(report.clone()),
        ..RunOptions::new(&input)
    };

    run_pipeline(&options).unwrap();

    assert!(output.exists());
    assert!(!default_output_path(&input).exists());
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(value["schema"], "abund.run_report");
    assert_eq!(value["run"]["repair"]["duplicates_removed"], 1);
    assert_eq!(value["run"]["before"]["rows"], 4);
    assert_eq!(value["run"]["after"]["rows"], 3);
}

#[test]
fn test_report_failure_leaves_no_cleaned_csv() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), SAMPLE);
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();
    let output = dir.path().join("clean.csv");
    let options = RunOptions {
        output: Some(output.clone()),
        report_json: Some(blocker.join("run.json")),
        ..RunOptions::new(&input)
    };

    let mut run = PipelineRun::new();
    let err = run.execute(&options).unwrap_err();

    assert!(matches!(err, PipelineError::Unexpected { .. }));
    assert_eq!(err.stage(), PipelineStage::Persisting);
    assert_eq!(run.stage(), PipelineStage::Failed);
    assert!(!output.exists());
}

#[test]
fn test_csv_failure_removes_run_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), SAMPLE);
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();
    let output = blocker.join("clean.csv");
    let report = dir.path().join("run.json");
    let options = RunOptions {
        output: Some(output.clone()),
        report_json: Some(report.clone()),
        ..RunOptions::new(&input)
    };

    let mut run = PipelineRun::new();
    let err = run.execute(&options).unwrap_err();

    assert_eq!(err.stage(), PipelineStage::Persisting);
    assert_eq!(run.stage(), PipelineStage::Failed);
    assert_eq!(run.history().last(), Some(&PipelineStage::Failed));
    assert!(!output.exists());
    assert!(!report.exists());
}
