//! Compositional normalization.
//!
//! Selected columns are first converted to relative abundances (each row
//! divided by its compositional total) and then standardized per column.
//! Standardization breaks the per-row sum-to-one property; that is expected.
//!
//! Two degenerate cases are resolved with explicit fallbacks instead of an
//! unguarded division:
//!
//! - a row whose compositional sum is zero gets the value chosen by
//!   [`ZeroSumPolicy`] (null by default) in every selected column;
//! - a column whose standard deviation is below [`VARIANCE_EPSILON`] has all
//!   of its scaled values set to 0.0.

use anyhow::{Context, Result};
use polars::prelude::{
    ChunkAgg, ChunkVar, DataFrame, DataType, NamedFrom, PolarsResult, Series,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::TransformError;
use crate::options::{NormalizeOptions, VARIANCE_EPSILON, ZeroSumPolicy};
use crate::types::{ColumnClassification, ColumnKind};

/// Columns chosen as the compositional feature set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompositionalSelection {
    /// Numeric columns matching a prefix, in table order.
    pub columns: Vec<String>,
    /// Prefix-matching columns excluded because they are not numeric.
    pub skipped_categorical: Vec<String>,
}

/// What the normalization stage did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizeReport {
    pub selection: CompositionalSelection,
    /// Zero-based positions of rows whose compositional sum was zero.
    pub zero_sum_rows: Vec<usize>,
    /// Columns with zero variance after renormalization.
    pub zero_variance_columns: Vec<String>,
    /// Whether standardization was applied.
    pub scaled: bool,
    /// Every degenerate condition detected, in detection order.
    pub issues: Vec<TransformError>,
}

fn matches_prefix(name: &str, prefixes: &[String]) -> bool {
    let lower = name.to_lowercase();
    prefixes
        .iter()
        .any(|prefix| !prefix.is_empty() && lower.starts_with(&prefix.to_lowercase()))
}

/// Select compositional columns by name prefix (case-insensitive).
pub fn select_compositional_columns(
    classification: &ColumnClassification,
    prefixes: &[String],
) -> CompositionalSelection {
    let mut selection = CompositionalSelection::default();
    for (name, kind) in &classification.columns {
        if !matches_prefix(name, prefixes) {
            continue;
        }
        match kind {
            ColumnKind::Numeric => selection.columns.push(name.clone()),
            ColumnKind::Categorical => selection.skipped_categorical.push(name.clone()),
        }
    }
    selection
}

fn read_f64_columns(df: &DataFrame, columns: &[String]) -> PolarsResult<Vec<Vec<Option<f64>>>> {
    columns
        .iter()
        .map(|name| {
            let as_f64 = df.column(name)?.cast(&DataType::Float64)?;
            Ok(as_f64.f64()?.into_iter().collect())
        })
        .collect()
}

fn write_f64_column(df: &mut DataFrame, name: &str, values: Vec<Option<f64>>) -> PolarsResult<()> {
    df.with_column(Series::new(name.into(), values))?;
    Ok(())
}

/// Divide each selected value by its row total across the selected columns.
///
/// Null cells are skipped in the total and stay null. Rows with no values
/// are left as they are. Returns the positions of zero-sum rows.
pub fn relative_abundance(
    df: &mut DataFrame,
    columns: &[String],
    policy: ZeroSumPolicy,
) -> PolarsResult<Vec<usize>> {
    if columns.is_empty() {
        return Ok(Vec::new());
    }
    let mut data = read_f64_columns(df, columns)?;
    let mut zero_sum_rows = Vec::new();

    for row in 0..df.height() {
        let mut present = 0usize;
        let mut total = 0.0f64;
        for column in &data {
            if let Some(value) = column[row] {
                present += 1;
                total += value;
            }
        }
        if present == 0 {
            continue;
        }
        if total == 0.0 {
            zero_sum_rows.push(row);
            let fallback = match policy {
                ZeroSumPolicy::Undefined => None,
                ZeroSumPolicy::Zero => Some(0.0),
            };
            for column in &mut data {
                column[row] = fallback;
            }
            continue;
        }
        for column in &mut data {
            if let Some(value) = column[row].as_mut() {
                *value /= total;
            }
        }
    }

    for (name, values) in columns.iter().zip(data) {
        write_f64_column(df, name, values)?;
    }
    Ok(zero_sum_rows)
}

/// Standardize each column to zero mean and unit variance (population
/// standard deviation). Returns the columns treated as zero variance.
pub fn standardize(df: &mut DataFrame, columns: &[String]) -> PolarsResult<Vec<String>> {
    let mut zero_variance = Vec::new();
    for name in columns {
        let as_f64 = df.column(name)?.cast(&DataType::Float64)?;
        let values = as_f64.f64()?;
        let Some(mean) = values.mean() else {
            debug!(column = %name, "column has no values to scale");
            continue;
        };
        let std = values.std(0).unwrap_or(0.0);
        let scaled: Vec<Option<f64>> = if !std.is_finite() || std < VARIANCE_EPSILON {
            zero_variance.push(name.clone());
            values.into_iter().map(|value| value.map(|_| 0.0)).collect()
        } else {
            values
                .into_iter()
                .map(|value| value.map(|v| (v - mean) / std))
                .collect()
        };
        write_f64_column(df, name, scaled)?;
    }
    Ok(zero_variance)
}

/// Renormalize and scale the compositional columns of a repaired table.
///
/// Non-compositional columns pass through untouched.
pub fn normalize(
    mut df: DataFrame,
    classification: &ColumnClassification,
    options: &NormalizeOptions,
) -> Result<(DataFrame, NormalizeReport)> {
    let mut report = NormalizeReport {
        selection: select_compositional_columns(classification, &options.prefixes),
        ..NormalizeReport::default()
    };

    for name in &report.selection.skipped_categorical {
        warn!(column = %name, "prefix-matching column is not numeric; excluded from normalization");
    }
    if report.selection.columns.is_empty() {
        warn!(prefixes = ?options.prefixes, "no compositional columns found; table left unchanged");
        return Ok((df, report));
    }
    info!(
        columns = report.selection.columns.len(),
        "selected compositional columns"
    );

    report.zero_sum_rows = relative_abundance(&mut df, &report.selection.columns, options.zero_sum)
        .context("compute relative abundance")?;
    for row in &report.zero_sum_rows {
        let issue = TransformError::DivisionByZeroRow { row: *row };
        warn!(policy = ?options.zero_sum, "{issue}");
        report.issues.push(issue);
    }
    if !report.zero_sum_rows.is_empty() {
        warn!(
            rows = report.zero_sum_rows.len(),
            "rows with zero compositional sum"
        );
    }

    if options.scale {
        report.zero_variance_columns = standardize(&mut df, &report.selection.columns)
            .context("standardize compositional columns")?;
        for column in &report.zero_variance_columns {
            let issue = TransformError::ZeroVarianceColumn {
                column: column.clone(),
            };
            warn!("{issue}");
            report.issues.push(issue);
        }
        report.scaled = true;
    } else {
        debug!("scaling disabled; proportions kept");
    }

    info!(
        zero_sum_rows = report.zero_sum_rows.len(),
        zero_variance_columns = report.zero_variance_columns.len(),
        "normalization complete"
    );
    Ok((df, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::classify_columns;
    use polars::prelude::{Column, NamedFrom};

    fn values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        df.column(name)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|name| (*name).to_string()).collect()
    }

    #[test]
    fn test_select_compositional_columns() {
        let df = DataFrame::new(vec![
            Column::new("id".into(), vec![1i64]),
            Column::new("SpeciesA".into(), vec![1.0f64]),
            Column::new("species_b".into(), vec![2i64]),
            Column::new("SpeciesNote".into(), vec!["x"]),
        ])
        .unwrap();
        let selection = select_compositional_columns(&classify_columns(&df), &names(&["Species"]));
        assert_eq!(selection.columns, names(&["SpeciesA", "species_b"]));
        assert_eq!(selection.skipped_categorical, names(&["SpeciesNote"]));
    }

    #[test]
    fn test_relative_abundance_zero_policy() {
        let mut df = DataFrame::new(vec![
            Column::new("SpeciesA".into(), vec![0.0f64, 3.0]),
            Column::new("SpeciesB".into(), vec![0.0f64, 1.0]),
        ])
        .unwrap();
        let columns = names(&["SpeciesA", "SpeciesB"]);
        let rows = relative_abundance(&mut df, &columns, ZeroSumPolicy::Zero).unwrap();
        assert_eq!(rows, vec![0]);
        assert_eq!(values(&df, "SpeciesA"), vec![Some(0.0), Some(0.75)]);
        assert_eq!(values(&df, "SpeciesB"), vec![Some(0.0), Some(0.25)]);
    }

    #[test]
    fn test_relative_abundance_undefined_policy() {
        let mut df = DataFrame::new(vec![
            Column::new("SpeciesA".into(), vec![0i64, 1]),
            Column::new("SpeciesB".into(), vec![0i64, 1]),
        ])
        .unwrap();
        let columns = names(&["SpeciesA", "SpeciesB"]);
        let rows = relative_abundance(&mut df, &columns, ZeroSumPolicy::Undefined).unwrap();
        assert_eq!(rows, vec![0]);
        assert_eq!(values(&df, "SpeciesA"), vec![None, Some(0.5)]);
    }

    #[test]
    fn test_standardize_zero_variance() {
        let mut df = DataFrame::new(vec![
            Column::new("SpeciesA".into(), vec![0.5f64, 0.5, 0.5]),
            Column::new("SpeciesB".into(), vec![1.0f64, 2.0, 3.0]),
        ])
        .unwrap();
        let flat = standardize(&mut df, &names(&["SpeciesA", "SpeciesB"])).unwrap();
        assert_eq!(flat, names(&["SpeciesA"]));
        assert_eq!(values(&df, "SpeciesA"), vec![Some(0.0); 3]);

        let scaled = values(&df, "SpeciesB");
        let expected = 1.0 / (2.0f64 / 3.0).sqrt();
        assert!((scaled[0].unwrap() + expected).abs() < 1e-9);
        assert!(scaled[1].unwrap().abs() < 1e-9);
        assert!((scaled[2].unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_without_compositional_columns() {
        let df = DataFrame::new(vec![Column::new("id".into(), vec![1i64, 2])]).unwrap();
        let classification = classify_columns(&df);
        let (out, report) = normalize(df, &classification, &NormalizeOptions::default()).unwrap();
        assert_eq!(out.width(), 1);
        assert!(report.selection.columns.is_empty());
        assert!(!report.scaled);
    }

    #[test]
    fn test_normalize_without_scaling_keeps_proportions() {
        let df = DataFrame::new(vec![
            Column::new("SpeciesA".into(), vec![1.0f64, 2.0]),
            Column::new("SpeciesB".into(), vec![3.0f64, 2.0]),
        ])
        .unwrap();
        let classification = classify_columns(&df);
        let options = NormalizeOptions::default().with_scale(false);
        let (out, report) = normalize(df, &classification, &options).unwrap();
        assert!(!report.scaled);
        assert_eq!(values(&out, "SpeciesA"), vec![Some(0.25), Some(0.5)]);
    }
}
