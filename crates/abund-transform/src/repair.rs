//! Quality repair: duplicate removal followed by type-aware imputation.

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::dedupe::drop_duplicate_rows;
use crate::impute::{ImputedColumn, impute_column};
use crate::options::RepairOptions;
use crate::types::{ColumnClassification, classify_columns};

/// What the repair stage changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RepairReport {
    /// Rows removed as exact duplicates of an earlier row.
    pub duplicates_removed: usize,
    /// Column kinds, computed once before imputation.
    pub classification: ColumnClassification,
    /// Columns that had missing cells.
    pub imputed: Vec<ImputedColumn>,
    /// Columns with no non-missing value, left unfilled.
    pub unfillable_columns: Vec<String>,
    /// Missing cells left after imputation.
    pub remaining_missing: usize,
}

impl RepairReport {
    /// Total number of cells filled across all columns.
    pub fn cells_filled(&self) -> usize {
        self.imputed.iter().map(|column| column.filled).sum()
    }

    /// True when the stage changed nothing.
    pub fn is_noop(&self) -> bool {
        self.duplicates_removed == 0 && self.cells_filled() == 0
    }
}

/// Total number of null cells in a DataFrame.
pub fn total_missing(df: &DataFrame) -> usize {
    df.get_columns().iter().map(|column| column.null_count()).sum()
}

/// Remove duplicate rows, then impute missing cells column by column.
pub fn repair(mut df: DataFrame, options: &RepairOptions) -> Result<(DataFrame, RepairReport)> {
    let mut report = RepairReport::default();

    if options.drop_duplicates {
        report.duplicates_removed =
            drop_duplicate_rows(&mut df).context("remove duplicate rows")?;
        if report.duplicates_removed > 0 {
            info!(
                removed = report.duplicates_removed,
                rows = df.height(),
                "removed duplicate rows"
            );
        } else {
            info!("no duplicate rows found");
        }
    } else {
        debug!("duplicate removal disabled");
    }

    report.classification = classify_columns(&df);
    debug!(
        numeric = report.classification.numeric().count(),
        categorical = report.classification.categorical().count(),
        "columns classified"
    );

    for (name, kind) in &report.classification.columns {
        let Some(outcome) =
            impute_column(&mut df, name, *kind).with_context(|| format!("impute {name}"))?
        else {
            continue;
        };
        match &outcome.fill_value {
            Some(value) => debug!(
                column = %name,
                strategy = outcome.strategy.as_str(),
                filled = outcome.filled,
                fill_value = %value,
                "imputed missing values"
            ),
            None => {
                warn!(
                    column = %name,
                    "column has no non-missing values; left unfilled"
                );
                report.unfillable_columns.push(name.clone());
            }
        }
        report.imputed.push(outcome);
    }

    report.remaining_missing = total_missing(&df);
    info!(
        filled = report.cells_filled(),
        remaining_missing = report.remaining_missing,
        "imputation complete"
    );
    Ok((df, report))
}
