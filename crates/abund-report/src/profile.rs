//! Read-only table profiling.

use polars::prelude::{DataFrame, PolarsResult};
use serde::Serialize;

use abund_transform::count_duplicate_rows;

/// Per-column dtype and missing-cell count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: String,
    pub missing: usize,
}

/// Shape and quality summary of a table at one point in the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableProfile {
    pub rows: usize,
    pub columns: usize,
    pub missing_total: usize,
    pub duplicate_rows: usize,
    pub column_profiles: Vec<ColumnProfile>,
}

impl TableProfile {
    /// Profile a DataFrame without modifying it.
    pub fn from_frame(df: &DataFrame) -> PolarsResult<Self> {
        let column_profiles: Vec<ColumnProfile> = df
            .get_columns()
            .iter()
            .map(|column| ColumnProfile {
                name: column.name().to_string(),
                dtype: column.dtype().to_string(),
                missing: column.null_count(),
            })
            .collect();
        Ok(Self {
            rows: df.height(),
            columns: df.width(),
            missing_total: column_profiles.iter().map(|column| column.missing).sum(),
            duplicate_rows: count_duplicate_rows(df)?,
            column_profiles,
        })
    }

    /// Columns that still contain missing cells.
    pub fn columns_with_missing(&self) -> impl Iterator<Item = &ColumnProfile> {
        self.column_profiles
            .iter()
            .filter(|column| column.missing > 0)
    }
}
