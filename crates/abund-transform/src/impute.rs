//! Per-column missing-value imputation.
//!
//! Each column is filled independently: the fill value of one column never
//! depends on another column.

use std::collections::HashMap;
use std::hash::Hash;

use abund_ingest::format_numeric;
use polars::prelude::{ChunkQuantile, DataFrame, DataType, NamedFrom, PolarsResult, Series};
use serde::Serialize;

use crate::types::{ColumnKind, ImputeStrategy};

/// Outcome of imputing a single column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImputedColumn {
    pub name: String,
    pub kind: ColumnKind,
    pub strategy: ImputeStrategy,
    /// Number of cells that were filled.
    pub filled: usize,
    /// Fill value rendered as text; `None` when the column had no
    /// non-missing value to derive one from.
    pub fill_value: Option<String>,
}

/// Most frequent value of an iterator, skipping `None`.
///
/// Ties are broken by the value encountered first.
pub fn most_frequent<T, I>(values: I) -> Option<T>
where
    T: Hash + Eq + Clone,
    I: IntoIterator<Item = Option<T>>,
{
    let mut counts: HashMap<T, (usize, usize)> = HashMap::new();
    for (position, value) in values.into_iter().enumerate() {
        let Some(value) = value else {
            continue;
        };
        counts
            .entry(value)
            .and_modify(|(count, _)| *count += 1)
            .or_insert((1, position));
    }
    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(value, _)| value)
}

/// Fill one column in place using the strategy for its kind.
///
/// Returns `None` when the column has no missing cells.
pub fn impute_column(
    df: &mut DataFrame,
    name: &str,
    kind: ColumnKind,
) -> PolarsResult<Option<ImputedColumn>> {
    let missing = df.column(name)?.null_count();
    if missing == 0 {
        return Ok(None);
    }
    let strategy = ImputeStrategy::for_kind(kind);
    let fill_value = match strategy {
        ImputeStrategy::Median => fill_median(df, name)?,
        ImputeStrategy::MostFrequent => fill_most_frequent(df, name)?,
    };
    let filled = if fill_value.is_some() { missing } else { 0 };
    Ok(Some(ImputedColumn {
        name: name.to_string(),
        kind,
        strategy,
        filled,
        fill_value,
    }))
}

/// Fills nulls with the column median. The column becomes `Float64`.
fn fill_median(df: &mut DataFrame, name: &str) -> PolarsResult<Option<String>> {
    let as_f64 = df.column(name)?.cast(&DataType::Float64)?;
    let values = as_f64.f64()?;
    let Some(median) = values.median() else {
        return Ok(None);
    };
    let filled: Vec<Option<f64>> = values
        .into_iter()
        .map(|value| Some(value.unwrap_or(median)))
        .collect();
    df.with_column(Series::new(name.into(), filled))?;
    Ok(Some(format_numeric(median)))
}

/// Fills nulls with the most frequent value. Boolean columns stay boolean;
/// every other categorical dtype is filled as text.
fn fill_most_frequent(df: &mut DataFrame, name: &str) -> PolarsResult<Option<String>> {
    let column = df.column(name)?;
    if column.dtype() == &DataType::Boolean {
        let values = column.bool()?;
        let Some(mode) = most_frequent(values.into_iter()) else {
            return Ok(None);
        };
        let filled: Vec<Option<bool>> = values
            .into_iter()
            .map(|value| Some(value.unwrap_or(mode)))
            .collect();
        df.with_column(Series::new(name.into(), filled))?;
        return Ok(Some(mode.to_string()));
    }

    let as_str = column.cast(&DataType::String)?;
    let values = as_str.str()?;
    let Some(mode) = most_frequent(values.into_iter()).map(str::to_string) else {
        return Ok(None);
    };
    let filled: Vec<Option<String>> = values
        .into_iter()
        .map(|value| Some(value.map_or_else(|| mode.clone(), str::to_string)))
        .collect();
    df.with_column(Series::new(name.into(), filled))?;
    Ok(Some(mode))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{Column, NamedFrom};

    #[test]
    fn test_most_frequent_tie_breaks_on_first_seen() {
        let values = vec![Some("b"), Some("a"), Some("a"), Some("b"), None];
        assert_eq!(most_frequent(values), Some("b"));
    }

    #[test]
    fn test_most_frequent_all_missing() {
        let values: Vec<Option<&str>> = vec![None, None];
        assert_eq!(most_frequent(values), None);
    }

    #[test]
    fn test_impute_numeric_median_even_count() {
        let mut df = DataFrame::new(vec![Column::new(
            "SpeciesA".into(),
            vec![Some(1i64), None, Some(4), Some(2), Some(9)],
        )])
        .unwrap();
        let outcome = impute_column(&mut df, "SpeciesA", ColumnKind::Numeric)
            .unwrap()
            .unwrap();
        assert_eq!(outcome.filled, 1);
        assert_eq!(outcome.fill_value.as_deref(), Some("3"));
        let values: Vec<Option<f64>> = df
            .column("SpeciesA")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values[1], Some(3.0));
    }

    #[test]
    fn test_impute_categorical_string() {
        let mut df = DataFrame::new(vec![Column::new(
            "site".into(),
            vec![Some("gut"), None, Some("skin"), Some("gut")],
        )])
        .unwrap();
        let outcome = impute_column(&mut df, "site", ColumnKind::Categorical)
            .unwrap()
            .unwrap();
        assert_eq!(outcome.strategy, ImputeStrategy::MostFrequent);
        assert_eq!(outcome.fill_value.as_deref(), Some("gut"));
        assert_eq!(df.column("site").unwrap().null_count(), 0);
        assert_eq!(df.column("site").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_impute_categorical_boolean() {
        let mut df = DataFrame::new(vec![Column::new(
            "treated".into(),
            vec![Some(true), None, Some(false), Some(false)],
        )])
        .unwrap();
        impute_column(&mut df, "treated", ColumnKind::Categorical).unwrap();
        let values: Vec<Option<bool>> = df
            .column("treated")
            .unwrap()
            .bool()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values, vec![Some(true), Some(false), Some(false), Some(false)]);
    }

    #[test]
    fn test_impute_entirely_missing_column() {
        let mut df =
            DataFrame::new(vec![Column::new("SpeciesZ".into(), vec![None::<f64>, None])]).unwrap();
        let outcome = impute_column(&mut df, "SpeciesZ", ColumnKind::Numeric)
            .unwrap()
            .unwrap();
        assert_eq!(outcome.filled, 0);
        assert_eq!(outcome.fill_value, None);
        assert_eq!(df.column("SpeciesZ").unwrap().null_count(), 2);
    }

    #[test]
    fn test_impute_complete_column_is_untouched() {
        let mut df = DataFrame::new(vec![Column::new("id".into(), vec![1i64, 2])]).unwrap();
        assert!(
            impute_column(&mut df, "id", ColumnKind::Numeric)
                .unwrap()
                .is_none()
        );
        assert_eq!(df.column("id").unwrap().dtype(), &DataType::Int64);
    }
}
