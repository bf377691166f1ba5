//! Exact-duplicate row detection and removal.

use std::collections::HashSet;

use polars::prelude::{BooleanChunked, DataFrame, DataType, NewChunkedArray, PolarsResult};

/// Cell values of one row, with nulls kept distinct from any string.
type RowKey = Vec<Option<String>>;

fn row_keys(df: &DataFrame) -> PolarsResult<Vec<RowKey>> {
    let mut keys: Vec<RowKey> = vec![Vec::with_capacity(df.width()); df.height()];
    for column in df.get_columns() {
        let as_str = column.cast(&DataType::String)?;
        let values = as_str.str()?;
        for (idx, value) in values.into_iter().enumerate() {
            keys[idx].push(value.map(str::to_string));
        }
    }
    Ok(keys)
}

/// One flag per row: `true` for the first occurrence of its values across
/// all columns, `false` for a later exact duplicate. Null equals null.
pub fn first_occurrence_mask(df: &DataFrame) -> PolarsResult<Vec<bool>> {
    let mut seen = HashSet::with_capacity(df.height());
    Ok(row_keys(df)?
        .into_iter()
        .map(|key| seen.insert(key))
        .collect())
}

/// Number of rows that duplicate an earlier row.
pub fn count_duplicate_rows(df: &DataFrame) -> PolarsResult<usize> {
    if df.height() == 0 {
        return Ok(0);
    }
    Ok(first_occurrence_mask(df)?
        .into_iter()
        .filter(|keep| !keep)
        .count())
}

/// Removes every row that duplicates an earlier row, keeping row order.
/// Returns the number of rows removed.
pub fn drop_duplicate_rows(df: &mut DataFrame) -> PolarsResult<usize> {
    if df.height() == 0 {
        return Ok(0);
    }
    let keep = first_occurrence_mask(df)?;
    let removed = keep.iter().filter(|flag| !**flag).count();
    if removed == 0 {
        return Ok(0);
    }
    let mask = BooleanChunked::from_slice("dedupe".into(), &keep);
    *df = df.filter(&mask)?;
    Ok(removed)
}
