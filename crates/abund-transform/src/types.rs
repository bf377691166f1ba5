//! Column classification and imputation strategy types.

use polars::prelude::{DataFrame, DataType};
use serde::{Deserialize, Serialize};

/// Semantic type of a column, derived from its stored dtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl ColumnKind {
    /// Integer and floating-point dtypes of every width are numeric;
    /// everything else (strings, booleans, temporal values) is categorical.
    pub fn from_dtype(dtype: &DataType) -> Self {
        if dtype.is_primitive_numeric() {
            Self::Numeric
        } else {
            Self::Categorical
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
        }
    }
}

/// How missing cells of a column are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputeStrategy {
    /// Median of the non-missing values.
    Median,
    /// Most frequent non-missing value; ties go to the value seen first.
    MostFrequent,
}

impl ImputeStrategy {
    pub fn for_kind(kind: ColumnKind) -> Self {
        match kind {
            ColumnKind::Numeric => Self::Median,
            ColumnKind::Categorical => Self::MostFrequent,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Median => "median",
            Self::MostFrequent => "most_frequent",
        }
    }
}

/// Kind of every column in a table, in column order.
///
/// Computed once per run before imputation and reused by later stages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnClassification {
    pub columns: Vec<(String, ColumnKind)>,
}

impl ColumnClassification {
    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, kind)| *kind)
    }

    pub fn numeric(&self) -> impl Iterator<Item = &str> {
        self.of_kind(ColumnKind::Numeric)
    }

    pub fn categorical(&self) -> impl Iterator<Item = &str> {
        self.of_kind(ColumnKind::Categorical)
    }

    fn of_kind(&self, kind: ColumnKind) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(move |(_, k)| *k == kind)
            .map(|(name, _)| name.as_str())
    }
}

/// Classify every column of a DataFrame by dtype.
pub fn classify_columns(df: &DataFrame) -> ColumnClassification {
    let columns = df
        .get_columns()
        .iter()
        .map(|column| (column.name().to_string(), ColumnKind::from_dtype(column.dtype())))
        .collect();
    ColumnClassification { columns }
}
