//! Data-quality repair and compositional normalization for abundance tables.
//!
//! Two stages operate on a loaded [`polars::prelude::DataFrame`]:
//!
//! 1. [`repair`] removes exact-duplicate rows and imputes missing cells,
//!    choosing the fill strategy from each column's [`ColumnKind`].
//! 2. [`normalize`] converts the compositional columns to relative
//!    abundances and standardizes them.

pub mod dedupe;
pub mod error;
pub mod impute;
pub mod normalize;
pub mod options;
pub mod repair;
pub mod types;

pub use dedupe::{count_duplicate_rows, drop_duplicate_rows, first_occurrence_mask};
pub use error::TransformError;
pub use impute::{ImputedColumn, impute_column, most_frequent};
pub use normalize::{
    CompositionalSelection, NormalizeReport, normalize, relative_abundance,
    select_compositional_columns, standardize,
};
pub use options::{
    DEFAULT_COMPOSITIONAL_PREFIXES, NormalizeOptions, RepairOptions, VARIANCE_EPSILON,
    ZeroSumPolicy,
};
pub use repair::{RepairReport, repair, total_missing};
pub use types::{ColumnClassification, ColumnKind, ImputeStrategy, classify_columns};
