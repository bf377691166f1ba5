//! Arithmetic conditions detected during normalization.

use serde::Serialize;
use thiserror::Error;

/// Degenerate inputs the normalizer detects and resolves with a fallback.
///
/// These never abort a run. They are collected into the normalization
/// report and logged at warn level.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformError {
    /// The compositional columns of a row sum to zero, so proportions are
    /// undefined. `row` is the zero-based position in the deduplicated table.
    #[error("row {row}: compositional sum is zero, proportions are undefined")]
    DivisionByZeroRow { row: usize },

    /// A compositional column is constant after renormalization; its scaled
    /// values are set to 0.0.
    #[error("column '{column}' has zero variance, scaled values set to 0")]
    ZeroVarianceColumn { column: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TransformError::DivisionByZeroRow { row: 3 };
        assert_eq!(
            err.to_string(),
            "row 3: compositional sum is zero, proportions are undefined"
        );
        let err = TransformError::ZeroVarianceColumn {
            column: "SpeciesA".to_string(),
        };
        assert!(err.to_string().contains("SpeciesA"));
    }
}
