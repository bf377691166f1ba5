//! Configuration options for repair and normalization.

use serde::{Deserialize, Serialize};

/// Column-name prefixes that mark compositional columns by default.
pub const DEFAULT_COMPOSITIONAL_PREFIXES: &[&str] = &["Species"];

/// Standard deviations below this are treated as zero variance.
pub const VARIANCE_EPSILON: f64 = 1e-12;

/// What to write into the compositional cells of a row whose sum is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroSumPolicy {
    /// Mark the proportions as missing (null); they are excluded from scaling.
    #[default]
    Undefined,
    /// Write 0.0 for every proportion.
    Zero,
}

/// Options for the quality repair stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairOptions {
    /// Remove rows that exactly duplicate an earlier row.
    pub drop_duplicates: bool,
}

impl Default for RepairOptions {
    fn default() -> Self {
        Self {
            drop_duplicates: true,
        }
    }
}

/// Options for the compositional normalization stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeOptions {
    /// Case-insensitive column-name prefixes of compositional columns.
    pub prefixes: Vec<String>,
    /// Handling of rows whose compositional sum is zero.
    pub zero_sum: ZeroSumPolicy,
    /// Standardize the proportions after renormalization.
    pub scale: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            prefixes: DEFAULT_COMPOSITIONAL_PREFIXES
                .iter()
                .map(|prefix| (*prefix).to_string())
                .collect(),
            zero_sum: ZeroSumPolicy::default(),
            scale: true,
        }
    }
}

impl NormalizeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.prefixes = prefixes;
        self
    }

    #[must_use]
    pub fn with_zero_sum(mut self, policy: ZeroSumPolicy) -> Self {
        self.zero_sum = policy;
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: bool) -> Self {
        self.scale = scale;
        self
    }
}
