//! Abundance table ingestion.
//!
//! This crate reads delimited compositional datasets (per-sample taxon
//! counts) into Polars DataFrames and classifies every way a load can fail.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use abund_ingest::{LoadError, load_table};
//!
//! match load_table(Path::new("microbiome.csv")) {
//!     Ok(df) => println!("loaded {} rows", df.height()),
//!     Err(LoadError::NotFound { path }) => eprintln!("missing: {}", path.display()),
//!     Err(other) => eprintln!("{other}"),
//! }
//! ```

mod csv;
mod error;
mod polars_utils;

// === Error Types ===
pub use error::{LoadError, Result};

// === CSV Reading ===
pub use csv::{
    DEFAULT_INFER_SCHEMA_LENGTH, HeaderProblem, LoadOptions, check_header, load_table,
    load_table_with_options, nan_to_null, parse_csv_line, read_csv_header, validate_encoding,
};

// === Value Helpers ===
pub use polars_utils::format_numeric;
