//! CSV reading utilities.

mod header;
mod reader;

pub use header::{HeaderProblem, check_header, parse_csv_line};
pub use reader::{
    DEFAULT_INFER_SCHEMA_LENGTH, LoadOptions, load_table, load_table_with_options, nan_to_null,
    read_csv_header, validate_encoding,
};
