//! Profiling, console reporting, and persistence for abundance tables.
//!
//! - [`report`] prints and logs a [`TableProfile`] (shape, per-column missing
//!   counts, duplicate rows) with a preview of the first rows.
//! - [`write_csv_output`] and [`write_run_report_json`] persist pipeline
//!   artifacts without ever leaving a partial file at the target path.

pub mod output;
pub mod profile;
pub mod render;

pub use output::{
    RUN_REPORT_SCHEMA, RUN_REPORT_SCHEMA_VERSION, discard_output, ensure_parent_dir,
    staging_path, write_csv_output, write_run_report_json,
};
pub use profile::{ColumnProfile, TableProfile};
pub use render::{
    PREVIEW_ROWS, align_column, apply_table_style, count_cell, dim_cell, header_cell,
    render_preview, render_profile, report,
};
