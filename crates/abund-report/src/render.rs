//! Console rendering of table profiles.

use anyhow::{Context, Result};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use polars::prelude::DataFrame;
use tracing::info;

use crate::profile::TableProfile;

/// Number of rows shown in the table preview.
pub const PREVIEW_ROWS: usize = 5;

/// Profile `df`, log the result, and print it with a short preview.
///
/// The table is only read.
pub fn report(df: &DataFrame, label: &str) -> Result<TableProfile> {
    let profile =
        TableProfile::from_frame(df).with_context(|| format!("profile table ({label})"))?;
    info!(
        stage = label,
        rows = profile.rows,
        columns = profile.columns,
        missing = profile.missing_total,
        duplicate_rows = profile.duplicate_rows,
        "table profile"
    );
    for column in profile.columns_with_missing() {
        info!(stage = label, column = %column.name, missing = column.missing, "missing values");
    }
    println!();
    println!("== {label} ==");
    println!("{}", render_profile(&profile));
    println!("First rows:");
    println!("{}", render_preview(df, PREVIEW_ROWS));
    Ok(profile)
}

/// Render the per-column dtype and missing counts as a table.
pub fn render_profile(profile: &TableProfile) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Type"),
        header_cell("Missing"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for column in &profile.column_profiles {
        table.add_row(vec![
            Cell::new(&column.name),
            dim_cell(&column.dtype),
            count_cell(column.missing, Color::Yellow),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} rows x {} columns", profile.rows, profile.columns)),
        count_cell(profile.missing_total, Color::Yellow).add_attribute(Attribute::Bold),
    ]);
    format!(
        "{table}\nDuplicate rows: {}",
        profile.duplicate_rows
    )
}

/// Render the first `rows` rows of a DataFrame.
pub fn render_preview(df: &DataFrame, rows: usize) -> String {
    df.head(Some(rows)).to_string()
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

pub fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

pub fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
