use comfy_table::{Attribute, Cell, CellAlignment, Color, Table};

use abund_cli::types::RunSummary;
use abund_report::{align_column, apply_table_style, count_cell, dim_cell, header_cell};

pub fn print_summary(summary: &RunSummary) {
    println!();
    println!("Input: {}", summary.input.display());
    match &summary.output {
        Some(path) => println!("Output: {}", path.display()),
        None => println!("Output: (dry run, nothing written)"),
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Step"),
        header_cell("Before"),
        header_cell("After"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    table.add_row(vec![
        Cell::new("Rows"),
        Cell::new(summary.before.rows),
        Cell::new(summary.after.rows),
    ]);
    table.add_row(vec![
        Cell::new("Columns"),
        Cell::new(summary.before.columns),
        Cell::new(summary.after.columns),
    ]);
    table.add_row(vec![
        Cell::new("Missing cells"),
        count_cell(summary.before.missing_total, Color::Yellow),
        count_cell(summary.after.missing_total, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Duplicate rows"),
        count_cell(summary.before.duplicate_rows, Color::Yellow),
        count_cell(summary.after.duplicate_rows, Color::Yellow),
    ]);
    println!("{table}");

    let normalize = &summary.normalize;
    let mut steps = Table::new();
    steps.set_header(vec![header_cell("Change"), header_cell("Count")]);
    apply_table_style(&mut steps);
    align_column(&mut steps, 1, CellAlignment::Right);
    steps.add_row(vec![
        Cell::new("Duplicates removed"),
        Cell::new(summary.repair.duplicates_removed),
    ]);
    steps.add_row(vec![
        Cell::new("Cells imputed"),
        Cell::new(summary.repair.cells_filled()),
    ]);
    steps.add_row(vec![
        Cell::new("Compositional columns"),
        Cell::new(normalize.selection.columns.len()),
    ]);
    steps.add_row(vec![
        Cell::new("Zero-sum rows"),
        count_cell(normalize.zero_sum_rows.len(), Color::Yellow),
    ]);
    steps.add_row(vec![
        Cell::new("Zero-variance columns"),
        count_cell(normalize.zero_variance_columns.len(), Color::Yellow),
    ]);
    steps.add_row(vec![
        Cell::new("Standardized").add_attribute(Attribute::Bold),
        if normalize.scaled {
            Cell::new("yes").fg(Color::Green)
        } else {
            dim_cell("no")
        },
    ]);
    println!("{steps}");

    if !summary.repair.unfillable_columns.is_empty() {
        eprintln!("Columns left with missing values (no observed value to impute from):");
        for column in &summary.repair.unfillable_columns {
            eprintln!("- {column}");
        }
    }
    if !normalize.issues.is_empty() {
        eprintln!("Normalization issues:");
        for issue in &normalize.issues {
            eprintln!("- {issue}");
        }
    }
}
