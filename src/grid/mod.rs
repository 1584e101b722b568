//! Grid projection: turning the first worksheet into a table plan.
//!
//! The plan is a pure data structure so the projection logic is testable off
//! the browser; [`dom`] materializes it into actual elements.

#[cfg(target_arch = "wasm32")]
pub mod dom;

use crate::datetime::serial_to_components;
use crate::types::{CellValue, Worksheet};

/// Everything the renderer needs to draw the table.
#[derive(Debug, PartialEq, Eq)]
pub struct GridPlan {
    /// Column header labels, one per column.
    pub header: Vec<String>,
    pub rows: Vec<GridRow>,
}

/// One body row: its 1-based label plus a cell per column.
#[derive(Debug, PartialEq, Eq)]
pub struct GridRow {
    pub label: String,
    pub cells: Vec<GridCell>,
}

/// One editable cell, carrying its model coordinates.
#[derive(Debug, PartialEq, Eq)]
pub struct GridCell {
    pub row: u32,
    pub col: u32,
    pub text: String,
}

/// Effective grid extent of a worksheet as (rows, cols).
///
/// The row count is the declared one; the column count is recomputed by
/// scanning populated cells, because declared dimensions routinely overstate
/// width (trailing formatted-but-empty columns).
#[must_use]
pub fn compute_extent(sheet: &Worksheet) -> (u32, u32) {
    let mut cols = 0;
    for cell in &sheet.cells {
        if cell.value.is_present() && cell.c + 1 > cols {
            cols = cell.c + 1;
        }
    }
    (sheet.max_row, cols)
}

/// Column header label. Single letter, matching how the grid has always
/// labeled columns; callers never ask for more than the computed extent.
#[must_use]
pub fn header_label(col: u32) -> String {
    char::from_u32(u32::from('A') + col)
        .unwrap_or('?')
        .to_string()
}

/// The string shown (and edited) for a cell value.
///
/// This is an ordered fallback, not a type dispatch: formulas show their
/// cached result when one exists and the formula text otherwise, rich text
/// flattens to its concatenated runs, and anything unrecognized is dumped
/// as JSON rather than hidden.
#[must_use]
pub fn display_value(value: &CellValue) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Text { value } => value.clone(),
        CellValue::Hyperlink { text, .. } => text.clone(),
        CellValue::Formula { formula, result } => match result {
            Some(result) => result.clone(),
            None => formula.clone(),
        },
        CellValue::RichText { runs } => runs.iter().map(|r| r.text.as_str()).collect(),
        CellValue::Date { serial } => format_date(*serial),
        CellValue::Other { value } => value.to_string(),
        CellValue::Number { value } => value.to_string(),
        CellValue::Bool { value } => {
            if *value {
                "TRUE".to_string()
            } else {
                "FALSE".to_string()
            }
        }
    }
}

fn format_date(serial: f64) -> String {
    let c = serial_to_components(serial);
    if c.has_time() {
        format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            c.year, c.month, c.day, c.hour, c.minute, c.second
        )
    } else {
        format!("{:04}-{:02}-{:02}", c.year, c.month, c.day)
    }
}

/// Project a worksheet into a full table plan.
#[must_use]
pub fn plan(sheet: &Worksheet) -> GridPlan {
    let (rows, cols) = compute_extent(sheet);

    let header = (0..cols).map(header_label).collect();

    let body = (0..rows)
        .map(|r| GridRow {
            label: (r + 1).to_string(),
            cells: (0..cols)
                .map(|c| GridCell {
                    row: r,
                    col: c,
                    text: display_value(sheet.value_at(r, c)),
                })
                .collect(),
        })
        .collect();

    GridPlan {
        header,
        rows: body,
    }
}
