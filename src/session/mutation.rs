//! Cell edit application.
//!
//! Edits are stored as the literal string the user typed. No type sniffing
//! happens here: typing "31" into a numeric cell turns it into the text
//! "31", and the file round-trips it that way.

use crate::types::{CellValue, Workbook};

/// Write an edited cell's text into the first sheet.
///
/// Returns false when there is no sheet to write to.
pub(crate) fn apply_cell_edit(workbook: &mut Workbook, row: u32, col: u32, value: &str) -> bool {
    let Some(sheet) = workbook.first_sheet_mut() else {
        return false;
    };
    sheet.set_value(row, col, CellValue::text(value));
    true
}
