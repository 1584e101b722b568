//! Core data model: workbooks, worksheets, and typed cell values.

mod cell;
mod worksheet;

pub use cell::{CellData, CellValue, HyperlinkDef, RichTextRun};
pub use worksheet::{Workbook, Worksheet};
