//! XLSX export pipeline.
//!
//! Produces a modified XLSX by patching the original ZIP archive. Only the
//! edited sheet is re-serialized; every other entry is passed through
//! byte-identical.

pub(crate) mod sheet_writer;
pub(crate) mod zip_patcher;

use crate::error::Result;
use crate::types::Workbook;

/// Serialize the workbook back to XLSX bytes.
///
/// `original_bytes` is the file as loaded; when no edit has been made the
/// export is exactly those bytes, with no ZIP rewrite at all.
pub fn export_xlsx(original_bytes: &[u8], workbook: &Workbook, dirty: bool) -> Result<Vec<u8>> {
    if !dirty {
        return Ok(original_bytes.to_vec());
    }
    zip_patcher::patch_zip(original_bytes, workbook)
}
