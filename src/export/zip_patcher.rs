//! Patch an XLSX ZIP archive with modified sheet XML.
//!
//! Unmodified entries are copied via `raw_copy_file` (zero recompression
//! cost). Only the edited sheet gets new XML generated and written.

use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::Result;
use crate::types::Workbook;

use super::sheet_writer::write_sheet_xml;

/// Patch the original XLSX bytes, replacing the first sheet's XML part.
///
/// Returns the new XLSX file as `Vec<u8>`.
pub(crate) fn patch_zip(original_data: &[u8], workbook: &Workbook) -> Result<Vec<u8>> {
    let cursor = Cursor::new(original_data);
    let mut archive = ZipArchive::new(cursor)?;

    let Some(sheet) = workbook.first_sheet() else {
        return Ok(original_data.to_vec());
    };

    let buf: Vec<u8> = Vec::with_capacity(original_data.len());
    let mut writer = ZipWriter::new(Cursor::new(buf));

    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i)?;

        if entry.name() == sheet.path {
            let xml = write_sheet_xml(sheet, workbook.date1904)?;
            let options =
                FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
            writer.start_file(&sheet.path, options)?;
            writer.write_all(xml.as_bytes())?;
            continue;
        }

        // Pass through unmodified entry (raw copy, no re-compression)
        writer.raw_copy_file(entry)?;
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}
