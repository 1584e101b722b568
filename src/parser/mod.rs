//! XLSX parsing: ZIP container, workbook structure, and per-sheet XML.
//!
//! The workbook file is a ZIP of XML parts. Parsing walks the relationship
//! graph rather than hard-coding part names, so files produced by writers
//! with unconventional layouts still load.

mod relationships;
mod shared_strings;
mod styles;
mod worksheet;

use std::io::Cursor;

use zip::ZipArchive;

use crate::cell_ref::parse_cell_ref;
use crate::error::Result;
use crate::types::{CellValue, HyperlinkDef, Workbook, Worksheet};

use worksheet::RawHyperlink;

/// Parse a complete XLSX file from memory.
pub fn parse(data: &[u8]) -> Result<Workbook> {
    let cursor = Cursor::new(data);
    let mut archive = ZipArchive::new(cursor)?;

    let rels = relationships::parse_workbook_relationships(&mut archive);
    let (sheet_infos, date1904) = relationships::get_sheet_info(&mut archive, &rels.worksheets)?;

    let shared = shared_strings::parse_shared_strings(&mut archive, rels.shared_strings.as_deref());
    let num_fmt_ids = styles::parse_num_fmt_ids(&mut archive, rels.styles.as_deref());

    let mut sheets = Vec::with_capacity(sheet_infos.len());
    for info in &sheet_infos {
        let (mut sheet, raw_links) = worksheet::parse_sheet(
            &mut archive,
            &info.name,
            &info.path,
            &shared,
            &num_fmt_ids,
            date1904,
        )?;
        resolve_hyperlinks(&mut archive, &mut sheet, raw_links);
        sheets.push(sheet);
    }

    Ok(Workbook { sheets, date1904 })
}

/// Attach hyperlinks to their cells.
///
/// External links resolve their target through the sheet's rels file;
/// internal ones use the `location` attribute directly. The linked cell's
/// value becomes `Hyperlink`, keeping whatever text it already displayed.
fn resolve_hyperlinks<R: std::io::Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    sheet: &mut Worksheet,
    raw_links: Vec<RawHyperlink>,
) {
    if raw_links.is_empty() {
        return;
    }

    let rels = relationships::parse_sheet_rels(archive, &sheet.path);

    for link in raw_links {
        let target = match &link.r_id {
            Some(r_id) => match rels.get(r_id) {
                Some(target) => target.clone(),
                None => continue, // Dangling relationship id
            },
            None => match &link.location {
                Some(location) => format!("#{location}"),
                None => continue,
            },
        };

        let Some((col, row)) = parse_cell_ref(&link.cell_ref) else {
            continue;
        };

        let text = link
            .display
            .clone()
            .or_else(|| hyperlink_text(sheet.value_at(row, col)))
            .unwrap_or_else(|| target.clone());

        sheet.set_value(row, col, CellValue::Hyperlink { text, target: target.clone() });

        sheet.hyperlinks.push(HyperlinkDef {
            cell_ref: link.cell_ref,
            target,
            r_id: link.r_id,
            location: link.location,
        });
    }
}

/// Display text already present in a cell that is becoming a hyperlink.
fn hyperlink_text(value: &CellValue) -> Option<String> {
    match value {
        CellValue::Text { value } => Some(value.clone()),
        CellValue::RichText { runs } => {
            Some(runs.iter().map(|r| r.text.as_str()).collect::<String>())
        }
        CellValue::Number { value } => Some(value.to_string()),
        _ => None,
    }
}
