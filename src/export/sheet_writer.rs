//! Generates worksheet XML from a `Worksheet`.
//!
//! Rewritten sheets use inline strings (`t="inlineStr"`) instead of shared
//! string references, avoiding the need to rebuild the shared string table.

use crate::cell_ref::{cell_ref_string, col_to_letter};
use crate::datetime::DATE1904_OFFSET;
use crate::error::Result;
use crate::types::{CellValue, Worksheet};

/// Write a complete worksheet XML string.
///
/// `date1904` is the workbook's date system; serials are stored normalized
/// to the 1900 system in memory and converted back on the way out.
pub(crate) fn write_sheet_xml(sheet: &Worksheet, date1904: bool) -> Result<String> {
    let mut out = String::with_capacity(4096);
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    out.push('\n');
    out.push_str(
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
    );
    out.push_str(
        r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    );
    out.push('\n');

    if sheet.max_row > 0 && sheet.max_col > 0 {
        let end_col = col_to_letter(sheet.max_col.saturating_sub(1));
        out.push_str(&format!(
            "<dimension ref=\"A1:{}{}\"/>\n",
            end_col, sheet.max_row
        ));
    }

    out.push_str("<sheetData>\n");
    write_sheet_data(&mut out, sheet, date1904);
    out.push_str("</sheetData>\n");

    if !sheet.hyperlinks.is_empty() {
        out.push_str("<hyperlinks>\n");
        for link in &sheet.hyperlinks {
            // Relationship ids are preserved verbatim; the sheet's rels part
            // is passed through unchanged, so they still resolve.
            if let Some(ref r_id) = link.r_id {
                out.push_str(&format!(
                    "<hyperlink ref=\"{}\" r:id=\"{}\"/>\n",
                    xml_escape(&link.cell_ref),
                    xml_escape(r_id)
                ));
            } else if let Some(ref location) = link.location {
                out.push_str(&format!(
                    "<hyperlink ref=\"{}\" location=\"{}\"/>\n",
                    xml_escape(&link.cell_ref),
                    xml_escape(location)
                ));
            }
        }
        out.push_str("</hyperlinks>\n");
    }

    out.push_str("</worksheet>");
    Ok(out)
}

/// Write all cell rows into `<sheetData>`.
fn write_sheet_data(out: &mut String, sheet: &Worksheet, date1904: bool) {
    if sheet.cells.is_empty() {
        return;
    }

    // Cells are stored in parse order plus any appended edits; group them
    // by row so each row is emitted exactly once, in order.
    let mut rows: std::collections::BTreeMap<u32, Vec<usize>> = std::collections::BTreeMap::new();
    for (idx, cd) in sheet.cells.iter().enumerate() {
        rows.entry(cd.r).or_default().push(idx);
    }

    for (row, mut cell_indices) in rows {
        cell_indices.sort_by_key(|&i| sheet.cells.get(i).map_or(u32::MAX, |cd| cd.c));
        out.push_str(&format!("<row r=\"{}\">", row + 1));
        for idx in cell_indices {
            if let Some(cd) = sheet.cells.get(idx) {
                write_cell(out, cd.r, cd.c, cd.style_idx, &cd.value, date1904);
            }
        }
        out.push_str("</row>\n");
    }
}

/// Write a single `<c>` element.
fn write_cell(
    out: &mut String,
    row: u32,
    col: u32,
    style_idx: Option<u32>,
    value: &CellValue,
    date1904: bool,
) {
    // Style-only placeholders keep their style but carry no content
    if !value.is_present() {
        if let Some(si) = style_idx {
            out.push_str(&format!(
                "<c r=\"{}\" s=\"{}\"/>",
                cell_ref_string(row, col),
                si
            ));
        }
        return;
    }

    out.push_str(&format!("<c r=\"{}\"", cell_ref_string(row, col)));
    if let Some(si) = style_idx {
        out.push_str(&format!(" s=\"{si}\""));
    }

    match value {
        CellValue::Empty => {} // Handled above
        CellValue::Text { value } => write_inline_string(out, value),
        CellValue::Hyperlink { text, .. } => write_inline_string(out, text),
        CellValue::RichText { runs } => {
            // Run boundaries are flattened; per-run formatting lived in the
            // shared string table this cell no longer references.
            let text: String = runs.iter().map(|r| r.text.as_str()).collect();
            write_inline_string(out, &text);
        }
        CellValue::Number { value } => {
            out.push_str(&format!("><v>{value}</v>"));
        }
        CellValue::Date { serial } => {
            let serial = if date1904 {
                serial - DATE1904_OFFSET
            } else {
                *serial
            };
            out.push_str(&format!("><v>{serial}</v>"));
        }
        CellValue::Bool { value } => {
            let v = i32::from(*value);
            out.push_str(&format!(" t=\"b\"><v>{v}</v>"));
        }
        CellValue::Formula { formula, result } => {
            let numeric = result
                .as_deref()
                .is_some_and(|r| r.parse::<f64>().is_ok());
            if result.is_some() && !numeric {
                out.push_str(" t=\"str\"");
            }
            out.push('>');
            out.push_str(&format!("<f>{}</f>", xml_escape(formula)));
            if let Some(result) = result {
                out.push_str(&format!("<v>{}</v>", xml_escape(result)));
            }
        }
        CellValue::Other { value } => {
            match value.get("error").and_then(serde_json::Value::as_str) {
                Some(err) => {
                    out.push_str(&format!(" t=\"e\"><v>{}</v>", xml_escape(err)));
                }
                None => write_inline_string(out, &value.to_string()),
            }
        }
    }

    out.push_str("</c>");
}

fn write_inline_string(out: &mut String, text: &str) {
    out.push_str(" t=\"inlineStr\"><is><t xml:space=\"preserve\">");
    out.push_str(&xml_escape(text));
    out.push_str("</t></is>");
}

/// Minimal XML escaping for attribute/text content.
fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
