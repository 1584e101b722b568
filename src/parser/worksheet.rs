//! Worksheet parsing - one pass over a sheet's XML into a `Worksheet`.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{BufReader, Read, Seek};
use zip::ZipArchive;

use crate::cell_ref::{parse_cell_ref, parse_cell_ref_bytes_or_default};
use crate::datetime::{components_to_serial, DateComponents, DATE1904_OFFSET};
use crate::error::Result;
use crate::types::{CellData, CellValue, Worksheet};

use super::shared_strings::SharedItem;
use super::styles::is_date_format;

/// Cell type tag from the `t` attribute of a `<c>` element.
#[derive(Copy, Clone)]
enum CellTypeTag {
    Shared,
    Inline,
    Str,
    Bool,
    Error,
    Date,
    Default,
}

fn parse_cell_type_tag(value: &[u8]) -> CellTypeTag {
    match value {
        b"s" => CellTypeTag::Shared,
        b"b" => CellTypeTag::Bool,
        b"e" => CellTypeTag::Error,
        b"d" => CellTypeTag::Date,
        b"str" => CellTypeTag::Str,
        b"inlineStr" => CellTypeTag::Inline,
        _ => CellTypeTag::Default,
    }
}

fn parse_u32_bytes(value: &[u8]) -> Option<u32> {
    let mut num: u32 = 0;
    let mut seen = false;
    for &b in value {
        if !b.is_ascii_digit() {
            return None;
        }
        seen = true;
        num = num.saturating_mul(10).saturating_add(u32::from(b - b'0'));
    }
    seen.then_some(num)
}

/// Hyperlink element as found in the sheet XML, before rel resolution.
pub(super) struct RawHyperlink {
    pub cell_ref: String,
    pub r_id: Option<String>,
    pub location: Option<String>,
    pub display: Option<String>,
}

/// Parse a single worksheet part.
///
/// Returns the sheet plus the raw hyperlinks found in it; the caller resolves
/// those against the sheet's relationship file.
pub(super) fn parse_sheet<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
    path: &str,
    shared: &[SharedItem],
    num_fmt_ids: &[u32],
    date1904: bool,
) -> Result<(Worksheet, Vec<RawHyperlink>)> {
    let file = archive.by_name(path)?;

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(false);

    let mut sheet = Worksheet {
        name: name.to_string(),
        path: path.to_string(),
        ..Worksheet::default()
    };
    let mut hyperlinks = Vec::new();

    let mut buf = Vec::new();
    let mut cell_buf = Vec::new();
    let mut text_buf = Vec::new();

    loop {
        buf.clear();
        let event = match xml.read_event_into(&mut buf) {
            Ok(event) => event,
            Err(_) => break,
        };
        let is_start_event = matches!(event, Event::Start(_));

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                match e.local_name().as_ref() {
                    b"dimension" => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"ref" {
                                if let Ok(ref_str) = std::str::from_utf8(&attr.value) {
                                    apply_dimension(&mut sheet, ref_str);
                                }
                            }
                        }
                    }

                    b"row" => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"r" {
                                let row = parse_u32_bytes(&attr.value).unwrap_or(0);
                                if row > sheet.max_row {
                                    sheet.max_row = row;
                                }
                            }
                        }
                    }

                    b"c" => {
                        let mut col: u32 = 0;
                        let mut row: u32 = 0;
                        let mut tag = CellTypeTag::Default;
                        let mut style_idx: Option<u32> = None;

                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"r" => {
                                    let (c, r) = parse_cell_ref_bytes_or_default(&attr.value);
                                    col = c;
                                    row = r;
                                }
                                b"t" => {
                                    tag = parse_cell_type_tag(&attr.value);
                                }
                                b"s" => {
                                    style_idx = parse_u32_bytes(&attr.value);
                                }
                                _ => {}
                            }
                        }

                        // Read <v>, <f>, and <is><t> children. Self-closing
                        // cells like <c r="A1" s="3"/> have none.
                        let mut value: Option<String> = None;
                        let mut formula: Option<String> = None;
                        let mut inline: Option<String> = None;
                        if is_start_event {
                            read_cell_children(
                                &mut xml,
                                &mut cell_buf,
                                &mut text_buf,
                                &mut value,
                                &mut formula,
                                &mut inline,
                            );
                        }

                        let cell_value = classify_cell(
                            tag,
                            value.as_deref(),
                            formula,
                            inline,
                            shared,
                            style_idx,
                            num_fmt_ids,
                            date1904,
                        );

                        if row + 1 > sheet.max_row {
                            sheet.max_row = row + 1;
                        }
                        if col + 1 > sheet.max_col {
                            sheet.max_col = col + 1;
                        }

                        sheet.cells.push(CellData {
                            r: row,
                            c: col,
                            style_idx,
                            value: cell_value,
                        });
                    }

                    b"hyperlink" => {
                        if let Some(link) = parse_hyperlink_element(e) {
                            hyperlinks.push(link);
                        }
                    }

                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    sheet.rebuild_cell_index();
    Ok((sheet, hyperlinks))
}

fn apply_dimension(sheet: &mut Worksheet, ref_str: &str) {
    let end_part = ref_str.split_once(':').map_or(ref_str, |(_, end)| end);
    if let Some((end_col, end_row)) = parse_cell_ref(end_part) {
        let dim_max_row = end_row.saturating_add(1);
        let dim_max_col = end_col.saturating_add(1);
        if dim_max_row > sheet.max_row {
            sheet.max_row = dim_max_row;
        }
        if dim_max_col > sheet.max_col {
            sheet.max_col = dim_max_col;
        }
    }
}

/// Read the children of a non-empty `<c>` element up to its closing tag.
fn read_cell_children<R: std::io::BufRead>(
    xml: &mut Reader<R>,
    cell_buf: &mut Vec<u8>,
    text_buf: &mut Vec<u8>,
    value: &mut Option<String>,
    formula: &mut Option<String>,
    inline: &mut Option<String>,
) {
    loop {
        cell_buf.clear();
        match xml.read_event_into(cell_buf) {
            Ok(Event::Start(ref inner)) => {
                let inner_name = inner.local_name();
                match inner_name.as_ref() {
                    b"v" => *value = read_text_until(xml, text_buf, b"v"),
                    b"f" => *formula = read_text_until(xml, text_buf, b"f"),
                    b"is" => *inline = read_inline_string(xml, text_buf),
                    _ => {}
                }
            }
            Ok(Event::End(ref inner)) => {
                if inner.local_name().as_ref() == b"c" {
                    break;
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }
}

/// Accumulate text content until the named closing tag.
fn read_text_until<R: std::io::BufRead>(
    xml: &mut Reader<R>,
    buf: &mut Vec<u8>,
    end_tag: &[u8],
) -> Option<String> {
    let mut out: Option<String> = None;
    loop {
        buf.clear();
        match xml.read_event_into(buf) {
            Ok(Event::Text(ref text)) => {
                if let Ok(s) = text.unescape() {
                    out.get_or_insert_with(String::new).push_str(&s);
                }
            }
            Ok(Event::End(ref e)) if e.local_name().as_ref() == end_tag => break,
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }
    out
}

/// Read an `<is>` inline string container: concatenates every nested `<t>`.
fn read_inline_string<R: std::io::BufRead>(
    xml: &mut Reader<R>,
    buf: &mut Vec<u8>,
) -> Option<String> {
    let mut out: Option<String> = None;
    let mut in_t = false;
    loop {
        buf.clear();
        match xml.read_event_into(buf) {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"t" => in_t = true,
            Ok(Event::Text(ref text)) if in_t => {
                if let Ok(s) = text.unescape() {
                    out.get_or_insert_with(String::new).push_str(&s);
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_t = false,
                b"is" => break,
                _ => {}
            },
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }
    out
}

/// Build a `CellValue` from the raw pieces of a `<c>` element.
///
/// A cached `<v>` next to an `<f>` becomes the formula's stringified result;
/// numeric cells whose style carries a built-in date format become dates.
#[allow(clippy::too_many_arguments)]
fn classify_cell(
    tag: CellTypeTag,
    value: Option<&str>,
    formula: Option<String>,
    inline: Option<String>,
    shared: &[SharedItem],
    style_idx: Option<u32>,
    num_fmt_ids: &[u32],
    date1904: bool,
) -> CellValue {
    if let Some(formula) = formula {
        let result = match tag {
            CellTypeTag::Bool => value.map(|v| bool_text(v).to_string()),
            _ => value.map(ToString::to_string).or(inline),
        };
        return CellValue::Formula { formula, result };
    }

    match tag {
        CellTypeTag::Shared => {
            let idx: usize = value.and_then(|v| v.parse().ok()).unwrap_or(0);
            match shared.get(idx) {
                Some(SharedItem::Plain(s)) => CellValue::text(s.clone()),
                Some(SharedItem::Rich(runs)) => CellValue::RichText { runs: runs.clone() },
                None => CellValue::Empty,
            }
        }
        CellTypeTag::Inline => inline.map_or(CellValue::Empty, CellValue::text),
        CellTypeTag::Str => value.map_or(CellValue::Empty, CellValue::text),
        CellTypeTag::Bool => match value {
            Some(v) => CellValue::Bool {
                value: v == "1" || v.eq_ignore_ascii_case("true"),
            },
            None => CellValue::Empty,
        },
        CellTypeTag::Error => match value {
            Some(v) => CellValue::Other {
                value: serde_json::json!({ "error": v }),
            },
            None => CellValue::Empty,
        },
        CellTypeTag::Date => match value {
            Some(v) => parse_iso_date(v)
                .map(|serial| CellValue::Date { serial })
                .unwrap_or_else(|| CellValue::text(v)),
            None => CellValue::Empty,
        },
        CellTypeTag::Default => {
            let Some(v) = value else {
                return CellValue::Empty;
            };
            let Ok(num) = v.parse::<f64>() else {
                return CellValue::text(v);
            };

            let num_fmt_id = style_idx
                .and_then(|idx| num_fmt_ids.get(idx as usize))
                .copied()
                .unwrap_or(0);
            if is_date_format(num_fmt_id) {
                let serial = if date1904 { num + DATE1904_OFFSET } else { num };
                CellValue::Date { serial }
            } else {
                CellValue::Number { value: num }
            }
        }
    }
}

fn bool_text(v: &str) -> &'static str {
    if v == "1" || v.eq_ignore_ascii_case("true") {
        "TRUE"
    } else {
        "FALSE"
    }
}

/// Parse an ISO-8601 date or datetime (the `t="d"` cell payload) into an
/// Excel serial. Returns `None` for anything that doesn't look like one.
fn parse_iso_date(s: &str) -> Option<f64> {
    let s = s.trim().trim_end_matches('Z');
    let (date_part, time_part) = match s.split_once('T') {
        Some((d, t)) => (d, Some(t)),
        None => (s, None),
    };

    let mut date_fields = date_part.split('-');
    let year: i32 = date_fields.next()?.parse().ok()?;
    let month: u32 = date_fields.next()?.parse().ok()?;
    let day: u32 = date_fields.next()?.parse().ok()?;
    if date_fields.next().is_some() || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }

    let (hour, minute, second) = match time_part {
        Some(t) => {
            let mut time_fields = t.split(':');
            let h: u32 = time_fields.next()?.parse().ok()?;
            let m: u32 = time_fields.next()?.parse().ok()?;
            let sec: u32 = match time_fields.next() {
                // Fractional seconds are truncated
                Some(sec) => sec.split('.').next()?.parse().ok()?,
                None => 0,
            };
            (h, m, sec)
        }
        None => (0, 0, 0),
    };

    Some(components_to_serial(DateComponents {
        year,
        month,
        day,
        hour,
        minute,
        second,
    }))
}

fn parse_hyperlink_element(e: &quick_xml::events::BytesStart<'_>) -> Option<RawHyperlink> {
    let mut cell_ref = String::new();
    let mut r_id: Option<String> = None;
    let mut location: Option<String> = None;
    let mut display: Option<String> = None;

    for attr in e.attributes().flatten() {
        let key = attr.key.as_ref();
        let value = std::str::from_utf8(&attr.value).unwrap_or("");

        match key {
            b"ref" => cell_ref = value.to_string(),
            // r:id attribute (namespace prefixed) - external hyperlinks
            key if key.ends_with(b":id") || key == b"id" => {
                if !value.is_empty() {
                    r_id = Some(value.to_string());
                }
            }
            b"location" => {
                if !value.is_empty() {
                    location = Some(value.to_string());
                }
            }
            b"display" => {
                if !value.is_empty() {
                    display = Some(value.to_string());
                }
            }
            _ => {}
        }
    }

    if cell_ref.is_empty() {
        return None;
    }

    Some(RawHyperlink {
        cell_ref,
        r_id,
        location,
        display,
    })
}
