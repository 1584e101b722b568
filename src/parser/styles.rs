//! Minimal stylesheet scan: the number format id of each cellXf.
//!
//! Only used to tell date-formatted numeric cells apart from plain numbers;
//! fonts, fills, and borders are irrelevant to the grid projection.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{BufReader, Read, Seek};
use zip::ZipArchive;

/// numFmtId per cellXf index, in document order.
pub(super) fn parse_num_fmt_ids<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: Option<&str>,
) -> Vec<u32> {
    let styles_path = path.unwrap_or("xl/styles.xml");
    let Ok(file) = archive.by_name(styles_path) else {
        return Vec::new(); // Styles part is optional
    };

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);

    let mut ids = Vec::new();
    let mut buf = Vec::new();
    let mut in_cell_xfs = false;

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e) | Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"cellXfs" => in_cell_xfs = true,
                b"xf" if in_cell_xfs => {
                    let mut num_fmt_id = 0;
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"numFmtId" {
                            num_fmt_id = std::str::from_utf8(&attr.value)
                                .ok()
                                .and_then(|s| s.parse().ok())
                                .unwrap_or(0);
                        }
                    }
                    ids.push(num_fmt_id);
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => {
                if e.local_name().as_ref() == b"cellXfs" {
                    in_cell_xfs = false;
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    ids
}

/// Whether a built-in number format id renders as a date or time.
///
/// Ids 14-22 are the built-in date/datetime formats, 45-47 the elapsed-time
/// ones (ECMA-376 §18.8.30). Custom formats (id >= 164) are not inspected;
/// those cells stay plain numbers.
pub(super) fn is_date_format(num_fmt_id: u32) -> bool {
    matches!(num_fmt_id, 14..=22 | 45..=47)
}
