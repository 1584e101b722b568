//! Shared string table parsing, including rich-text `<r>` runs.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{BufReader, Read, Seek};
use zip::ZipArchive;

use crate::types::RichTextRun;

/// One `<si>` entry - either plain text or a sequence of rich-text runs.
#[derive(Debug, Clone)]
pub(super) enum SharedItem {
    Plain(String),
    Rich(Vec<RichTextRun>),
}

/// Parse shared strings from the shared strings part, if present.
pub(super) fn parse_shared_strings<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: Option<&str>,
) -> Vec<SharedItem> {
    let sst_path = path.unwrap_or("xl/sharedStrings.xml");
    let Ok(file) = archive.by_name(sst_path) else {
        return Vec::new(); // SharedStrings is optional
    };

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(false);

    let mut items = Vec::new();
    let mut buf = Vec::new();

    let mut plain = String::new();
    let mut runs: Vec<RichTextRun> = Vec::new();
    let mut run_text = String::new();
    let mut in_si = false;
    let mut in_run = false;
    let mut in_t = false;

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"si" => {
                    in_si = true;
                    plain.clear();
                    runs.clear();
                }
                b"r" if in_si => {
                    in_run = true;
                    run_text.clear();
                }
                b"t" if in_si => {
                    in_t = true;
                }
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_t => {
                if let Ok(text) = e.unescape() {
                    if in_run {
                        run_text.push_str(&text);
                    } else {
                        plain.push_str(&text);
                    }
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_t = false,
                b"r" if in_si => {
                    runs.push(RichTextRun {
                        text: std::mem::take(&mut run_text),
                    });
                    in_run = false;
                }
                b"si" => {
                    if runs.is_empty() {
                        items.push(SharedItem::Plain(plain.clone()));
                    } else {
                        items.push(SharedItem::Rich(std::mem::take(&mut runs)));
                    }
                    in_si = false;
                }
                _ => {}
            },
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    items
}
