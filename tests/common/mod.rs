//! In-memory XLSX fixtures for the integration tests.
//!
//! Builds real ZIP archives with the minimal set of parts the parser walks,
//! so every test runs without touching the filesystem.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    dead_code
)]

use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

/// One `<c>` element in a fixture sheet.
#[derive(Clone, Debug)]
pub struct FixtureCell {
    pub cell_ref: String,
    pub value: String,
    pub cell_type: Option<String>,
    pub style_index: Option<u32>,
    pub formula: Option<String>,
}

impl FixtureCell {
    pub fn number(cell_ref: &str, value: f64) -> Self {
        Self {
            cell_ref: cell_ref.to_string(),
            value: value.to_string(),
            cell_type: None,
            style_index: None,
            formula: None,
        }
    }

    pub fn shared_string(cell_ref: &str, sst_index: u32) -> Self {
        Self {
            cell_ref: cell_ref.to_string(),
            value: sst_index.to_string(),
            cell_type: Some("s".to_string()),
            style_index: None,
            formula: None,
        }
    }

    pub fn inline_string(cell_ref: &str, value: &str) -> Self {
        Self {
            cell_ref: cell_ref.to_string(),
            value: value.to_string(),
            cell_type: Some("inlineStr".to_string()),
            style_index: None,
            formula: None,
        }
    }

    pub fn boolean(cell_ref: &str, value: bool) -> Self {
        Self {
            cell_ref: cell_ref.to_string(),
            value: if value { "1" } else { "0" }.to_string(),
            cell_type: Some("b".to_string()),
            style_index: None,
            formula: None,
        }
    }

    pub fn error(cell_ref: &str, code: &str) -> Self {
        Self {
            cell_ref: cell_ref.to_string(),
            value: code.to_string(),
            cell_type: Some("e".to_string()),
            style_index: None,
            formula: None,
        }
    }

    /// Formula cell; `cached` is the stored `<v>` result, if any.
    pub fn formula(cell_ref: &str, formula: &str, cached: Option<&str>) -> Self {
        Self {
            cell_ref: cell_ref.to_string(),
            value: cached.unwrap_or("").to_string(),
            cell_type: cached.and_then(|c| {
                // Non-numeric cached results are stored as t="str"
                c.parse::<f64>().is_err().then(|| "str".to_string())
            }),
            style_index: None,
            formula: Some(formula.to_string()),
        }
    }

    pub fn with_style(mut self, style_index: u32) -> Self {
        self.style_index = Some(style_index);
        self
    }
}

/// A shared string entry: plain or broken into rich runs.
#[derive(Clone, Debug)]
pub enum SharedEntry {
    Plain(String),
    Rich(Vec<String>),
}

/// Builder for one worksheet part.
#[derive(Clone, Debug, Default)]
pub struct SheetFixture {
    pub name: String,
    cells: Vec<FixtureCell>,
    dimension: Option<String>,
    /// (cell_ref, rId) external hyperlinks; targets come from `rels`
    hyperlinks: Vec<(String, String)>,
    /// (rId, target) entries for this sheet's rels part
    rels: Vec<(String, String)>,
}

impl SheetFixture {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn cell(mut self, cell: FixtureCell) -> Self {
        self.cells.push(cell);
        self
    }

    pub fn text(self, cell_ref: &str, value: &str) -> Self {
        self.cell(FixtureCell::inline_string(cell_ref, value))
    }

    pub fn number(self, cell_ref: &str, value: f64) -> Self {
        self.cell(FixtureCell::number(cell_ref, value))
    }

    pub fn dimension(mut self, dimension: &str) -> Self {
        self.dimension = Some(dimension.to_string());
        self
    }

    pub fn hyperlink(mut self, cell_ref: &str, r_id: &str, target: &str) -> Self {
        self.hyperlinks.push((cell_ref.to_string(), r_id.to_string()));
        self.rels.push((r_id.to_string(), target.to_string()));
        self
    }

    fn build_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        );

        if let Some(ref dim) = self.dimension {
            xml.push_str(&format!(r#"<dimension ref="{dim}"/>"#));
        }

        xml.push_str("<sheetData>");

        let mut rows: std::collections::BTreeMap<u32, Vec<&FixtureCell>> =
            std::collections::BTreeMap::new();
        for cell in &self.cells {
            rows.entry(parse_row_from_ref(&cell.cell_ref))
                .or_default()
                .push(cell);
        }

        for (row_num, cells) in rows {
            xml.push_str(&format!(r#"<row r="{row_num}">"#));
            for cell in cells {
                xml.push_str(&format!(r#"<c r="{}""#, cell.cell_ref));
                if let Some(ref t) = cell.cell_type {
                    xml.push_str(&format!(r#" t="{t}""#));
                }
                if let Some(s) = cell.style_index {
                    xml.push_str(&format!(r#" s="{s}""#));
                }
                xml.push('>');

                if let Some(ref formula) = cell.formula {
                    xml.push_str(&format!("<f>{}</f>", escape_xml(formula)));
                }

                if cell.cell_type.as_deref() == Some("inlineStr") {
                    xml.push_str(&format!("<is><t>{}</t></is>", escape_xml(&cell.value)));
                } else if !cell.value.is_empty() {
                    xml.push_str(&format!("<v>{}</v>", escape_xml(&cell.value)));
                }

                xml.push_str("</c>");
            }
            xml.push_str("</row>");
        }

        xml.push_str("</sheetData>");

        if !self.hyperlinks.is_empty() {
            xml.push_str("<hyperlinks>");
            for (cell_ref, r_id) in &self.hyperlinks {
                xml.push_str(&format!(r#"<hyperlink ref="{cell_ref}" r:id="{r_id}"/>"#));
            }
            xml.push_str("</hyperlinks>");
        }

        xml.push_str("</worksheet>");
        xml
    }

    fn build_rels(&self) -> Option<String> {
        if self.rels.is_empty() {
            return None;
        }
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for (id, target) in &self.rels {
            xml.push_str(&format!(
                r#"<Relationship Id="{id}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="{}" TargetMode="External"/>"#,
                escape_xml(target)
            ));
        }
        xml.push_str("</Relationships>");
        Some(xml)
    }
}

/// XLSX fixture builder.
#[derive(Clone, Debug, Default)]
pub struct WorkbookFixture {
    sheets: Vec<SheetFixture>,
    shared_strings: Vec<SharedEntry>,
    /// Adds a styles part with cellXfs: index 0 general, index 1 the date
    /// format (numFmtId 14)
    with_date_style: bool,
    date1904: bool,
}

impl WorkbookFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet(mut self, sheet: SheetFixture) -> Self {
        self.sheets.push(sheet);
        self
    }

    pub fn shared_string(mut self, s: &str) -> Self {
        self.shared_strings.push(SharedEntry::Plain(s.to_string()));
        self
    }

    pub fn rich_string(mut self, runs: &[&str]) -> Self {
        self.shared_strings.push(SharedEntry::Rich(
            runs.iter().map(ToString::to_string).collect(),
        ));
        self
    }

    pub fn date_style(mut self) -> Self {
        self.with_date_style = true;
        self
    }

    pub fn date1904(mut self) -> Self {
        self.date1904 = true;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut buffer);
            let options =
                FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

            zip.start_file("[Content_Types].xml", options).unwrap();
            zip.write_all(self.build_content_types().as_bytes()).unwrap();

            zip.start_file("_rels/.rels", options).unwrap();
            zip.write_all(ROOT_RELS_XML.as_bytes()).unwrap();

            zip.start_file("xl/workbook.xml", options).unwrap();
            zip.write_all(self.build_workbook().as_bytes()).unwrap();

            zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
            zip.write_all(self.build_workbook_rels().as_bytes()).unwrap();

            for (i, sheet) in self.sheets.iter().enumerate() {
                let path = format!("xl/worksheets/sheet{}.xml", i + 1);
                zip.start_file(&path, options).unwrap();
                zip.write_all(sheet.build_xml().as_bytes()).unwrap();

                if let Some(rels) = sheet.build_rels() {
                    let rels_path = format!("xl/worksheets/_rels/sheet{}.xml.rels", i + 1);
                    zip.start_file(&rels_path, options).unwrap();
                    zip.write_all(rels.as_bytes()).unwrap();
                }
            }

            if !self.shared_strings.is_empty() {
                zip.start_file("xl/sharedStrings.xml", options).unwrap();
                zip.write_all(self.build_shared_strings().as_bytes()).unwrap();
            }

            if self.with_date_style {
                zip.start_file("xl/styles.xml", options).unwrap();
                zip.write_all(STYLES_WITH_DATE_XML.as_bytes()).unwrap();
            }

            zip.finish().unwrap();
        }
        buffer.into_inner()
    }

    fn build_content_types(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
        );
        for i in 1..=self.sheets.len() {
            xml.push_str(&format!(
                "\n  <Override PartName=\"/xl/worksheets/sheet{i}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>"
            ));
        }
        if !self.shared_strings.is_empty() {
            xml.push_str("\n  <Override PartName=\"/xl/sharedStrings.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml\"/>");
        }
        if self.with_date_style {
            xml.push_str("\n  <Override PartName=\"/xl/styles.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml\"/>");
        }
        xml.push_str("\n</Types>");
        xml
    }

    fn build_workbook(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        );
        if self.date1904 {
            xml.push_str(r#"<workbookPr date1904="1"/>"#);
        }
        xml.push_str("<sheets>");
        for (i, sheet) in self.sheets.iter().enumerate() {
            xml.push_str(&format!(
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape_xml(&sheet.name),
                i + 1,
                i + 1
            ));
        }
        xml.push_str("</sheets></workbook>");
        xml
    }

    fn build_workbook_rels(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for i in 1..=self.sheets.len() {
            xml.push_str(&format!(
                r#"<Relationship Id="rId{i}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{i}.xml"/>"#
            ));
        }
        let mut next_id = self.sheets.len() + 1;
        if !self.shared_strings.is_empty() {
            xml.push_str(&format!(
                r#"<Relationship Id="rId{next_id}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>"#
            ));
            next_id += 1;
        }
        if self.with_date_style {
            xml.push_str(&format!(
                r#"<Relationship Id="rId{next_id}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#
            ));
        }
        xml.push_str("</Relationships>");
        xml
    }

    fn build_shared_strings(&self) -> String {
        let mut xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">"#,
            self.shared_strings.len()
        );
        for entry in &self.shared_strings {
            match entry {
                SharedEntry::Plain(s) => {
                    xml.push_str(&format!("<si><t>{}</t></si>", escape_xml(s)));
                }
                SharedEntry::Rich(runs) => {
                    xml.push_str("<si>");
                    for run in runs {
                        xml.push_str(&format!("<r><t>{}</t></r>", escape_xml(run)));
                    }
                    xml.push_str("</si>");
                }
            }
        }
        xml.push_str("</sst>");
        xml
    }
}

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

/// cellXfs index 0 is the general format, index 1 the built-in date
/// format (numFmtId 14).
const STYLES_WITH_DATE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>
  <fills count="2">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
  </fills>
  <borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
  <cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
  <cellXfs count="2">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
    <xf numFmtId="14" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>
  </cellXfs>
</styleSheet>"#;

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn parse_row_from_ref(cell_ref: &str) -> u32 {
    let row_str: String = cell_ref.chars().filter(char::is_ascii_digit).collect();
    row_str.parse().unwrap_or(1)
}

/// The `Name`/`Age` two-row workbook most suites start from.
pub fn people_xlsx() -> Vec<u8> {
    WorkbookFixture::new()
        .shared_string("Name")
        .shared_string("Age")
        .shared_string("Ada")
        .sheet(
            SheetFixture::new("People")
                .cell(FixtureCell::shared_string("A1", 0))
                .cell(FixtureCell::shared_string("B1", 1))
                .cell(FixtureCell::shared_string("A2", 2))
                .cell(FixtureCell::number("B2", 30.0)),
        )
        .build()
}
