use serde::{Deserialize, Serialize};

/// Cell with position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellData {
    pub r: u32, // row (0-indexed)
    pub c: u32, // col (0-indexed)
    /// Style index into the workbook's cellXfs (preserved for roundtrip save)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_idx: Option<u32>,
    pub value: CellValue,
}

/// The typed content of one worksheet cell.
///
/// This is the whole vocabulary the grid projection understands; anything the
/// parser cannot classify lands in `Other` and is displayed as a JSON dump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CellValue {
    Empty,
    Text {
        value: String,
    },
    Number {
        value: f64,
    },
    Bool {
        value: bool,
    },
    /// Excel serial date, normalized to the 1900 date system at parse time.
    Date {
        serial: f64,
    },
    Formula {
        formula: String,
        /// Cached result as stored in the file, stringified.
        #[serde(skip_serializing_if = "Option::is_none")]
        result: Option<String>,
    },
    RichText {
        runs: Vec<RichTextRun>,
    },
    Hyperlink {
        text: String,
        target: String,
    },
    /// Unrecognized structured value, kept opaque.
    Other {
        value: serde_json::Value,
    },
}

impl CellValue {
    /// Whether the cell counts as populated for extent computation.
    #[must_use]
    pub fn is_present(&self) -> bool {
        !matches!(self, CellValue::Empty)
    }

    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text {
            value: value.into(),
        }
    }
}

/// A single run of text within a rich-text cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextRun {
    pub text: String,
}

/// Hyperlink definition attached to a sheet, keyed by cell reference.
///
/// The relationship id is kept so the link can be re-emitted verbatim when
/// the sheet XML is rewritten on export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HyperlinkDef {
    /// Cell reference (e.g., "A1")
    pub cell_ref: String,
    /// Resolved target URL or internal location
    pub target: String,
    /// Relationship id for external links (e.g., "rId1")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_id: Option<String>,
    /// Internal location (e.g., "Sheet2!A1"), for links with no relationship
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}
