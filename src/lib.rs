//! xltable - editable XLSX grid for the web
//!
//! Loads an Excel file in the browser via WebAssembly, renders its first
//! worksheet as an editable HTML table, and exports the edited workbook:
//! - Typed cell model (text, numbers, dates, formulas, rich text, hyperlinks)
//! - Edits stored verbatim, no type coercion
//! - Export patches the original ZIP; untouched parts pass through byte-identical
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { XlTable } from 'xltable';
//! await init();
//! const table = new XlTable(fileInput, container, exportButton);
//! ```

pub mod cell_ref;
pub mod error;
pub mod export;
pub mod grid;
pub mod parser;
pub mod session;
pub mod types;

mod datetime;

use wasm_bindgen::prelude::*;

// Re-export the main grid struct
pub use session::XlTable;

pub use types::*;

/// Parse an XLSX file and return a JSON string representing the workbook
///
/// # Errors
/// Returns an error if the XLSX file is invalid or cannot be parsed.
#[wasm_bindgen]
pub fn parse_xlsx(data: &[u8]) -> Result<String, JsValue> {
    let workbook = parser::parse(data).map_err(|e| JsValue::from_str(&e.to_string()))?;

    serde_json::to_string(&workbook)
        .map_err(|e| JsValue::from_str(&format!("JSON serialization error: {e}")))
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
