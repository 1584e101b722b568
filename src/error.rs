//! Structured error types for xltable.

/// All errors that can occur while loading, projecting, or exporting a workbook.
#[derive(Debug, thiserror::Error)]
pub enum XltableError {
    /// XML parsing error from quick-xml.
    #[error("XML parsing: {0}")]
    Xml(#[from] quick_xml::Error),

    /// ZIP archive error.
    #[error("ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// General parse error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, XltableError>;

impl From<String> for XltableError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for XltableError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<XltableError> for wasm_bindgen::JsValue {
    fn from(e: XltableError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
