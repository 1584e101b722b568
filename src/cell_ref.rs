//! Utilities for Excel-style cell references.

/// Parse a cell reference like "A1" into (col, row) where col and row are 0-indexed.
pub fn parse_cell_ref(cell_ref: &str) -> Option<(u32, u32)> {
    parse_cell_ref_bytes(cell_ref.trim().as_bytes())
}

/// Parse a cell reference from raw bytes (ASCII) into (col, row) where col and row are 0-indexed.
///
/// This is the bytes variant of [`parse_cell_ref`] for use when working with
/// raw XML attribute values (e.g., `attr.value` from quick-xml).
pub fn parse_cell_ref_bytes(ref_bytes: &[u8]) -> Option<(u32, u32)> {
    let mut col: u32 = 0;
    let mut row: u32 = 0;
    let mut saw_col = false;
    let mut saw_row = false;

    for &b in ref_bytes {
        if b == b'$' {
            continue;
        }
        if b.is_ascii_alphabetic() {
            let upper = if b.is_ascii_lowercase() { b - 32 } else { b };
            col = col.saturating_mul(26).saturating_add(u32::from(upper - b'A') + 1);
            saw_col = true;
        } else if b.is_ascii_digit() {
            row = row.saturating_mul(10).saturating_add(u32::from(b - b'0'));
            saw_row = true;
        } else {
            return None;
        }
    }

    if !saw_col || !saw_row {
        return None;
    }

    Some((col.saturating_sub(1), row.saturating_sub(1)))
}

/// Parse a cell reference from bytes with defaults.
///
/// Returns `(0, 0)` if parsing fails.
pub fn parse_cell_ref_bytes_or_default(ref_bytes: &[u8]) -> (u32, u32) {
    parse_cell_ref_bytes(ref_bytes).unwrap_or((0, 0))
}

/// Convert a 0-based column index to Excel column letters (A, B, ..., Z, AA, AB, ...)
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn col_to_letter(col: u32) -> String {
    let mut result = String::new();
    let mut n = col + 1; // Convert to 1-based
    while n > 0 {
        n -= 1;
        let c = char::from(b'A' + (n % 26) as u8);
        result.insert(0, c);
        n /= 26;
    }
    result
}

/// Format a 0-based (row, col) pair as an A1-style reference.
#[must_use]
pub fn cell_ref_string(row: u32, col: u32) -> String {
    format!("{}{}", col_to_letter(col), row + 1)
}
