use serde::{Deserialize, Serialize};

use super::{CellData, CellValue, HyperlinkDef};

/// A complete workbook: every sheet is parsed, but only the first one is
/// projected into the grid. The others ride along untouched through export.
#[derive(Debug, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Worksheet>,
    /// Whether the workbook uses the 1904 date system (Mac default).
    pub date1904: bool,
}

impl Workbook {
    /// The worksheet the grid renders.
    #[must_use]
    pub fn first_sheet(&self) -> Option<&Worksheet> {
        self.sheets.first()
    }

    pub fn first_sheet_mut(&mut self) -> Option<&mut Worksheet> {
        self.sheets.first_mut()
    }
}

/// A single worksheet: sparse cell storage plus a per-row index for lookup.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Worksheet {
    pub name: String,
    /// ZIP path of this sheet's XML part (e.g., "xl/worksheets/sheet1.xml")
    pub path: String,
    /// Sparse representation: one entry per populated cell
    pub cells: Vec<CellData>,
    /// Row index for fast cell lookup (not serialized).
    #[serde(skip)]
    pub(crate) cells_by_row: Vec<Vec<usize>>,
    /// Declared row count: max of the dimension ref and every row record seen.
    pub max_row: u32,
    /// Declared column bound. The grid does NOT trust this; see
    /// [`crate::grid::compute_extent`].
    pub max_col: u32,
    /// Hyperlinks defined in this sheet, preserved for export
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub hyperlinks: Vec<HyperlinkDef>,
}

impl Worksheet {
    /// The value at (row, col), or `Empty` for absent cells.
    #[must_use]
    pub fn value_at(&self, row: u32, col: u32) -> &CellValue {
        match self.cell_index_at(row, col) {
            Some(idx) => self
                .cells
                .get(idx)
                .map_or(&CellValue::Empty, |cd| &cd.value),
            None => &CellValue::Empty,
        }
    }

    /// Write `value` at (row, col), overwriting any existing cell.
    ///
    /// Inserting past the declared bounds grows them, so a re-render after
    /// an out-of-range write stays consistent.
    pub fn set_value(&mut self, row: u32, col: u32, value: CellValue) {
        if let Some(idx) = self.cell_index_at(row, col) {
            if let Some(cd) = self.cells.get_mut(idx) {
                cd.value = value;
            }
            return;
        }

        self.cells.push(CellData {
            r: row,
            c: col,
            style_idx: None,
            value,
        });

        if row + 1 > self.max_row {
            self.max_row = row + 1;
        }
        if col + 1 > self.max_col {
            self.max_col = col + 1;
        }

        self.rebuild_cell_index();
    }

    pub(crate) fn rebuild_cell_index(&mut self) {
        if self.cells.is_empty() {
            self.cells_by_row = Vec::new();
            return;
        }

        let max_row = self.cells.iter().map(|c| c.r).max().unwrap_or(0) as usize;
        let mut rows: Vec<Vec<usize>> = vec![Vec::new(); max_row + 1];

        for (idx, cell) in self.cells.iter().enumerate() {
            if let Some(row_cells) = rows.get_mut(cell.r as usize) {
                row_cells.push(idx);
            }
        }

        for row_cells in &mut rows {
            row_cells.sort_by_key(|&i| self.cells.get(i).map(|cell| cell.c).unwrap_or(u32::MAX));
        }

        self.cells_by_row = rows;
    }

    pub(crate) fn cell_index_at(&self, row: u32, col: u32) -> Option<usize> {
        if self.cells_by_row.is_empty() {
            return self.cells.iter().position(|c| c.r == row && c.c == col);
        }
        let row_cells = self.cells_by_row.get(row as usize)?;
        let pos = row_cells
            .partition_point(|&i| self.cells.get(i).map(|cell| cell.c < col).unwrap_or(false));
        let idx = row_cells.get(pos).copied()?;
        self.cells
            .get(idx)
            .is_some_and(|cell| cell.c == col)
            .then_some(idx)
    }
}
