//! Main XlTable struct - the entry point for the editable grid.
//!
//! Owns the loaded workbook, the original file bytes, and the dirty flag.
//! Event handlers for file selection, cell edits, and export are registered
//! when the instance is created - no manual JavaScript wiring required.

mod events;
mod mutation;

use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use web_sys::{Event, HtmlElement, HtmlInputElement};

use crate::error::{Result, XltableError};
use crate::grid::GridPlan;
use crate::types::Workbook;
use crate::{export, grid, parser};

/// Shared editing session state, accessed by the event handlers.
pub(crate) struct Session {
    pub(crate) workbook: Option<Workbook>,
    /// The file exactly as loaded; the export fast path hands these back.
    pub(crate) original_bytes: Option<Vec<u8>>,
    pub(crate) dirty: bool,
}

impl Session {
    pub(crate) fn new() -> Self {
        Session {
            workbook: None,
            original_bytes: None,
            dirty: false,
        }
    }

    pub(crate) fn is_loaded(&self) -> bool {
        self.workbook.is_some()
    }

    /// Parse a file and make it the current workbook.
    ///
    /// On failure the previous session state is untouched; a file that fails
    /// to parse never half-loads.
    pub(crate) fn load(&mut self, data: &[u8]) -> Result<()> {
        let workbook = parser::parse(data)?;
        self.workbook = Some(workbook);
        self.original_bytes = Some(data.to_vec());
        self.dirty = false;
        Ok(())
    }

    pub(crate) fn grid_plan(&self) -> Option<GridPlan> {
        self.workbook
            .as_ref()
            .and_then(Workbook::first_sheet)
            .map(grid::plan)
    }

    /// Store an edited cell's text, verbatim.
    pub(crate) fn commit_edit(&mut self, row: u32, col: u32, value: &str) -> bool {
        let Some(workbook) = &mut self.workbook else {
            return false;
        };
        if mutation::apply_cell_edit(workbook, row, col, value) {
            self.dirty = true;
            true
        } else {
            false
        }
    }

    pub(crate) fn export(&self) -> Result<Vec<u8>> {
        let (Some(workbook), Some(original)) = (&self.workbook, &self.original_bytes) else {
            return Err(XltableError::Other("no workbook loaded".into()));
        };
        export::export_xlsx(original, workbook, self.dirty)
    }
}

/// The editable grid exported to JavaScript.
#[wasm_bindgen]
pub struct XlTable {
    #[cfg(target_arch = "wasm32")]
    state: Rc<RefCell<Session>>,
    #[cfg(target_arch = "wasm32")]
    #[allow(dead_code)] // Kept alive so the registered handlers stay valid
    closures: Vec<Closure<dyn FnMut(Event)>>,

    #[cfg(not(target_arch = "wasm32"))]
    session: Session,
}

// ============================================================================
// WASM32 Implementation
// ============================================================================

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl XlTable {
    /// Create a new grid bound to a file input, a table container, and an
    /// export button. All event wiring happens here.
    #[wasm_bindgen(constructor)]
    pub fn new(
        file_input: HtmlInputElement,
        container: HtmlElement,
        export_button: HtmlElement,
    ) -> std::result::Result<XlTable, JsValue> {
        console_error_panic_hook::set_once();

        let state = Rc::new(RefCell::new(Session::new()));

        let mut closures: Vec<Closure<dyn FnMut(Event)>> = Vec::new();

        // The export button only becomes visible once a file is loaded
        export_button.set_hidden(true);

        let file_closure = Self::make_file_handler(&state, &file_input, &container, &export_button);
        file_input
            .add_event_listener_with_callback("change", file_closure.as_ref().unchecked_ref())?;
        closures.push(file_closure);

        // One delegated listener on the container handles every cell input
        let edit_closure = Self::make_edit_handler(&state);
        container
            .add_event_listener_with_callback("change", edit_closure.as_ref().unchecked_ref())?;
        closures.push(edit_closure);

        let export_closure = Self::make_export_handler(&state);
        export_button
            .add_event_listener_with_callback("click", export_closure.as_ref().unchecked_ref())?;
        closures.push(export_closure);

        Ok(XlTable { state, closures })
    }

    /// Whether a workbook is currently loaded.
    #[wasm_bindgen(js_name = "isLoaded")]
    pub fn is_loaded(&self) -> bool {
        self.state.borrow().is_loaded()
    }

    /// Export the current workbook as XLSX bytes.
    #[wasm_bindgen(js_name = "exportBytes")]
    pub fn export_bytes(&self) -> std::result::Result<Vec<u8>, JsValue> {
        self.state.borrow().export().map_err(JsValue::from)
    }
}

// ============================================================================
// Non-WASM32 Implementation (testing)
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
impl XlTable {
    /// Create a session with no DOM attached.
    #[must_use]
    pub fn new_test() -> Self {
        XlTable {
            session: Session::new(),
        }
    }

    pub fn load(&mut self, data: &[u8]) -> Result<()> {
        self.session.load(data)
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.session.is_loaded()
    }

    #[must_use]
    pub fn grid_plan(&self) -> Option<GridPlan> {
        self.session.grid_plan()
    }

    pub fn commit_edit(&mut self, row: u32, col: u32, value: &str) -> bool {
        self.session.commit_edit(row, col, value)
    }

    pub fn export_bytes(&self) -> Result<Vec<u8>> {
        self.session.export()
    }

    #[must_use]
    pub fn workbook(&self) -> Option<&Workbook> {
        self.session.workbook.as_ref()
    }
}
