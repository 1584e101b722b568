//! Browser event handlers for `XlTable`.
//!
//! All handlers close over the shared `Session` behind `Rc<RefCell>`. The
//! file handler is async (reading a `File` is); edits and export are
//! synchronous.

#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
use js_sys::Uint8Array;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen_futures::JsFuture;
#[cfg(target_arch = "wasm32")]
use web_sys::{
    Blob, BlobPropertyBag, Document, Event, HtmlAnchorElement, HtmlElement, HtmlInputElement, Url,
};

#[cfg(target_arch = "wasm32")]
use super::{Session, XlTable};
#[cfg(target_arch = "wasm32")]
use crate::grid::dom;

#[cfg(target_arch = "wasm32")]
const EXPORT_FILENAME: &str = "edited.xlsx";
#[cfg(target_arch = "wasm32")]
const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[cfg(target_arch = "wasm32")]
impl XlTable {
    /// Handler for the file input's `change` event.
    ///
    /// Reads the selected file, parses it, and renders the grid. A parse
    /// failure renders a visible message and leaves the session as it was.
    pub(crate) fn make_file_handler(
        state: &Rc<RefCell<Session>>,
        file_input: &HtmlInputElement,
        container: &HtmlElement,
        export_button: &HtmlElement,
    ) -> Closure<dyn FnMut(Event)> {
        let state = state.clone();
        let file_input = file_input.clone();
        let container = container.clone();
        let export_button = export_button.clone();

        Closure::wrap(Box::new(move |_event: Event| {
            let Some(file) = file_input.files().and_then(|files| files.get(0)) else {
                return;
            };

            let state = state.clone();
            let container = container.clone();
            let export_button = export_button.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let Ok(buffer) = JsFuture::from(file.array_buffer()).await else {
                    return;
                };
                let data = Uint8Array::new(&buffer).to_vec();

                let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                    return;
                };

                let outcome = state.borrow_mut().load(&data);
                match outcome {
                    Ok(()) => {
                        export_button.set_hidden(false);
                        Self::render_current(&state, &document, &container);
                    }
                    Err(e) => {
                        let _ = dom::render_error(
                            &document,
                            &container,
                            &format!("failed to load file: {e}"),
                        );
                    }
                }
            });
        }) as Box<dyn FnMut(Event)>)
    }

    /// Delegated handler for `change` events bubbling out of cell inputs.
    pub(crate) fn make_edit_handler(state: &Rc<RefCell<Session>>) -> Closure<dyn FnMut(Event)> {
        let state = state.clone();

        Closure::wrap(Box::new(move |event: Event| {
            let Some(input) = event
                .target()
                .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
            else {
                return;
            };
            let Some(row) = attr_u32(&input, "data-row") else {
                return;
            };
            let Some(col) = attr_u32(&input, "data-col") else {
                return;
            };

            state.borrow_mut().commit_edit(row, col, &input.value());
        }) as Box<dyn FnMut(Event)>)
    }

    /// Handler for the export button. A no-op until a file is loaded.
    pub(crate) fn make_export_handler(state: &Rc<RefCell<Session>>) -> Closure<dyn FnMut(Event)> {
        let state = state.clone();

        Closure::wrap(Box::new(move |_event: Event| {
            let bytes = {
                let s = state.borrow();
                if !s.is_loaded() {
                    return;
                }
                match s.export() {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        web_sys::console::error_1(&JsValue::from_str(&format!(
                            "export failed: {e}"
                        )));
                        return;
                    }
                }
            };

            if let Err(e) = trigger_download(&bytes) {
                web_sys::console::error_1(&e);
            }
        }) as Box<dyn FnMut(Event)>)
    }

    /// Rebuild the table from the current workbook.
    pub(crate) fn render_current(
        state: &Rc<RefCell<Session>>,
        document: &Document,
        container: &HtmlElement,
    ) {
        let plan = state.borrow().grid_plan();
        if let Some(plan) = plan {
            if let Err(e) = dom::render(document, container, &plan) {
                web_sys::console::error_1(&e);
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn attr_u32(input: &HtmlInputElement, name: &str) -> Option<u32> {
    input.get_attribute(name).and_then(|v| v.parse().ok())
}

/// Offer `bytes` to the user as a file download.
#[cfg(target_arch = "wasm32")]
fn trigger_download(bytes: &[u8]) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let parts = js_sys::Array::new();
    parts.push(&Uint8Array::from(bytes).buffer());

    let options = BlobPropertyBag::new();
    options.set_type(XLSX_MIME);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;

    let url = Url::create_object_url_with_blob(&blob)?;

    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(EXPORT_FILENAME);
    anchor.click();

    Url::revoke_object_url(&url)?;
    Ok(())
}
