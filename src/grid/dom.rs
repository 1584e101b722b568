//! DOM rendering of a [`GridPlan`].
//!
//! Rendering is full-replace: the container is cleared and a fresh table is
//! built each time. Inputs carry `data-row`/`data-col` so a single delegated
//! listener on the container can route edits back to the model.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, HtmlInputElement};

use super::GridPlan;

/// Replace the container's contents with a table for `plan`.
pub fn render(document: &Document, container: &HtmlElement, plan: &GridPlan) -> Result<(), JsValue> {
    container.set_inner_html("");

    let table = document.create_element("table")?;

    let thead = document.create_element("thead")?;
    let header_row = document.create_element("tr")?;

    // Corner cell above the row labels
    header_row.append_child(&document.create_element("th")?)?;
    for label in &plan.header {
        let th = document.create_element("th")?;
        th.set_text_content(Some(label));
        header_row.append_child(&th)?;
    }
    thead.append_child(&header_row)?;
    table.append_child(&thead)?;

    let tbody = document.create_element("tbody")?;
    for row in &plan.rows {
        let tr = document.create_element("tr")?;

        let th = document.create_element("th")?;
        th.set_text_content(Some(&row.label));
        tr.append_child(&th)?;

        for cell in &row.cells {
            let td = document.create_element("td")?;
            td.append_child(&make_input(document, cell.row, cell.col, &cell.text)?)?;
            tr.append_child(&td)?;
        }
        tbody.append_child(&tr)?;
    }
    table.append_child(&tbody)?;

    container.append_child(&table)?;
    Ok(())
}

fn make_input(document: &Document, row: u32, col: u32, text: &str) -> Result<Element, JsValue> {
    let element = document.create_element("input")?;
    let input: &HtmlInputElement = element.unchecked_ref();
    input.set_type("text");
    input.set_value(text);
    element.set_attribute("data-row", &row.to_string())?;
    element.set_attribute("data-col", &col.to_string())?;
    Ok(element)
}

/// Replace the container's contents with an error message.
pub fn render_error(document: &Document, container: &HtmlElement, message: &str) -> Result<(), JsValue> {
    container.set_inner_html("");
    let p = document.create_element("p")?;
    p.set_attribute("class", "load-error")?;
    p.set_text_content(Some(message));
    container.append_child(&p)?;
    Ok(())
}
