// Page-side rendering: viewer text, toggle button state and flash notices.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use crate::config::ElementIds;
use crate::controller::{RenderedView, Tool};
use crate::error::{js_error, GeoDrawError, Result};

const ACTIVE_BACKGROUND: &str = "#eef2ff";
const INACTIVE_BACKGROUND: &str = "#fff";

pub fn document() -> Result<Document> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| GeoDrawError::Js("no document available".to_string()))
}

fn element(document: &Document, id: &str) -> Result<Element> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| GeoDrawError::MissingElement(id.to_string()))
}

fn html_element(document: &Document, id: &str) -> Result<HtmlElement> {
    element(document, id)?
        .dyn_into::<HtmlElement>()
        .map_err(|_| GeoDrawError::Js(format!("#{} is not an HTML element", id)))
}

/// Write both viewers. The feature viewer's text content is what copy and
/// download export.
pub fn render_viewers(ids: &ElementIds, view: &RenderedView) -> Result<()> {
    let document = document()?;
    element(&document, &ids.feature_viewer)?.set_inner_html(&view.feature_html);
    element(&document, &ids.marker_viewer)?.set_inner_html(&view.marker_html);
    Ok(())
}

pub fn tool_button_id(ids: &ElementIds, tool: Tool) -> &str {
    match tool {
        Tool::AddMarker => &ids.add_marker,
        Tool::DrawPolygon => &ids.draw_polygon,
        Tool::DrawPolyline => &ids.draw_polyline,
        Tool::DrawCircle => &ids.draw_circle,
    }
}

pub fn set_tool_active(ids: &ElementIds, tool: Tool, active: bool) -> Result<()> {
    let document = document()?;
    let button = html_element(&document, tool_button_id(ids, tool))?;
    let background = if active { ACTIVE_BACKGROUND } else { INACTIVE_BACKGROUND };
    button
        .style()
        .set_property("background", background)
        .map_err(|e| js_error("set button background", e))
}

/// Show a transient notice in the bottom-right corner.
pub fn show_flash(message: &str, duration_ms: u32) -> Result<()> {
    let window = web_sys::window().ok_or_else(|| GeoDrawError::Js("no window".to_string()))?;
    let document = document()?;
    let body = document
        .body()
        .ok_or_else(|| GeoDrawError::MissingElement("body".to_string()))?;

    let notice = document
        .create_element("div")
        .map_err(|e| js_error("create flash", e))?
        .dyn_into::<HtmlElement>()
        .map_err(|_| GeoDrawError::Js("flash is not an HTML element".to_string()))?;
    notice.set_text_content(Some(message));

    let style = notice.style();
    for (property, value) in [
        ("position", "fixed"),
        ("bottom", "20px"),
        ("right", "20px"),
        ("padding", "10px 14px"),
        ("background", "#111827"),
        ("color", "#fff"),
        ("border-radius", "8px"),
    ] {
        style
            .set_property(property, value)
            .map_err(|e| js_error("style flash", e))?;
    }
    body.append_child(&notice).map_err(|e| js_error("show flash", e))?;

    // Fire and forget; nothing waits on the notice going away
    let expire = Closure::once_into_js(move || notice.remove());
    window
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            expire.unchecked_ref(),
            duration_ms as i32,
        )
        .map_err(|e| js_error("schedule flash removal", e))?;
    Ok(())
}
