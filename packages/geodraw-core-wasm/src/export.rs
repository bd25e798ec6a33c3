// Export actions: clipboard copy and file download of the rendered feature text.

use js_sys::{Function, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::HtmlAnchorElement;

use crate::dom;
use crate::error::{js_error, GeoDrawError, Result};
use crate::console_warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Copied,
    CopyFailed,
}

impl Notice {
    pub fn message(self) -> &'static str {
        match self {
            Notice::Copied => "Copied to clipboard",
            Notice::CopyFailed => "Copy failed - select and copy manually",
        }
    }
}

async fn write_clipboard(text: &str) -> Result<()> {
    let window = web_sys::window().ok_or_else(|| GeoDrawError::Js("no window".to_string()))?;
    let navigator = window.navigator();

    // Looked up dynamically: the clipboard is missing on insecure origins
    let clipboard = Reflect::get(&navigator, &JsValue::from_str("clipboard"))
        .map_err(|e| js_error("navigator.clipboard", e))?;
    if clipboard.is_undefined() || clipboard.is_null() {
        return Err(GeoDrawError::Js("clipboard unavailable".to_string()));
    }
    let write_text = Reflect::get(&clipboard, &JsValue::from_str("writeText"))
        .map_err(|e| js_error("clipboard.writeText", e))?
        .dyn_into::<Function>()
        .map_err(|_| GeoDrawError::Js("clipboard.writeText is not callable".to_string()))?;
    let promise = write_text
        .call1(&clipboard, &JsValue::from_str(text))
        .map_err(|e| js_error("clipboard.writeText", e))?
        .dyn_into::<Promise>()
        .map_err(|_| GeoDrawError::Js("clipboard.writeText returned no promise".to_string()))?;

    JsFuture::from(promise)
        .await
        .map_err(|e| js_error("clipboard write rejected", e))?;
    Ok(())
}

/// Copy `text` to the clipboard in the background and flash the outcome.
/// Never fails from the caller's point of view.
pub fn copy_to_clipboard(text: String, flash_ms: u32) {
    spawn_local(async move {
        let notice = match write_clipboard(&text).await {
            Ok(()) => Notice::Copied,
            Err(err) => {
                console_warn!("Copy failed: {}", err);
                Notice::CopyFailed
            }
        };
        if let Err(err) = dom::show_flash(notice.message(), flash_ms) {
            console_warn!("Could not show notice: {}", err);
        }
    });
}

/// `data:` URL carrying `text`, percent-encoded like `encodeURIComponent`.
pub fn data_url(mime: &str, text: &str) -> String {
    let encoded: String = js_sys::encode_uri_component(text).into();
    format!("data:{},{}", mime, encoded)
}

/// Trigger a browser download of `text` under `filename`.
pub fn download(text: &str, filename: &str, mime: &str) -> Result<()> {
    let document = dom::document()?;
    let anchor = document
        .create_element("a")
        .map_err(|e| js_error("create download link", e))?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|_| GeoDrawError::Js("download link is not an anchor".to_string()))?;
    anchor.set_href(&data_url(mime, text));
    anchor.set_download(filename);
    anchor.click();
    Ok(())
}
