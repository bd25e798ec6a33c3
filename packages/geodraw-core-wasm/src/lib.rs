use wasm_bindgen::prelude::*;

// Browser console bindings
pub mod console;
// Error type shared across the crate
pub mod error;
// Session configuration
pub mod config;
// Shape model and GeoJSON conversion
pub mod shape;
pub mod geojson;
// Style metadata
pub mod palette;
// Geometry store and export views
pub mod store;
pub mod serializer;
// JSON viewer highlighting
pub mod highlight;
// Mode state machine and event dispatch
pub mod controller;
// Page-side effects
mod dom;
mod export;
// JS-facing session object
mod session;

pub use controller::{Controller, Effect, Event, Mode, Tool};
pub use error::GeoDrawError;
pub use session::MapSession;
pub use store::GeometryStore;

// Enable better panic messages in console during development
#[cfg(feature = "console_error_panic_hook")]
pub use console_error_panic_hook::set_once as set_panic_hook;

#[macro_export]
macro_rules! console_log {
    ($($t:tt)*) => ($crate::console::log(&format!($($t)*)))
}

#[macro_export]
macro_rules! console_warn {
    ($($t:tt)*) => ($crate::console::warn(&format!($($t)*)))
}

use std::sync::Once;
static INIT: Once = Once::new();

#[wasm_bindgen(start)]
pub fn start() {
    INIT.call_once(|| {
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        console_log!("geodraw WASM module initialized");
    });
}

/// Highlight a JSON document for display. Empty or `null` input gives `""`.
#[wasm_bindgen(js_name = highlightJson)]
pub fn highlight_json(json: &str) -> Result<String, JsValue> {
    if json.trim().is_empty() {
        return Ok(String::new());
    }
    let value: serde_json::Value = serde_json::from_str(json).map_err(GeoDrawError::from)?;
    Ok(highlight::format(Some(&value)))
}
