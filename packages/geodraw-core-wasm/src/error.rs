//! Error types shared by the core and the browser layer.

use std::fmt;

use wasm_bindgen::JsValue;

/// Errors raised while translating host input or touching the page.
///
/// Geometry store operations never fail; these only appear at the boundary
/// with the JS host.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoDrawError {
    /// The drawing library reported a shape name we do not model.
    UnknownShapeKind(String),
    /// A control name that is neither a drawing tool nor an action.
    UnknownTool(String),
    /// A shape id string that is not `layer:<n>` or `placed:<n>`.
    InvalidShapeId(String),
    /// A geometry payload that does not fit the reported shape kind.
    InvalidGeometry(String),
    /// A DOM element the session expected is not on the page.
    MissingElement(String),
    /// A call into the browser failed.
    Js(String),
    /// Converting between Rust values and JSON/JS values failed.
    Serialization(String),
}

impl fmt::Display for GeoDrawError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeoDrawError::UnknownShapeKind(name) => write!(f, "unknown shape kind: {}", name),
            GeoDrawError::UnknownTool(name) => write!(f, "unknown tool: {}", name),
            GeoDrawError::InvalidShapeId(id) => write!(f, "invalid shape id: {}", id),
            GeoDrawError::InvalidGeometry(msg) => write!(f, "invalid geometry: {}", msg),
            GeoDrawError::MissingElement(id) => write!(f, "missing element #{}", id),
            GeoDrawError::Js(msg) => write!(f, "browser call failed: {}", msg),
            GeoDrawError::Serialization(msg) => write!(f, "serialization failed: {}", msg),
        }
    }
}

impl std::error::Error for GeoDrawError {}

pub type Result<T> = std::result::Result<T, GeoDrawError>;

impl From<serde_json::Error> for GeoDrawError {
    fn from(err: serde_json::Error) -> Self {
        GeoDrawError::Serialization(err.to_string())
    }
}

impl From<serde_wasm_bindgen::Error> for GeoDrawError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        GeoDrawError::Serialization(err.to_string())
    }
}

impl From<GeoDrawError> for JsValue {
    fn from(err: GeoDrawError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

// JsValue errors carry no structure we can rely on; keep whatever text they have.
pub(crate) fn js_error(context: &str, value: JsValue) -> GeoDrawError {
    let detail = value.as_string().unwrap_or_else(|| format!("{:?}", value));
    GeoDrawError::Js(format!("{}: {}", context, detail))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_input() {
        assert_eq!(
            GeoDrawError::UnknownShapeKind("CircleMarker".into()).to_string(),
            "unknown shape kind: CircleMarker"
        );
        assert_eq!(
            GeoDrawError::MissingElement("geojson-viewer".into()).to_string(),
            "missing element #geojson-viewer"
        );
    }

    #[test]
    fn json_errors_become_serialization_errors() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        match GeoDrawError::from(err) {
            GeoDrawError::Serialization(msg) => assert!(!msg.is_empty()),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
