// Session configuration passed in from the JS host.
//
// Every field has a default so the host may pass `undefined`, `{}` or only
// the fields it wants to override.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapViewConfig {
    /// `[lat, lng]` of the initial view.
    pub center: [f64; 2],
    pub zoom: u8,
    pub tile_url: String,
    pub max_zoom: u8,
    pub attribution: String,
}

impl Default for MapViewConfig {
    fn default() -> Self {
        MapViewConfig {
            center: [46.8, 8.33],
            zoom: 7,
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            max_zoom: 19,
            attribution: "© OpenStreetMap contributors".to_string(),
        }
    }
}

/// Toolbar the drawing library renders on the map itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LibraryControls {
    pub position: String,
    pub draw_marker: bool,
    pub draw_polygon: bool,
    pub draw_polyline: bool,
    pub draw_circle: bool,
    pub draw_circle_marker: bool,
    pub edit_mode: bool,
    pub drag_mode: bool,
    pub cut_polygon: bool,
    pub removal_mode: bool,
}

impl Default for LibraryControls {
    fn default() -> Self {
        LibraryControls {
            position: "topleft".to_string(),
            draw_marker: true,
            draw_polygon: true,
            draw_polyline: false,
            draw_circle: true,
            draw_circle_marker: false,
            edit_mode: true,
            drag_mode: true,
            cut_polygon: false,
            removal_mode: true,
        }
    }
}

/// Ids of the page elements the session writes to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementIds {
    pub feature_viewer: String,
    pub marker_viewer: String,
    pub add_marker: String,
    pub draw_polygon: String,
    pub draw_polyline: String,
    pub draw_circle: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        ElementIds {
            feature_viewer: "geojson-viewer".to_string(),
            marker_viewer: "marker-viewer".to_string(),
            add_marker: "btn-add-marker".to_string(),
            draw_polygon: "btn-draw-polygon".to_string(),
            draw_polyline: "btn-draw-polyline".to_string(),
            draw_circle: "btn-draw-circle".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    pub map: MapViewConfig,
    pub controls: LibraryControls,
    pub elements: ElementIds,
    pub download_filename: String,
    pub flash_duration_ms: u32,
    /// Delay before asking the map to re-measure its container after startup.
    pub invalidate_size_delay_ms: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            map: MapViewConfig::default(),
            controls: LibraryControls::default(),
            elements: ElementIds::default(),
            download_filename: "data.geojson".to_string(),
            flash_duration_ms: 1600,
            invalidate_size_delay_ms: 300,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_object_gives_defaults() {
        let config: SessionConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.map.center, [46.8, 8.33]);
        assert_eq!(config.download_filename, "data.geojson");
    }

    #[test]
    fn partial_overrides_keep_other_defaults() {
        let config: SessionConfig = serde_json::from_value(json!({
            "downloadFilename": "shapes.geojson",
            "controls": { "drawPolyline": true },
            "elements": { "featureViewer": "out" }
        }))
        .unwrap();
        assert_eq!(config.download_filename, "shapes.geojson");
        assert!(config.controls.draw_polyline);
        assert!(config.controls.draw_polygon);
        assert_eq!(config.elements.feature_viewer, "out");
        assert_eq!(config.elements.marker_viewer, "marker-viewer");
        assert_eq!(config.flash_duration_ms, 1600);
    }
}
