// Export views derived from the geometry store. Always rebuilt, never cached.

use serde_json::{json, Map, Value};

use crate::geojson::{geometry_to_value, js_number, point_to_value};
use crate::shape::ShapeGeometry;
use crate::store::GeometryStore;

/// `[lat, lng]` for every live marker, in store order.
pub fn marker_coordinates(store: &GeometryStore) -> Vec<[f64; 2]> {
    store
        .iter()
        .filter_map(|shape| match shape.geometry {
            ShapeGeometry::Marker(p) => Some([p.y(), p.x()]),
            _ => None,
        })
        .collect()
}

/// One feature record for every live circle, polygon and polyline, in store order.
pub fn feature_collection(store: &GeometryStore) -> Vec<Value> {
    store
        .iter()
        .filter_map(|shape| {
            let mut properties = Map::new();
            properties.insert("type".into(), json!(shape.kind().tag()));

            let geometry = match &shape.geometry {
                ShapeGeometry::Marker(_) => return None,
                ShapeGeometry::Circle { center, radius } => {
                    properties.insert("radius".into(), js_number(*radius));
                    point_to_value(*center)
                }
                ShapeGeometry::Polygon(g) | ShapeGeometry::Polyline(g) => {
                    if let Some(style) = store.style(shape.id) {
                        properties.insert("color".into(), json!(style.color));
                    }
                    geometry_to_value(g)
                }
            };

            Some(json!({
                "type": "Feature",
                "properties": Value::Object(properties),
                "geometry": geometry,
            }))
        })
        .collect()
}

/// Both export views as they are shown: markers wrapped in a `markers`
/// field, features as a bare array.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportViews {
    pub markers: Value,
    pub features: Value,
}

impl ExportViews {
    pub fn from_store(store: &GeometryStore) -> Self {
        let markers: Vec<Value> = marker_coordinates(store)
            .into_iter()
            .map(|[lat, lng]| json!([js_number(lat), js_number(lng)]))
            .collect();
        ExportViews {
            markers: json!({ "markers": markers }),
            features: Value::Array(feature_collection(store)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::FixedHues;
    use crate::shape::{LatLng, Shape, ShapeId};

    fn store() -> GeometryStore {
        GeometryStore::with_palette(Box::new(FixedHues::new(vec![42])))
    }

    #[test]
    fn empty_store_yields_empty_views() {
        let store = store();
        assert!(marker_coordinates(&store).is_empty());
        assert!(feature_collection(&store).is_empty());
        let views = ExportViews::from_store(&store);
        assert_eq!(views.markers, json!({ "markers": [] }));
        assert_eq!(views.features, json!([]));
    }

    #[test]
    fn markers_export_as_lat_lng_pairs() {
        let mut store = store();
        store.add(Shape::marker(ShapeId::Placed(1), LatLng::new(46.8, 8.33)));
        assert_eq!(marker_coordinates(&store), vec![[46.8, 8.33]]);
        assert!(feature_collection(&store).is_empty());
    }

    #[test]
    fn circle_exports_center_point_and_radius() {
        let mut store = store();
        store.add(Shape::circle(ShapeId::Layer(5), LatLng::new(47.0, 8.5), 500.0));
        let features = feature_collection(&store);
        assert_eq!(
            features,
            vec![json!({
                "type": "Feature",
                "properties": { "type": "circle", "radius": 500 },
                "geometry": { "type": "Point", "coordinates": [8.5, 47] }
            })]
        );
    }

    #[test]
    fn area_and_line_shapes_carry_their_color() {
        let mut store = store();
        store.add(Shape::polyline(
            ShapeId::Layer(8),
            &[LatLng::new(46.0, 8.0), LatLng::new(46.5, 8.25)],
        ));
        let features = feature_collection(&store);
        assert_eq!(
            features[0],
            json!({
                "type": "Feature",
                "properties": { "type": "polyline", "color": "hsl(42 70% 70% / 1)" },
                "geometry": { "type": "LineString", "coordinates": [[8, 46], [8.25, 46.5]] }
            })
        );
    }

    #[test]
    fn serialization_is_repeatable() {
        let mut store = store();
        store.add(Shape::marker(ShapeId::Placed(1), LatLng::new(1.5, 2.5)));
        store.add(Shape::polygon(
            ShapeId::Layer(2),
            &[LatLng::new(0.0, 0.0), LatLng::new(0.0, 1.0), LatLng::new(1.0, 1.0)],
        ));
        assert_eq!(ExportViews::from_store(&store), ExportViews::from_store(&store));
    }

    #[test]
    fn property_order_matches_display_order() {
        let mut store = store();
        store.add(Shape::circle(ShapeId::Layer(5), LatLng::new(47.0, 8.5), 12.5));
        let text = serde_json::to_string(&feature_collection(&store)).unwrap();
        assert_eq!(
            text,
            r#"[{"type":"Feature","properties":{"type":"circle","radius":12.5},"geometry":{"type":"Point","coordinates":[8.5,47]}}]"#
        );
    }
}
