// Shape model: identities, kinds and geometric payloads of drawn objects.

use std::fmt;
use std::str::FromStr;

use geo_types::{Geometry, LineString, Point, Polygon};
use serde::{Deserialize, Serialize};

use crate::error::{GeoDrawError, Result};
use crate::geojson;

/// Geographic position as the map library reports it (WGS84 degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        LatLng { lat, lng }
    }

    pub fn to_point(self) -> Point<f64> {
        Point::new(self.lng, self.lat)
    }
}

/// Stable identity of a shape for its whole lifetime.
///
/// `Layer` ids come from the drawing library, `Placed` ids are minted by the
/// controller for markers dropped in marker-adding mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeId {
    Layer(u64),
    Placed(u64),
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeId::Layer(n) => write!(f, "layer:{}", n),
            ShapeId::Placed(n) => write!(f, "placed:{}", n),
        }
    }
}

impl FromStr for ShapeId {
    type Err = GeoDrawError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || GeoDrawError::InvalidShapeId(s.to_string());
        let (prefix, number) = s.split_once(':').ok_or_else(invalid)?;
        let number: u64 = number.parse().map_err(|_| invalid())?;
        match prefix {
            "layer" => Ok(ShapeId::Layer(number)),
            "placed" => Ok(ShapeId::Placed(number)),
            _ => Err(invalid()),
        }
    }
}

impl Serialize for ShapeId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Marker,
    Circle,
    Polygon,
    Polyline,
}

impl ShapeKind {
    /// Map a drawing-library shape name onto our kinds.
    pub fn from_library_name(name: &str) -> Result<Self> {
        match name {
            "Marker" => Ok(ShapeKind::Marker),
            "Circle" => Ok(ShapeKind::Circle),
            // Rectangles are polygons as far as the library's layers go
            "Polygon" | "Rectangle" => Ok(ShapeKind::Polygon),
            "Line" | "Polyline" => Ok(ShapeKind::Polyline),
            other => Err(GeoDrawError::UnknownShapeKind(other.to_string())),
        }
    }

    /// The `type` tag used in exported feature properties.
    pub fn tag(self) -> &'static str {
        match self {
            ShapeKind::Marker => "marker",
            ShapeKind::Circle => "circle",
            ShapeKind::Polygon => "polygon",
            ShapeKind::Polyline => "polyline",
        }
    }

    /// Area/line kinds carry style metadata, markers and circles never do.
    pub fn is_styled(self) -> bool {
        matches!(self, ShapeKind::Polygon | ShapeKind::Polyline)
    }
}

/// Geometric payload, one variant per kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeGeometry {
    Marker(Point<f64>),
    Circle { center: Point<f64>, radius: f64 },
    /// `Polygon` or `MultiPolygon`, as exported by the library.
    Polygon(Geometry<f64>),
    /// `LineString` or `MultiLineString`, as exported by the library.
    Polyline(Geometry<f64>),
}

impl ShapeGeometry {
    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeGeometry::Marker(_) => ShapeKind::Marker,
            ShapeGeometry::Circle { .. } => ShapeKind::Circle,
            ShapeGeometry::Polygon(_) => ShapeKind::Polygon,
            ShapeGeometry::Polyline(_) => ShapeKind::Polyline,
        }
    }
}

/// What the host sends for a created or edited layer: the library's shape
/// name, the layer's own GeoJSON geometry and, for circles, the radius.
#[derive(Debug, Clone, Deserialize)]
pub struct ShapeReport {
    pub shape: String,
    pub geometry: serde_json::Value,
    #[serde(default)]
    pub radius: Option<f64>,
}

impl ShapeReport {
    pub fn into_geometry(self) -> Result<ShapeGeometry> {
        let kind = ShapeKind::from_library_name(&self.shape)?;
        let geometry = geojson::geometry_from_value(&self.geometry)?;
        match (kind, geometry) {
            (ShapeKind::Marker, Geometry::Point(p)) => Ok(ShapeGeometry::Marker(p)),
            (ShapeKind::Circle, Geometry::Point(center)) => match self.radius {
                Some(radius) if radius.is_finite() => Ok(ShapeGeometry::Circle { center, radius }),
                _ => Err(GeoDrawError::InvalidGeometry(
                    "circle without a finite radius".to_string(),
                )),
            },
            (ShapeKind::Polygon, g @ (Geometry::Polygon(_) | Geometry::MultiPolygon(_))) => {
                Ok(ShapeGeometry::Polygon(g))
            }
            (ShapeKind::Polyline, g @ (Geometry::LineString(_) | Geometry::MultiLineString(_))) => {
                Ok(ShapeGeometry::Polyline(g))
            }
            (kind, g) => Err(GeoDrawError::InvalidGeometry(format!(
                "{} cannot carry a {} geometry",
                kind.tag(),
                geojson::geometry_type_name(&g)
            ))),
        }
    }
}

/// A drawn object held in the geometry store.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub id: ShapeId,
    pub geometry: ShapeGeometry,
}

impl Shape {
    pub fn new(id: ShapeId, geometry: ShapeGeometry) -> Self {
        Shape { id, geometry }
    }

    pub fn marker(id: ShapeId, at: LatLng) -> Self {
        Shape::new(id, ShapeGeometry::Marker(at.to_point()))
    }

    pub fn circle(id: ShapeId, center: LatLng, radius: f64) -> Self {
        Shape::new(id, ShapeGeometry::Circle { center: center.to_point(), radius })
    }

    /// Single-ring polygon from `(lat, lng)` vertices. The ring is closed if needed.
    pub fn polygon(id: ShapeId, vertices: &[LatLng]) -> Self {
        let ring: LineString<f64> = vertices.iter().map(|v| (v.lng, v.lat)).collect();
        Shape::new(id, ShapeGeometry::Polygon(Polygon::new(ring, vec![]).into()))
    }

    pub fn polyline(id: ShapeId, vertices: &[LatLng]) -> Self {
        let path: LineString<f64> = vertices.iter().map(|v| (v.lng, v.lat)).collect();
        Shape::new(id, ShapeGeometry::Polyline(path.into()))
    }

    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }
}
