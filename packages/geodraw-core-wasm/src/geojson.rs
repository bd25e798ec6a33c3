// GeoJSON geometry conversion between serde_json values and geo-types.
//
// Coordinates are passed through as-is: no rounding, no reprojection.

use geo_types::{Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use serde_json::{json, Value};

use crate::error::{GeoDrawError, Result};

// Largest integer a JS number represents exactly (2^53 - 1).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// JSON value for an exported number: integral values become integers and
/// non-finite values become `null`. Remaining floats are spelled by
/// [`js_number_text`] when the views are printed.
pub fn js_number(value: f64) -> Value {
    if !value.is_finite() {
        return Value::Null;
    }
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        // also folds -0.0 into 0
        return Value::from(value as i64);
    }
    json!(value)
}

/// Spell a finite float the way JavaScript's `Number.prototype.toString`
/// does: shortest round-trip digits, plain decimal notation for decimal
/// exponents from -7 up to 21, otherwise `d.ddde+N` / `d.ddde-N`.
pub fn js_number_text(value: f64) -> String {
    if !value.is_finite() {
        return "null".to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    if value < 0.0 {
        return format!("-{}", js_number_text(-value));
    }

    // `{:e}` yields the shortest round-trip digits, e.g. `1.2e-6`
    let sci = format!("{:e}", value);
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let k = digits.len() as i32;
    // Position of the decimal point relative to the first digit
    let n = exponent + 1;

    if k <= n && n <= 21 {
        format!("{}{}", digits, "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{}.{}", int, frac)
    } else if -6 < n && n <= 0 {
        format!("0.{}{}", "0".repeat((-n) as usize), digits)
    } else {
        let sign = if n - 1 < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", first, sign, (n - 1).abs())
        } else {
            format!("{}.{}e{}{}", first, rest, sign, (n - 1).abs())
        }
    }
}

fn position(c: Coord<f64>) -> Value {
    Value::Array(vec![js_number(c.x), js_number(c.y)])
}

fn positions(line: &LineString<f64>) -> Value {
    Value::Array(line.coords().map(|c| position(*c)).collect())
}

fn rings(polygon: &Polygon<f64>) -> Value {
    let mut out = vec![positions(polygon.exterior())];
    out.extend(polygon.interiors().iter().map(positions));
    Value::Array(out)
}

pub fn point_to_value(point: Point<f64>) -> Value {
    json!({ "type": "Point", "coordinates": position(point.0) })
}

/// Render a geo-types geometry as a GeoJSON geometry object.
pub fn geometry_to_value(geometry: &Geometry<f64>) -> Value {
    match geometry {
        Geometry::Point(p) => point_to_value(*p),
        Geometry::MultiPoint(mp) => json!({
            "type": "MultiPoint",
            "coordinates": Value::Array(mp.iter().map(|p| position(p.0)).collect()),
        }),
        Geometry::Line(line) => json!({
            "type": "LineString",
            "coordinates": [position(line.start), position(line.end)],
        }),
        Geometry::LineString(ls) => json!({ "type": "LineString", "coordinates": positions(ls) }),
        Geometry::MultiLineString(mls) => json!({
            "type": "MultiLineString",
            "coordinates": Value::Array(mls.iter().map(positions).collect()),
        }),
        Geometry::Polygon(p) => json!({ "type": "Polygon", "coordinates": rings(p) }),
        Geometry::MultiPolygon(mp) => json!({
            "type": "MultiPolygon",
            "coordinates": Value::Array(mp.iter().map(rings).collect()),
        }),
        Geometry::Rect(rect) => json!({ "type": "Polygon", "coordinates": rings(&rect.to_polygon()) }),
        Geometry::Triangle(tri) => json!({ "type": "Polygon", "coordinates": rings(&tri.to_polygon()) }),
        Geometry::GeometryCollection(gc) => json!({
            "type": "GeometryCollection",
            "geometries": Value::Array(gc.iter().map(geometry_to_value).collect()),
        }),
    }
}

pub fn geometry_type_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::Line(_) | Geometry::LineString(_) => "LineString",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::Polygon(_) | Geometry::Rect(_) | Geometry::Triangle(_) => "Polygon",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
    }
}

fn invalid(msg: impl Into<String>) -> GeoDrawError {
    GeoDrawError::InvalidGeometry(msg.into())
}

fn parse_position(value: &Value) -> Result<Coord<f64>> {
    let pair = value
        .as_array()
        .filter(|a| a.len() >= 2)
        .ok_or_else(|| invalid(format!("expected a position, got {}", value)))?;
    // Altitude, if present, is dropped
    match (pair[0].as_f64(), pair[1].as_f64()) {
        (Some(x), Some(y)) => Ok(Coord { x, y }),
        _ => Err(invalid(format!("non-numeric position {}", value))),
    }
}

fn parse_array<'a>(value: &'a Value, what: &str) -> Result<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| invalid(format!("expected an array of {}", what)))
}

fn parse_line(value: &Value) -> Result<LineString<f64>> {
    let coords = parse_array(value, "positions")?
        .iter()
        .map(parse_position)
        .collect::<Result<Vec<_>>>()?;
    Ok(LineString::new(coords))
}

fn parse_polygon(value: &Value) -> Result<Polygon<f64>> {
    let mut rings = parse_array(value, "rings")?
        .iter()
        .map(parse_line)
        .collect::<Result<Vec<_>>>()?;
    if rings.is_empty() {
        return Err(invalid("polygon without an exterior ring"));
    }
    let exterior = rings.remove(0);
    Ok(Polygon::new(exterior, rings))
}

/// Parse a GeoJSON geometry object (as exported by the drawing library).
pub fn geometry_from_value(value: &Value) -> Result<Geometry<f64>> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("missing geometry type"))?;
    let coordinates = value
        .get("coordinates")
        .ok_or_else(|| invalid(format!("{} without coordinates", kind)))?;

    let geometry = match kind {
        "Point" => Geometry::Point(Point(parse_position(coordinates)?)),
        "MultiPoint" => {
            let points = parse_array(coordinates, "positions")?
                .iter()
                .map(|v| parse_position(v).map(Point))
                .collect::<Result<Vec<_>>>()?;
            Geometry::MultiPoint(MultiPoint::new(points))
        }
        "LineString" => Geometry::LineString(parse_line(coordinates)?),
        "MultiLineString" => {
            let lines = parse_array(coordinates, "lines")?
                .iter()
                .map(parse_line)
                .collect::<Result<Vec<_>>>()?;
            Geometry::MultiLineString(MultiLineString::new(lines))
        }
        "Polygon" => Geometry::Polygon(parse_polygon(coordinates)?),
        "MultiPolygon" => {
            let polygons = parse_array(coordinates, "polygons")?
                .iter()
                .map(parse_polygon)
                .collect::<Result<Vec<_>>>()?;
            Geometry::MultiPolygon(MultiPolygon::new(polygons))
        }
        other => return Err(invalid(format!("unsupported geometry type {}", other))),
    };
    Ok(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_print_like_javascript() {
        assert_eq!(js_number(500.0).to_string(), "500");
        assert_eq!(js_number(-0.0).to_string(), "0");
        assert_eq!(js_number(46.8).to_string(), "46.8");
        assert_eq!(js_number(f64::NAN), Value::Null);
        assert_eq!(js_number(f64::INFINITY), Value::Null);
    }

    #[test]
    fn float_text_matches_javascript() {
        assert_eq!(js_number_text(0.000001), "0.000001");
        assert_eq!(js_number_text(0.0000012), "0.0000012");
        assert_eq!(js_number_text(1e-7), "1e-7");
        assert_eq!(js_number_text(-1.5e-9), "-1.5e-9");
        assert_eq!(js_number_text(1e16), "10000000000000000");
        assert_eq!(js_number_text(1e21), "1e+21");
        assert_eq!(js_number_text(1.25e22), "1.25e+22");
        assert_eq!(js_number_text(46.8), "46.8");
        assert_eq!(js_number_text(0.1), "0.1");
        assert_eq!(js_number_text(500.0), "500");
        assert_eq!(js_number_text(-0.0), "0");
        assert_eq!(js_number_text(123456.789), "123456.789");
        assert_eq!(js_number_text(f64::NAN), "null");
    }

    #[test]
    fn polygon_keeps_ring_order_and_precision() {
        let input = json!({
            "type": "Polygon",
            "coordinates": [[[8.123456789, 46.1], [8.2, 46.1], [8.2, 46.2], [8.123456789, 46.1]]]
        });
        let geometry = geometry_from_value(&input).expect("polygon");
        assert_eq!(geometry_to_value(&geometry), input);
    }

    #[test]
    fn polygon_with_hole_round_trips() {
        let input = json!({
            "type": "Polygon",
            "coordinates": [
                [[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]],
                [[2, 2], [3, 2], [3, 3], [2, 2]]
            ]
        });
        let geometry = geometry_from_value(&input).expect("polygon");
        assert_eq!(geometry_to_value(&geometry), input);
    }

    #[test]
    fn altitude_is_dropped() {
        let input = json!({ "type": "Point", "coordinates": [8.5, 47.0, 410.0] });
        let geometry = geometry_from_value(&input).expect("point");
        assert_eq!(geometry, Geometry::Point(Point::new(8.5, 47.0)));
    }

    #[test]
    fn malformed_geometries_are_rejected() {
        assert!(geometry_from_value(&json!({ "coordinates": [0, 0] })).is_err());
        assert!(geometry_from_value(&json!({ "type": "Point" })).is_err());
        assert!(geometry_from_value(&json!({ "type": "Point", "coordinates": [1] })).is_err());
        assert!(geometry_from_value(&json!({ "type": "Polygon", "coordinates": [] })).is_err());
        assert!(geometry_from_value(&json!({ "type": "Circle", "coordinates": [0, 0] })).is_err());
    }
}
