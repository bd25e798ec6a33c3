// Geometry store: live shapes in insertion order plus the style metadata table.

use std::collections::HashMap;

use crate::palette::{Palette, RandomPastel, ShapeStyle};
use crate::shape::{Shape, ShapeGeometry, ShapeId, ShapeKind};

/// Result of [`GeometryStore::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Added {
    /// A new shape; `style` is set for area/line kinds.
    New { style: Option<ShapeStyle> },
    /// The id was already live; its geometry was replaced in place.
    /// `style` is the entry now on record, fresh if the kind became styled.
    Replaced { previous: ShapeKind, style: Option<ShapeStyle> },
}

pub struct GeometryStore {
    shapes: Vec<Shape>,
    metadata: HashMap<ShapeId, ShapeStyle>,
    palette: Box<dyn Palette>,
}

impl Default for GeometryStore {
    fn default() -> Self {
        GeometryStore::new()
    }
}

impl GeometryStore {
    pub fn new() -> Self {
        GeometryStore::with_palette(Box::new(RandomPastel))
    }

    pub fn with_palette(palette: Box<dyn Palette>) -> Self {
        GeometryStore {
            shapes: Vec::new(),
            metadata: HashMap::new(),
            palette,
        }
    }

    /// Insert a shape, assigning a fresh color if its kind carries one.
    ///
    /// Re-adding a live id keeps its position and metadata and only swaps
    /// the geometry.
    pub fn add(&mut self, shape: Shape) -> Added {
        if let Some(existing) = self.shapes.iter_mut().find(|s| s.id == shape.id) {
            let previous = existing.kind();
            existing.geometry = shape.geometry;
            // A kind change may add or drop the need for a color
            if !existing.kind().is_styled() {
                self.metadata.remove(&shape.id);
            } else if !self.metadata.contains_key(&shape.id) {
                let style = ShapeStyle { color: self.palette.next_color() };
                self.metadata.insert(shape.id, style);
            }
            return Added::Replaced { previous, style: self.metadata.get(&shape.id).copied() };
        }

        let style = if shape.kind().is_styled() {
            let style = ShapeStyle { color: self.palette.next_color() };
            self.metadata.insert(shape.id, style);
            Some(style)
        } else {
            None
        };
        self.shapes.push(shape);
        Added::New { style }
    }

    /// Replace the geometry of a live shape. Identity and metadata are untouched.
    ///
    /// Returns false if the id is unknown or the new geometry is of another kind.
    pub fn update_geometry(&mut self, id: ShapeId, geometry: ShapeGeometry) -> bool {
        match self.shapes.iter_mut().find(|s| s.id == id) {
            Some(shape) if shape.kind() == geometry.kind() => {
                shape.geometry = geometry;
                true
            }
            _ => false,
        }
    }

    /// Remove a shape and its metadata entry. Unknown ids are a no-op.
    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        let index = self.shapes.iter().position(|s| s.id == id)?;
        self.metadata.remove(&id);
        Some(self.shapes.remove(index))
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
        self.metadata.clear();
    }

    /// Live shapes in insertion order. The borrow pins the store for the
    /// duration of the iteration.
    pub fn iter(&self) -> std::slice::Iter<'_, Shape> {
        self.shapes.iter()
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.get(id).is_some()
    }

    pub fn style(&self, id: ShapeId) -> Option<&ShapeStyle> {
        self.metadata.get(&id)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn metadata_len(&self) -> usize {
        self.metadata.len()
    }
}

impl<'a> IntoIterator for &'a GeometryStore {
    type Item = &'a Shape;
    type IntoIter = std::slice::Iter<'a, Shape>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{FixedHues, PastelColor};
    use crate::shape::LatLng;

    fn store() -> GeometryStore {
        GeometryStore::with_palette(Box::new(FixedHues::new(vec![120, 240])))
    }

    fn triangle(id: u64) -> Shape {
        Shape::polygon(
            ShapeId::Layer(id),
            &[LatLng::new(46.0, 8.0), LatLng::new(46.0, 9.0), LatLng::new(47.0, 8.5)],
        )
    }

    // Every styled shape has exactly one metadata entry and nothing else does.
    fn assert_metadata_invariant(store: &GeometryStore) {
        let styled = store.iter().filter(|s| s.kind().is_styled()).count();
        assert_eq!(store.metadata_len(), styled);
        for shape in store {
            assert_eq!(store.style(shape.id).is_some(), shape.kind().is_styled());
        }
    }

    #[test]
    fn styled_kinds_get_colors_others_do_not() {
        let mut store = store();
        let marker = store.add(Shape::marker(ShapeId::Placed(1), LatLng::new(46.8, 8.33)));
        let circle = store.add(Shape::circle(ShapeId::Layer(2), LatLng::new(47.0, 8.5), 500.0));
        let polygon = store.add(triangle(3));
        let line = store.add(Shape::polyline(
            ShapeId::Layer(4),
            &[LatLng::new(46.0, 8.0), LatLng::new(46.5, 8.5)],
        ));

        assert_eq!(marker, Added::New { style: None });
        assert_eq!(circle, Added::New { style: None });
        assert_eq!(
            polygon,
            Added::New { style: Some(ShapeStyle { color: PastelColor::from_hue(120) }) }
        );
        assert_eq!(
            line,
            Added::New { style: Some(ShapeStyle { color: PastelColor::from_hue(240) }) }
        );
        assert_eq!(store.len(), 4);
        assert_metadata_invariant(&store);
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut store = store();
        store.add(triangle(9));
        store.add(Shape::marker(ShapeId::Placed(1), LatLng::new(0.0, 0.0)));
        store.add(triangle(3));
        let ids: Vec<ShapeId> = store.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![ShapeId::Layer(9), ShapeId::Placed(1), ShapeId::Layer(3)]);

        // restartable
        assert_eq!(store.iter().count(), 3);
        assert_eq!(store.iter().count(), 3);
    }

    #[test]
    fn remove_drops_metadata_and_ignores_unknown_ids() {
        let mut store = store();
        store.add(triangle(1));
        store.add(triangle(2));

        assert!(store.remove(ShapeId::Layer(1)).is_some());
        assert!(store.style(ShapeId::Layer(1)).is_none());
        assert!(store.remove(ShapeId::Layer(1)).is_none());
        assert!(store.remove(ShapeId::Placed(77)).is_none());
        assert_eq!(store.len(), 1);
        assert_metadata_invariant(&store);
    }

    #[test]
    fn re_adding_a_live_id_replaces_geometry_only() {
        let mut store = store();
        store.add(triangle(1));
        store.add(Shape::marker(ShapeId::Placed(1), LatLng::new(0.0, 0.0)));
        let color = *store.style(ShapeId::Layer(1)).expect("style");

        let moved = Shape::polygon(
            ShapeId::Layer(1),
            &[LatLng::new(0.0, 0.0), LatLng::new(0.0, 1.0), LatLng::new(1.0, 0.0)],
        );
        assert_eq!(
            store.add(moved.clone()),
            Added::Replaced { previous: ShapeKind::Polygon, style: Some(color) }
        );
        assert_eq!(store.len(), 2);
        assert_eq!(store.iter().next(), Some(&moved));
        assert_eq!(store.style(ShapeId::Layer(1)), Some(&color));
    }

    #[test]
    fn re_adding_as_another_kind_fixes_up_metadata() {
        let mut store = store();
        let id = ShapeId::Layer(4);
        store.add(Shape::circle(id, LatLng::new(47.0, 8.5), 10.0));
        assert!(store.style(id).is_none());

        let fresh = ShapeStyle { color: PastelColor::from_hue(120) };
        assert_eq!(
            store.add(Shape::new(id, triangle(4).geometry)),
            Added::Replaced { previous: ShapeKind::Circle, style: Some(fresh) }
        );
        assert_metadata_invariant(&store);

        assert_eq!(
            store.add(Shape::marker(id, LatLng::new(0.0, 0.0))),
            Added::Replaced { previous: ShapeKind::Polygon, style: None }
        );
        assert_metadata_invariant(&store);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn update_geometry_requires_same_kind() {
        let mut store = store();
        store.add(Shape::marker(ShapeId::Placed(1), LatLng::new(0.0, 0.0)));

        let moved = Shape::marker(ShapeId::Placed(1), LatLng::new(1.0, 2.0)).geometry;
        assert!(store.update_geometry(ShapeId::Placed(1), moved.clone()));
        assert_eq!(store.get(ShapeId::Placed(1)).map(|s| &s.geometry), Some(&moved));

        let circle = Shape::circle(ShapeId::Placed(1), LatLng::new(0.0, 0.0), 5.0).geometry;
        assert!(!store.update_geometry(ShapeId::Placed(1), circle));
        assert!(!store.update_geometry(ShapeId::Placed(2), moved));
        assert_eq!(store.get(ShapeId::Placed(1)).map(|s| s.kind()), Some(ShapeKind::Marker));
    }

    #[test]
    fn live_count_tracks_adds_and_removes() {
        let mut store = store();
        let mut expected = 0usize;
        for step in 0..40u64 {
            let id = ShapeId::Layer(step % 7);
            if step % 3 == 0 {
                if store.remove(id).is_some() {
                    expected -= 1;
                }
            } else if !store.contains(id) {
                store.add(triangle(step % 7));
                expected += 1;
            }
            assert_eq!(store.len(), expected);
            assert_metadata_invariant(&store);
        }
    }

    #[test]
    fn clear_empties_both_tables() {
        let mut store = store();
        store.add(triangle(1));
        store.add(Shape::marker(ShapeId::Placed(1), LatLng::new(0.0, 0.0)));
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.metadata_len(), 0);
        store.clear();
        assert!(store.is_empty());
    }
}
