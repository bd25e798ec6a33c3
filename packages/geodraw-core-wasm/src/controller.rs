//! Interaction controller.
//!
//! Owns the application state (active mode plus the geometry store) and turns
//! every input [`Event`] into state changes and a list of [`Effect`]s. It never
//! touches the map or the page itself: the session layer applies the effects,
//! which keeps ordering and refresh counts testable without a browser.

use serde::Serialize;

use crate::config::{LibraryControls, MapViewConfig, SessionConfig};
use crate::error::{GeoDrawError, Result};
use crate::highlight;
use crate::palette::{ShapeStyle, StrokeStyle};
use crate::serializer::ExportViews;
use crate::shape::{LatLng, Shape, ShapeGeometry, ShapeId, ShapeKind};
use crate::store::{Added, GeometryStore};

pub const DOWNLOAD_MIME: &str = "text/json;charset=utf-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DrawKind {
    Polygon,
    Polyline,
    Circle,
}

impl DrawKind {
    /// Shape name the drawing library uses for its draw modes.
    pub fn library_name(self) -> &'static str {
        match self {
            DrawKind::Polygon => "Polygon",
            DrawKind::Polyline => "Line",
            DrawKind::Circle => "Circle",
        }
    }

    /// Inverse of [`DrawKind::library_name`]. Draw modes we never start
    /// (markers, rectangles) give `None`.
    pub fn from_library_name(name: &str) -> Option<Self> {
        match name {
            "Polygon" => Some(DrawKind::Polygon),
            "Line" => Some(DrawKind::Polyline),
            "Circle" => Some(DrawKind::Circle),
            _ => None,
        }
    }

    pub fn options(self) -> DrawOptions {
        DrawOptions {
            snappable: true,
            allow_self_intersection: self != DrawKind::Polygon,
        }
    }

    pub fn tool(self) -> Tool {
        match self {
            DrawKind::Polygon => Tool::DrawPolygon,
            DrawKind::Polyline => Tool::DrawPolyline,
            DrawKind::Circle => Tool::DrawCircle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawOptions {
    pub snappable: bool,
    pub allow_self_intersection: bool,
}

/// Options for the library's per-shape edit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditOptions {
    pub allow_self_intersection: bool,
}

/// Toggle controls that switch modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tool {
    AddMarker,
    DrawPolygon,
    DrawPolyline,
    DrawCircle,
}

impl Tool {
    pub const ALL: [Tool; 4] = [Tool::AddMarker, Tool::DrawPolygon, Tool::DrawPolyline, Tool::DrawCircle];

    pub fn mode(self) -> Mode {
        match self {
            Tool::AddMarker => Mode::AddingMarker,
            Tool::DrawPolygon => Mode::Drawing(DrawKind::Polygon),
            Tool::DrawPolyline => Mode::Drawing(DrawKind::Polyline),
            Tool::DrawCircle => Mode::Drawing(DrawKind::Circle),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Idle,
    AddingMarker,
    Drawing(DrawKind),
}

impl Mode {
    pub fn name(self) -> &'static str {
        match self {
            Mode::Idle => "idle",
            Mode::AddingMarker => "adding-marker",
            Mode::Drawing(DrawKind::Polygon) => "drawing-polygon",
            Mode::Drawing(DrawKind::Polyline) => "drawing-polyline",
            Mode::Drawing(DrawKind::Circle) => "drawing-circle",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    ToolSelected(Tool),
    KeyPressed(String),
    MapClicked(LatLng),
    MarkerMoved { id: ShapeId, position: LatLng },
    MarkerDoubleClicked(ShapeId),
    /// The library left its draw mode for this kind on its own, typically
    /// after a shape was finished.
    DrawEnded(DrawKind),
    ShapeCreated { id: ShapeId, geometry: ShapeGeometry },
    ShapeEdited { id: ShapeId, geometry: ShapeGeometry },
    ShapeRemoved(ShapeId),
    GlobalEditModeToggled,
    ClearAll,
    CopyRequested,
    DownloadRequested,
}

impl Event {
    /// Event for a page control, by its name.
    pub fn from_control(name: &str) -> Result<Self> {
        match name {
            "add-marker" => Ok(Event::ToolSelected(Tool::AddMarker)),
            "draw-polygon" => Ok(Event::ToolSelected(Tool::DrawPolygon)),
            "draw-polyline" => Ok(Event::ToolSelected(Tool::DrawPolyline)),
            "draw-circle" => Ok(Event::ToolSelected(Tool::DrawCircle)),
            "clear-all" => Ok(Event::ClearAll),
            "copy" => Ok(Event::CopyRequested),
            "download" => Ok(Event::DownloadRequested),
            other => Err(GeoDrawError::UnknownTool(other.to_string())),
        }
    }
}

pub fn is_cancel_key(key: &str) -> bool {
    matches!(key, "Escape" | "Esc")
}

/// Both viewers, as markup and as the plain text the markup displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedView {
    pub marker_html: String,
    pub marker_text: String,
    pub feature_html: String,
    pub feature_text: String,
}

/// Side effects requested by the controller.
///
/// Map-side effects are handed to the JS host, page-side ones
/// (see [`Effect::is_page_side`]) are applied by the session itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "camelCase")]
pub enum Effect {
    InitMap(MapViewConfig),
    AddControls(LibraryControls),
    EnableDraw { shape: &'static str, options: DrawOptions },
    DisableDraw { shape: &'static str },
    /// Create a draggable marker and hook its drag-end, double-click and removal.
    PlaceMarker { id: ShapeId, position: LatLng, draggable: bool },
    /// Hook drag-end, double-click and removal on a library-created marker.
    WatchMarker { id: ShapeId },
    /// Hook the library's edit and removal notifications on a shape.
    WatchShape { id: ShapeId },
    EnableEditing { id: ShapeId, options: EditOptions },
    ApplyStyle { id: ShapeId, style: StrokeStyle },
    RemoveLayer { id: ShapeId },
    ClearLayers,
    InvalidateSize {
        #[serde(rename = "delayMs")]
        delay_ms: u32,
    },
    SetToolActive { tool: Tool, active: bool },
    Render(RenderedView),
    CopyToClipboard { text: String },
    Download { text: String, filename: String, mime: &'static str },
}

impl Effect {
    pub fn is_page_side(&self) -> bool {
        matches!(
            self,
            Effect::SetToolActive { .. }
                | Effect::Render(_)
                | Effect::CopyToClipboard { .. }
                | Effect::Download { .. }
        )
    }
}

/// Everything that changes over a session.
pub struct AppState {
    pub mode: Mode,
    pub store: GeometryStore,
    next_placed: u64,
    feature_text: String,
}

impl AppState {
    pub fn new(store: GeometryStore) -> Self {
        AppState {
            mode: Mode::Idle,
            store,
            next_placed: 1,
            feature_text: String::new(),
        }
    }
}

pub struct Controller {
    state: AppState,
    config: SessionConfig,
}

impl Controller {
    pub fn new(config: SessionConfig) -> Self {
        Controller::with_store(config, GeometryStore::new())
    }

    pub fn with_store(config: SessionConfig, store: GeometryStore) -> Self {
        Controller { state: AppState::new(store), config }
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn store(&self) -> &GeometryStore {
        &self.state.store
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Plain text of the feature viewer as last rendered.
    pub fn feature_text(&self) -> &str {
        &self.state.feature_text
    }

    /// Startup effects: map, library toolbar, first render, deferred resize.
    pub fn boot(&mut self) -> Vec<Effect> {
        vec![
            Effect::InitMap(self.config.map.clone()),
            Effect::AddControls(self.config.controls.clone()),
            self.render(),
            Effect::InvalidateSize { delay_ms: self.config.invalidate_size_delay_ms },
        ]
    }

    pub fn dispatch(&mut self, event: Event) -> Vec<Effect> {
        let mut effects = Vec::new();
        match event {
            Event::ToolSelected(tool) => self.on_tool_selected(tool, &mut effects),
            Event::KeyPressed(key) => {
                if is_cancel_key(&key) {
                    self.switch_mode(Mode::Idle, &mut effects);
                }
            }
            Event::MapClicked(at) => self.on_map_clicked(at, &mut effects),
            Event::MarkerMoved { id, position } => {
                let geometry = ShapeGeometry::Marker(position.to_point());
                if self.state.store.update_geometry(id, geometry) {
                    effects.push(self.render());
                }
            }
            Event::MarkerDoubleClicked(id) => {
                if self.state.store.remove(id).is_some() {
                    effects.push(Effect::RemoveLayer { id });
                    effects.push(self.render());
                }
            }
            Event::DrawEnded(kind) => {
                // The library already switched itself off, so only our side changes
                if self.state.mode == Mode::Drawing(kind) {
                    self.state.mode = Mode::Idle;
                    effects.push(Effect::SetToolActive { tool: kind.tool(), active: false });
                }
            }
            Event::ShapeCreated { id, geometry } => self.on_shape_created(id, geometry, &mut effects),
            Event::ShapeEdited { id, geometry } => {
                if self.state.store.update_geometry(id, geometry) {
                    effects.push(self.render());
                }
            }
            Event::ShapeRemoved(id) => {
                // The library already took the layer off the map
                if self.state.store.remove(id).is_some() {
                    effects.push(self.render());
                }
            }
            Event::GlobalEditModeToggled => effects.push(self.render()),
            Event::ClearAll => {
                self.state.store.clear();
                effects.push(Effect::ClearLayers);
                effects.push(self.render());
            }
            Event::CopyRequested => effects.push(Effect::CopyToClipboard {
                text: self.state.feature_text.clone(),
            }),
            Event::DownloadRequested => effects.push(Effect::Download {
                text: self.state.feature_text.clone(),
                filename: self.config.download_filename.clone(),
                mime: DOWNLOAD_MIME,
            }),
        }
        effects
    }

    fn on_tool_selected(&mut self, tool: Tool, effects: &mut Vec<Effect>) {
        let target = if self.state.mode == tool.mode() { Mode::Idle } else { tool.mode() };
        self.switch_mode(target, effects);
    }

    // Leave the current mode completely before entering the next one, so at
    // most one draw mode is ever active.
    fn switch_mode(&mut self, target: Mode, effects: &mut Vec<Effect>) {
        match self.state.mode {
            Mode::Idle => {}
            Mode::AddingMarker => effects.push(Effect::SetToolActive { tool: Tool::AddMarker, active: false }),
            Mode::Drawing(kind) => {
                effects.push(Effect::DisableDraw { shape: kind.library_name() });
                effects.push(Effect::SetToolActive { tool: kind.tool(), active: false });
            }
        }
        self.state.mode = Mode::Idle;

        match target {
            Mode::Idle => {}
            Mode::AddingMarker => effects.push(Effect::SetToolActive { tool: Tool::AddMarker, active: true }),
            Mode::Drawing(kind) => {
                effects.push(Effect::EnableDraw { shape: kind.library_name(), options: kind.options() });
                effects.push(Effect::SetToolActive { tool: kind.tool(), active: true });
            }
        }
        self.state.mode = target;
    }

    fn on_map_clicked(&mut self, at: LatLng, effects: &mut Vec<Effect>) {
        if self.state.mode != Mode::AddingMarker {
            return;
        }
        let id = ShapeId::Placed(self.state.next_placed);
        self.state.next_placed += 1;
        self.state.store.add(Shape::marker(id, at));
        effects.push(Effect::PlaceMarker { id, position: at, draggable: true });
        effects.push(self.render());
    }

    fn on_shape_created(&mut self, id: ShapeId, geometry: ShapeGeometry, effects: &mut Vec<Effect>) {
        let kind = geometry.kind();
        // A replacement of the same kind keeps the layer's existing wiring
        let attach = match self.state.store.add(Shape::new(id, geometry)) {
            Added::New { style } => Some(style),
            Added::Replaced { previous, style } if previous != kind => Some(style),
            Added::Replaced { .. } => None,
        };
        if let Some(style) = attach {
            attach_layer(id, kind, style, effects);
        }
        effects.push(self.render());
    }

    // Rebuild both export views from the store and remember the feature text
    // for copy and download.
    fn render(&mut self) -> Effect {
        let views = ExportViews::from_store(&self.state.store);
        let feature_text = highlight::plain_text(Some(&views.features));
        let view = RenderedView {
            marker_html: highlight::format(Some(&views.markers)),
            marker_text: highlight::plain_text(Some(&views.markers)),
            feature_html: highlight::highlight_text(&feature_text),
            feature_text,
        };
        self.state.feature_text = view.feature_text.clone();
        Effect::Render(view)
    }
}

// Per-kind wiring for a layer the store just started tracking under `kind`.
fn attach_layer(id: ShapeId, kind: ShapeKind, style: Option<ShapeStyle>, effects: &mut Vec<Effect>) {
    match kind {
        ShapeKind::Marker => effects.push(Effect::WatchMarker { id }),
        ShapeKind::Circle => {
            effects.push(Effect::EnableEditing {
                id,
                options: EditOptions { allow_self_intersection: true },
            });
            effects.push(Effect::WatchShape { id });
        }
        ShapeKind::Polygon | ShapeKind::Polyline => {
            if let Some(style) = style {
                effects.push(Effect::ApplyStyle { id, style: style.into() });
            }
            effects.push(Effect::EnableEditing {
                id,
                options: EditOptions { allow_self_intersection: false },
            });
            effects.push(Effect::WatchShape { id });
        }
    }
}
