// JS-facing session object.
//
// The host owns the map and the drawing library. It forwards every user and
// library event here, and applies the map-side effects this object returns.
// Page-side effects (viewers, buttons, clipboard, download) are applied here.

use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::prelude::*;

use crate::config::SessionConfig;
use crate::controller::{Controller, DrawKind, Effect, Event};
use crate::error::{GeoDrawError, Result};
use crate::shape::{LatLng, ShapeId, ShapeReport};
use crate::{console_log, console_warn, dom, export};

#[wasm_bindgen]
pub struct MapSession {
    controller: Controller,
}

fn parse_id(id: &str) -> Result<ShapeId> {
    id.parse()
}

fn parse_report(report: JsValue) -> Result<ShapeReport> {
    Ok(serde_wasm_bindgen::from_value(report)?)
}

#[wasm_bindgen]
impl MapSession {
    /// `config` may be `undefined`/`null` for defaults, or a partial object.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> std::result::Result<MapSession, JsValue> {
        let config: SessionConfig = if config.is_undefined() || config.is_null() {
            SessionConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(GeoDrawError::from)?
        };
        console_log!("Map session created, center {:?} zoom {}", config.map.center, config.map.zoom);
        Ok(MapSession { controller: Controller::new(config) })
    }

    /// Startup effects; call once after construction.
    pub fn boot(&mut self) -> std::result::Result<JsValue, JsValue> {
        let effects = self.controller.boot();
        Ok(self.apply(effects)?)
    }

    /// A page control was pressed (`add-marker`, `draw-polygon`, `copy`, ...).
    pub fn press(&mut self, control: &str) -> std::result::Result<JsValue, JsValue> {
        let event = Event::from_control(control)?;
        Ok(self.run(event)?)
    }

    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&mut self, key: &str) -> std::result::Result<JsValue, JsValue> {
        Ok(self.run(Event::KeyPressed(key.to_string()))?)
    }

    #[wasm_bindgen(js_name = mapClicked)]
    pub fn map_clicked(&mut self, lat: f64, lng: f64) -> std::result::Result<JsValue, JsValue> {
        Ok(self.run(Event::MapClicked(LatLng::new(lat, lng)))?)
    }

    #[wasm_bindgen(js_name = markerMoved)]
    pub fn marker_moved(&mut self, id: &str, lat: f64, lng: f64) -> std::result::Result<JsValue, JsValue> {
        let event = Event::MarkerMoved { id: parse_id(id)?, position: LatLng::new(lat, lng) };
        Ok(self.run(event)?)
    }

    #[wasm_bindgen(js_name = markerDoubleClicked)]
    pub fn marker_double_clicked(&mut self, id: &str) -> std::result::Result<JsValue, JsValue> {
        let event = Event::MarkerDoubleClicked(parse_id(id)?);
        Ok(self.run(event)?)
    }

    /// The library switched its own draw mode off. `shape` is the library's
    /// draw mode name; modes we never start are ignored.
    #[wasm_bindgen(js_name = drawEnded)]
    pub fn draw_ended(&mut self, shape: &str) -> std::result::Result<JsValue, JsValue> {
        match DrawKind::from_library_name(shape) {
            Some(kind) => Ok(self.run(Event::DrawEnded(kind))?),
            None => Ok(self.apply(Vec::new())?),
        }
    }

    /// The drawing library finished a shape. `layer_id` is the library's own
    /// layer id, `report` is `{ shape, geometry, radius? }`.
    #[wasm_bindgen(js_name = shapeCreated)]
    pub fn shape_created(&mut self, layer_id: u32, report: JsValue) -> std::result::Result<JsValue, JsValue> {
        let id = ShapeId::Layer(u64::from(layer_id));
        match parse_report(report).and_then(ShapeReport::into_geometry) {
            Ok(geometry) => Ok(self.run(Event::ShapeCreated { id, geometry })?),
            Err(err) => {
                console_warn!("Ignoring created shape {}: {}", id, err);
                Ok(self.apply(Vec::new())?)
            }
        }
    }

    #[wasm_bindgen(js_name = shapeEdited)]
    pub fn shape_edited(&mut self, id: &str, report: JsValue) -> std::result::Result<JsValue, JsValue> {
        let id = parse_id(id)?;
        match parse_report(report).and_then(ShapeReport::into_geometry) {
            Ok(geometry) => Ok(self.run(Event::ShapeEdited { id, geometry })?),
            Err(err) => {
                console_warn!("Ignoring edit of {}: {}", id, err);
                Ok(self.apply(Vec::new())?)
            }
        }
    }

    #[wasm_bindgen(js_name = shapeRemoved)]
    pub fn shape_removed(&mut self, id: &str) -> std::result::Result<JsValue, JsValue> {
        let event = Event::ShapeRemoved(parse_id(id)?);
        Ok(self.run(event)?)
    }

    #[wasm_bindgen(js_name = globalEditModeToggled)]
    pub fn global_edit_mode_toggled(&mut self) -> std::result::Result<JsValue, JsValue> {
        Ok(self.run(Event::GlobalEditModeToggled)?)
    }

    #[wasm_bindgen(getter)]
    pub fn mode(&self) -> String {
        self.controller.mode().name().to_string()
    }

    #[wasm_bindgen(getter, js_name = shapeCount)]
    pub fn shape_count(&self) -> usize {
        self.controller.store().len()
    }

    #[wasm_bindgen(getter, js_name = featureText)]
    pub fn feature_text(&self) -> String {
        self.controller.feature_text().to_string()
    }
}

impl MapSession {
    fn run(&mut self, event: Event) -> Result<JsValue> {
        let effects = self.controller.dispatch(event);
        self.apply(effects)
    }

    // Apply page-side effects in order and hand the rest back to the host.
    fn apply(&self, effects: Vec<Effect>) -> Result<JsValue> {
        let mut for_host = Vec::new();
        for effect in effects {
            if effect.is_page_side() {
                if let Err(err) = self.apply_page_effect(&effect) {
                    console_warn!("Could not apply {:?}: {}", effect, err);
                }
            } else {
                for_host.push(effect);
            }
        }
        let value = for_host.serialize(&Serializer::json_compatible())?;
        Ok(value)
    }

    fn apply_page_effect(&self, effect: &Effect) -> Result<()> {
        let config = self.controller.config();
        match effect {
            Effect::Render(view) => dom::render_viewers(&config.elements, view),
            Effect::SetToolActive { tool, active } => dom::set_tool_active(&config.elements, *tool, *active),
            Effect::CopyToClipboard { text } => {
                export::copy_to_clipboard(text.clone(), config.flash_duration_ms);
                Ok(())
            }
            Effect::Download { text, filename, mime } => export::download(text, filename, mime),
            _ => Ok(()),
        }
    }
}
