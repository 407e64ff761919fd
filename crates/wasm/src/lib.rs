use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::mpsc::Receiver;

use chromovis_core::source::das::parse_das_features;
use chromovis_core::{ChromosomeView, SelectionRegistry, SelectorEvent, ViewConfig, ViewState};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// One page's worth of chromosome widgets sharing a selection registry.
struct Scope {
    registry: SelectionRegistry,
    /// Present only while the host is watching registry events.
    events: Option<Receiver<SelectorEvent>>,
    views: HashMap<String, ChromosomeView>,
}

impl Scope {
    fn new() -> Self {
        Self {
            registry: SelectionRegistry::new(),
            events: None,
            views: HashMap::new(),
        }
    }

    fn view(&mut self, id: &str) -> Result<&mut ChromosomeView, JsError> {
        self.views
            .get_mut(id)
            .ok_or_else(|| JsError::new(&format!("unknown view: {id}")))
    }
}

thread_local! {
    static SCOPE: RefCell<Scope> = RefCell::new(Scope::new());
}

fn with_scope<T>(f: impl FnOnce(&mut Scope) -> Result<T, JsError>) -> Result<T, JsError> {
    SCOPE.with(|scope| f(&mut scope.borrow_mut()))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&e.to_string()))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClickResult {
    start_bp: u64,
    end_bp: u64,
    selector: Option<u64>,
}

#[derive(Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
enum EventJson {
    Updated(Vec<chromovis_core::SelectorSnapshot>),
    Deleted(Vec<u64>),
}

/// Create a view from its JSON configuration. Replaces any view with the
/// same id.
#[wasm_bindgen]
pub fn create_view(config_json: &str) -> Result<(), JsError> {
    let config = ViewConfig::from_json(config_json).map_err(|e| JsError::new(&e.to_string()))?;
    with_scope(|scope| {
        let id = config.id.clone();
        let view = ChromosomeView::new(config, scope.registry.clone())
            .map_err(|e| JsError::new(&e.to_string()))?;
        scope.views.insert(id, view);
        Ok(())
    })
}

#[wasm_bindgen]
pub fn destroy_view(id: &str) -> Result<(), JsError> {
    with_scope(|scope| {
        if let Some(mut view) = scope.views.remove(id) {
            view.teardown();
        }
        Ok(())
    })
}

/// Report the measured width of the view's container.
#[wasm_bindgen]
pub fn resize_view(id: &str, container_width: f64) -> Result<(), JsError> {
    with_scope(|scope| {
        scope.view(id)?.resize(container_width);
        Ok(())
    })
}

/// Load a DAS features response fetched by the host. Returns the view's
/// state afterwards: `rendered` or `error`.
#[wasm_bindgen]
pub fn load_segment(id: &str, das_json: &[u8]) -> Result<String, JsError> {
    with_scope(|scope| {
        let view = scope.view(id)?;
        let ticket = view.begin_load().map_err(|e| JsError::new(&e.to_string()))?;
        view.complete_load(ticket, parse_das_features(das_json));
        Ok(match view.state() {
            ViewState::Rendered => "rendered",
            _ => "error",
        }
        .to_string())
    })
}

#[wasm_bindgen]
pub fn hover_band(id: &str, band_index: usize) -> Result<(), JsError> {
    with_scope(|scope| {
        scope.view(id)?.hover(band_index);
        Ok(())
    })
}

#[wasm_bindgen]
pub fn mouse_out(id: &str) -> Result<(), JsError> {
    with_scope(|scope| {
        scope.view(id)?.mouse_out();
        Ok(())
    })
}

/// Click a band. Returns the clicked extent and the new selector id, or
/// `null` when the index names no band.
#[wasm_bindgen]
pub fn click_band(id: &str, band_index: usize) -> Result<String, JsError> {
    with_scope(|scope| {
        let clicked = scope.view(id)?.click(band_index).map(|c| ClickResult {
            start_bp: c.start_bp,
            end_bp: c.end_bp,
            selector: c.created.map(|s| s.borrow().id()),
        });
        to_json(&clicked)
    })
}

#[wasm_bindgen]
pub fn drag_selector(id: &str, selector: u64, px0: f64, px1: f64) -> Result<String, JsError> {
    with_scope(|scope| {
        let snapshot = scope
            .view(id)?
            .drag_selector(selector, px0, px1)
            .map_err(|e| JsError::new(&e.to_string()))?;
        to_json(&snapshot)
    })
}

#[wasm_bindgen]
pub fn delete_selector(id: &str, selector: u64) -> Result<bool, JsError> {
    with_scope(|scope| {
        let view = scope.view(id)?;
        let sel = view
            .selector(selector)
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(view.delete_selector(&sel))
    })
}

/// Remove every selector in the scope and let each view drop its handles.
#[wasm_bindgen]
pub fn clear_selectors() -> Result<(), JsError> {
    with_scope(|scope| {
        scope.registry.clear();
        for view in scope.views.values_mut() {
            view.process_events();
        }
        Ok(())
    })
}

/// All selectors in the scope, in creation order.
#[wasm_bindgen]
pub fn list_selectors() -> Result<String, JsError> {
    with_scope(|scope| to_json(&scope.registry.snapshots()))
}

/// Start or stop queueing registry notifications for [`take_events`].
/// Stopping discards anything not yet taken.
#[wasm_bindgen]
pub fn watch_events(enabled: bool) -> Result<(), JsError> {
    with_scope(|scope| {
        scope.events = enabled.then(|| scope.registry.subscribe());
        Ok(())
    })
}

/// Registry notifications since the last call. Empty unless watching.
#[wasm_bindgen]
pub fn take_events() -> Result<String, JsError> {
    with_scope(|scope| {
        let Some(rx) = &scope.events else {
            return to_json(&Vec::<EventJson>::new());
        };
        let events: Vec<EventJson> = rx
            .try_iter()
            .map(|event| match event {
                SelectorEvent::Updated(list) => EventJson::Updated(list),
                SelectorEvent::Deleted(removed) => {
                    EventJson::Deleted(removed.iter().map(|s| s.borrow().id()).collect())
                }
            })
            .collect();
        to_json(&events)
    })
}

/// Render a view, returning render commands as JSON.
#[wasm_bindgen]
pub fn render_view(id: &str) -> Result<String, JsError> {
    with_scope(|scope| to_json(&scope.view(id)?.render()))
}

#[wasm_bindgen]
pub fn render_view_svg(id: &str) -> Result<String, JsError> {
    with_scope(|scope| {
        let view = scope.view(id)?;
        Ok(chromovis_core::svg::render_svg(
            &view.render(),
            view.canvas_width(),
            view.canvas_height(),
        ))
    })
}
