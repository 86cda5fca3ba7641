//! `CeilidhViewer`: the JavaScript handle onto [`ViewerState`]
//!
//! Mutating methods return a [`ViewerSnapshot`](crate::state::ViewerSnapshot)
//! so the page can re-render from one object without further calls.

use wasm_bindgen::prelude::*;

use super::helpers::{
    deserialize_or_default, serialize, validate_delta, validate_index, validation_error,
};
use crate::config::ViewerConfig;
use crate::filter::FilterCriteria;
use crate::state::{DataPayload, ViewerState};
use crate::storage::BrowserStorage;

#[wasm_bindgen]
pub struct CeilidhViewer {
    state: ViewerState,
}

impl CeilidhViewer {
    fn snapshot(&self, changed: bool) -> Result<JsValue, JsValue> {
        serialize(&self.state.snapshot(changed), "Failed to serialize viewer snapshot")
    }
}

#[wasm_bindgen]
impl CeilidhViewer {
    /// Create a viewer backed by `localStorage`
    ///
    /// `config` is an optional `ViewerConfig` object.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<CeilidhViewer, JsValue> {
        let config: ViewerConfig = deserialize_or_default(config, "Invalid viewer config")?;
        config.apply_log_level();
        log::debug!("Creating viewer with config {:?}", config);

        Ok(CeilidhViewer {
            state: ViewerState::new(config, Box::new(BrowserStorage)),
        })
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Populate from the offline cache; returns whether anything was cached
    #[wasm_bindgen(js_name = loadCached)]
    pub fn load_cached(&mut self) -> bool {
        self.state.load_cached()
    }

    /// Populate from fetched JSON text; pass `undefined` for a failed fetch
    #[wasm_bindgen(js_name = loadData)]
    pub fn load_data(
        &mut self,
        dances: Option<String>,
        formations: Option<String>,
        role_sets: Option<String>,
        setlists: Option<String>,
    ) -> Result<JsValue, JsValue> {
        let summary = self.state.load(DataPayload {
            dances,
            formations,
            role_sets,
            setlists,
        });
        serialize(&summary, "Failed to serialize load summary")
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    #[wasm_bindgen(js_name = getVisibleDances)]
    pub fn get_visible_dances(&self) -> Result<JsValue, JsValue> {
        serialize(&self.state.visible_dances(), "Failed to serialize visible dances")
    }

    #[wasm_bindgen(js_name = getCurrentDance)]
    pub fn get_current_dance(&self) -> Result<JsValue, JsValue> {
        serialize(&self.state.current_dance(), "Failed to serialize current dance")
    }

    #[wasm_bindgen(js_name = getActiveSetlist)]
    pub fn get_active_setlist(&self) -> Result<JsValue, JsValue> {
        serialize(&self.state.active_setlist(), "Failed to serialize active setlist")
    }

    #[wasm_bindgen(js_name = getSnapshot)]
    pub fn get_snapshot(&self) -> Result<JsValue, JsValue> {
        self.snapshot(false)
    }

    #[wasm_bindgen(js_name = currentView)]
    pub fn current_view(&self) -> Result<JsValue, JsValue> {
        serialize(&self.state.current_view(), "Failed to serialize dance view")
    }

    #[wasm_bindgen(js_name = filterOptions)]
    pub fn filter_options(&self) -> Result<JsValue, JsValue> {
        serialize(&self.state.filter_options(), "Failed to serialize filter options")
    }

    #[wasm_bindgen(js_name = roleSets)]
    pub fn role_sets(&self) -> Result<JsValue, JsValue> {
        serialize(&self.state.role_sets(), "Failed to serialize role sets")
    }

    #[wasm_bindgen(js_name = setlists)]
    pub fn setlists(&self) -> Result<JsValue, JsValue> {
        serialize(&self.state.setlists(), "Failed to serialize setlists")
    }

    // ------------------------------------------------------------------
    // Filtering and selection
    // ------------------------------------------------------------------

    /// Apply a `FilterCriteria` object; blank fields are no criterion
    #[wasm_bindgen(js_name = applyFilters)]
    pub fn apply_filters(&mut self, criteria: JsValue) -> Result<JsValue, JsValue> {
        let criteria: FilterCriteria = deserialize_or_default(criteria, "Invalid filter criteria")?;
        let changed = self.state.apply_filters(criteria);
        self.snapshot(changed)
    }

    #[wasm_bindgen(js_name = clearFilters)]
    pub fn clear_filters(&mut self) -> Result<JsValue, JsValue> {
        let changed = self.state.clear_filters();
        self.snapshot(changed)
    }

    #[wasm_bindgen(js_name = selectDance)]
    pub fn select_dance(&mut self, id: &str) -> Result<JsValue, JsValue> {
        let changed = self.state.select_dance(id);
        self.snapshot(changed)
    }

    pub fn step(&mut self, delta: f64) -> Result<JsValue, JsValue> {
        let delta = validate_delta(delta, "Step").map_err(validation_error)?;
        let changed = self.state.step(delta);
        self.snapshot(changed)
    }

    #[wasm_bindgen(js_name = selectSetlist)]
    pub fn select_setlist(&mut self, id: Option<String>) -> Result<JsValue, JsValue> {
        let changed = self.state.select_setlist(id.as_deref());
        self.snapshot(changed)
    }

    // ------------------------------------------------------------------
    // Setlist editing
    // ------------------------------------------------------------------

    #[wasm_bindgen(js_name = addCurrentToSetlist)]
    pub fn add_current_to_setlist(&mut self) -> Result<JsValue, JsValue> {
        let changed = self.state.add_current_to_setlist();
        self.snapshot(changed)
    }

    #[wasm_bindgen(js_name = removeSetlistItem)]
    pub fn remove_setlist_item(&mut self, index: f64) -> Result<JsValue, JsValue> {
        let index = validate_index(index, "Setlist item").map_err(validation_error)?;
        let changed = self.state.remove_setlist_item(index);
        self.snapshot(changed)
    }

    #[wasm_bindgen(js_name = moveSetlistItem)]
    pub fn move_setlist_item(&mut self, index: f64, delta: f64) -> Result<JsValue, JsValue> {
        let index = validate_index(index, "Setlist item").map_err(validation_error)?;
        let delta = validate_delta(delta, "Setlist move").map_err(validation_error)?;
        let changed = self.state.move_setlist_item(index, delta);
        self.snapshot(changed)
    }

    #[wasm_bindgen(js_name = resetSetlist)]
    pub fn reset_setlist(&mut self) -> Result<JsValue, JsValue> {
        let changed = self.state.reset_setlist();
        self.snapshot(changed)
    }

    #[wasm_bindgen(js_name = setlistText)]
    pub fn setlist_text(&self) -> String {
        self.state.setlist_text()
    }

    #[wasm_bindgen(js_name = applySetlistText)]
    pub fn apply_setlist_text(&mut self, text: &str) -> Result<JsValue, JsValue> {
        let changed = self.state.apply_setlist_text(text);
        self.snapshot(changed)
    }

    // ------------------------------------------------------------------
    // Roles and display
    // ------------------------------------------------------------------

    #[wasm_bindgen(js_name = setRoleSet)]
    pub fn set_role_set(&mut self, id: Option<String>) -> Result<JsValue, JsValue> {
        let changed = self.state.set_role_set(id.as_deref());
        self.snapshot(changed)
    }

    #[wasm_bindgen(js_name = renderText)]
    pub fn render_text(&self, text: &str) -> String {
        self.state.render_text(text)
    }

    #[wasm_bindgen(js_name = renderMarkup)]
    pub fn render_markup(&self, html: &str) -> String {
        self.state.render_markup(html)
    }

    #[wasm_bindgen(js_name = setCallingMode)]
    pub fn set_calling_mode(&mut self, on: bool) -> Result<JsValue, JsValue> {
        let changed = self.state.set_calling_mode(on);
        self.snapshot(changed)
    }

    #[wasm_bindgen(js_name = toggleCallingMode)]
    pub fn toggle_calling_mode(&mut self) -> Result<JsValue, JsValue> {
        let changed = self.state.toggle_calling_mode();
        self.snapshot(changed)
    }

    #[wasm_bindgen(js_name = isCallingMode)]
    pub fn is_calling_mode(&self) -> bool {
        self.state.is_calling_mode()
    }
}
