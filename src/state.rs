//! Viewer state
//!
//! One owned struct holds the catalog, the working setlists, the filter
//! criteria and the current selection. Every mutating operation finishes by
//! recomputing the visible set and reconciling the selection before it
//! returns, so callers never observe a half-updated state.

use serde::{Deserialize, Serialize};

use crate::catalog::loader::{decode_records, parse_payload};
use crate::catalog::{CatalogIndex, FilterOptions};
use crate::config::ViewerConfig;
use crate::error::LoadError;
use crate::filter::{visible_dances, FilterCriteria};
use crate::models::{Dance, Formation, RawSetlist, RoleSet, Setlist};
use crate::projection::DanceView;
use crate::roles::{self, RoleTerms};
use crate::selection::Selection;
use crate::setlist::SetlistBook;
use crate::storage::{load_json, save_json, KeyValueStore};

pub const DANCES_RESOURCE: &str = "dances.json";
pub const FORMATIONS_RESOURCE: &str = "formations.json";
pub const ROLES_RESOURCE: &str = "roles.json";
pub const SETLISTS_RESOURCE: &str = "setlists.json";

/// Raw JSON text of each resource; `None` when its fetch failed
#[derive(Clone, Debug, Default)]
pub struct DataPayload {
    pub dances: Option<String>,
    pub formations: Option<String>,
    pub role_sets: Option<String>,
    pub setlists: Option<String>,
}

/// Last successfully loaded data, kept for offline starts
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogCache {
    pub dances: Vec<Dance>,
    pub formations: Vec<Formation>,
    pub role_sets: Vec<RoleSet>,
    pub setlists: Vec<Setlist>,
}

/// What a load produced, for the host's status line
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoadSummary {
    pub dance_count: usize,
    pub formation_count: usize,
    pub role_set_count: usize,
    pub setlist_count: usize,
    /// Resources that failed and were served from the cache
    pub from_cache: Vec<String>,
    /// Resources that failed with nothing cached
    pub missing: Vec<String>,
}

impl LoadSummary {
    fn record_failure(&mut self, err: &LoadError, resource: &str, cached: bool) {
        log::warn!("{}", err);
        if cached {
            self.from_cache.push(resource.to_string());
        } else {
            self.missing.push(resource.to_string());
        }
    }
}

/// Derived state handed to the host after each operation
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ViewerSnapshot {
    pub changed: bool,
    pub visible_ids: Vec<String>,
    pub current_id: Option<String>,
    pub active_setlist_id: Option<String>,
    pub role_set_id: Option<String>,
    pub calling_mode: bool,
}

pub struct ViewerState {
    config: ViewerConfig,
    store: Box<dyn KeyValueStore>,
    catalog: CatalogIndex,
    role_sets: Vec<RoleSet>,
    setlists: SetlistBook,
    criteria: FilterCriteria,
    visible: Vec<String>,
    selection: Selection,
    role_set: Option<String>,
    terms: RoleTerms,
    calling_mode: bool,
}

impl ViewerState {
    pub fn new(config: ViewerConfig, store: Box<dyn KeyValueStore>) -> Self {
        Self {
            config,
            store,
            catalog: CatalogIndex::default(),
            role_sets: Vec::new(),
            setlists: SetlistBook::default(),
            criteria: FilterCriteria::default(),
            visible: Vec::new(),
            selection: Selection::NoSelection,
            role_set: None,
            terms: RoleTerms::neutral(),
            calling_mode: false,
        }
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Populate from the offline cache alone
    ///
    /// Returns false (and leaves the state untouched) if nothing is cached.
    pub fn load_cached(&mut self) -> bool {
        match load_json::<CatalogCache>(self.store.as_ref(), &self.config.storage_keys.catalog_cache) {
            Some(cache) => {
                log::info!("Starting from cached catalog ({} dances)", cache.dances.len());
                self.install(cache);
                true
            }
            None => false,
        }
    }

    /// Populate from freshly fetched resources
    ///
    /// A resource that failed to fetch or parse is replaced by its cached
    /// copy, or by an empty list if nothing is cached.
    pub fn load(&mut self, payload: DataPayload) -> LoadSummary {
        let cache: CatalogCache =
            load_json(self.store.as_ref(), &self.config.storage_keys.catalog_cache).unwrap_or_default();
        let mut summary = LoadSummary::default();
        let mut fresh = false;

        let dances = match parse_payload(DANCES_RESOURCE, payload.dances.as_deref()) {
            Ok(values) => {
                fresh = true;
                decode_records::<Dance>(values)
            }
            Err(e) => {
                summary.record_failure(&e, DANCES_RESOURCE, !cache.dances.is_empty());
                cache.dances
            }
        };

        let formations = match parse_payload(FORMATIONS_RESOURCE, payload.formations.as_deref()) {
            Ok(values) => {
                fresh = true;
                decode_records::<Formation>(values)
            }
            Err(e) => {
                summary.record_failure(&e, FORMATIONS_RESOURCE, !cache.formations.is_empty());
                cache.formations
            }
        };

        let role_sets = match parse_payload(ROLES_RESOURCE, payload.role_sets.as_deref()) {
            Ok(values) => {
                fresh = true;
                decode_records::<RoleSet>(values)
            }
            Err(e) => {
                summary.record_failure(&e, ROLES_RESOURCE, !cache.role_sets.is_empty());
                cache.role_sets
            }
        };

        // Legacy id-list setlists are snapshotted against the catalog being loaded
        let raw_setlists = parse_payload(SETLISTS_RESOURCE, payload.setlists.as_deref())
            .map(decode_records::<RawSetlist>);
        let setlists = match raw_setlists {
            Ok(raw) => {
                fresh = true;
                let index = CatalogIndex::build(dances.clone(), formations.clone());
                raw.into_iter()
                    .map(|r| r.into_setlist(|order, id| index.setlist_item(order, id)))
                    .collect()
            }
            Err(e) => {
                summary.record_failure(&e, SETLISTS_RESOURCE, !cache.setlists.is_empty());
                cache.setlists
            }
        };

        let loaded = CatalogCache {
            dances,
            formations,
            role_sets,
            setlists,
        };

        if fresh {
            if let Err(e) = save_json(
                self.store.as_mut(),
                &self.config.storage_keys.catalog_cache,
                &loaded,
            ) {
                log::warn!("Failed to cache catalog: {}", e);
            }
        }

        self.install(loaded);

        summary.dance_count = self.catalog.dances().len();
        summary.formation_count = self.catalog.formations().len();
        summary.role_set_count = self.role_sets.len();
        summary.setlist_count = self.setlists.working().len();
        log::info!(
            "Loaded {} dances, {} formations, {} role sets, {} setlists",
            summary.dance_count,
            summary.formation_count,
            summary.role_set_count,
            summary.setlist_count
        );
        summary
    }

    /// Rebuild everything from a full data set
    fn install(&mut self, data: CatalogCache) {
        self.catalog = CatalogIndex::build(data.dances, data.formations);
        self.role_sets = data.role_sets;

        if let Some(id) = self.role_set.take() {
            self.set_role_set(Some(id.as_str()));
        } else {
            self.terms = RoleTerms::neutral();
        }

        let previous_active = self.setlists.active_id().map(str::to_string);
        let persisted: Option<Vec<Setlist>> =
            load_json(self.store.as_ref(), &self.config.storage_keys.working_setlists);
        self.setlists = SetlistBook::new(data.setlists, persisted);
        self.setlists.select(previous_active.as_deref());

        self.visible = self.compute_visible();

        // A selection made since the last load wins over the persisted one
        let remembered = match self.selection.dance_id() {
            Some(id) => Some(id.to_string()),
            None => self.read_last_dance(),
        };
        let next = {
            let visible = self.visible_dances();
            Selection::restore(remembered.as_deref(), &visible)
        };
        self.transition(next);
    }

    // ------------------------------------------------------------------
    // Derived state
    // ------------------------------------------------------------------

    fn compute_visible(&self) -> Vec<String> {
        visible_dances(&self.catalog, self.setlists.active(), &self.criteria)
            .into_iter()
            .map(|d| d.id.clone())
            .collect()
    }

    /// Recompute the visible set and reconcile the selection
    fn refresh(&mut self) {
        self.visible = self.compute_visible();
        let next = self.selection.reconcile(&self.visible_dances());
        self.transition(next);
    }

    /// Move to `next`, persisting the dance id when the selection changes
    fn transition(&mut self, next: Selection) {
        if next == self.selection {
            return;
        }
        self.selection = next;
        if let Some(id) = self.selection.dance_id() {
            if let Err(e) = self.store.set(&self.config.storage_keys.last_dance, id) {
                log::warn!("Failed to store last dance: {}", e);
            }
        }
    }

    fn read_last_dance(&self) -> Option<String> {
        match self.store.get(&self.config.storage_keys.last_dance) {
            Ok(id) => id.filter(|id| !id.is_empty()),
            Err(e) => {
                log::warn!("Failed to read last dance: {}", e);
                None
            }
        }
    }

    fn persist_setlists(&mut self) {
        if let Err(e) = save_json(
            self.store.as_mut(),
            &self.config.storage_keys.working_setlists,
            self.setlists.working(),
        ) {
            log::warn!("Failed to store working setlists: {}", e);
        }
    }

    /// Common tail of every setlist edit
    fn setlist_edited(&mut self, changed: bool) -> bool {
        if changed {
            self.persist_setlists();
            self.refresh();
        }
        changed
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn catalog(&self) -> &CatalogIndex {
        &self.catalog
    }

    pub fn role_sets(&self) -> &[RoleSet] {
        &self.role_sets
    }

    /// All working setlists, for the setlist picker
    pub fn setlists(&self) -> &[Setlist] {
        self.setlists.working()
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn role_set_id(&self) -> Option<&str> {
        self.role_set.as_deref()
    }

    pub fn is_calling_mode(&self) -> bool {
        self.calling_mode
    }

    /// The visible set, in display order
    pub fn visible_dances(&self) -> Vec<&Dance> {
        self.visible
            .iter()
            .filter_map(|id| self.catalog.dance(id))
            .collect()
    }

    pub fn current_dance(&self) -> Option<&Dance> {
        self.selection.dance_id().and_then(|id| self.catalog.dance(id))
    }

    pub fn active_setlist(&self) -> Option<&Setlist> {
        self.setlists.active()
    }

    /// Original (unedited) version of the active setlist
    pub fn active_setlist_original(&self) -> Option<&Setlist> {
        self.setlists.active_original()
    }

    pub fn filter_options(&self) -> FilterOptions {
        self.catalog.filter_options()
    }

    pub fn current_view(&self) -> DanceView {
        match self.current_dance() {
            Some(dance) => DanceView::build(dance, &self.catalog, &self.terms),
            None => DanceView::empty(),
        }
    }

    pub fn render_text(&self, text: &str) -> String {
        roles::render_text(text, &self.terms)
    }

    pub fn render_markup(&self, markup: &str) -> String {
        roles::render_markup(markup, &self.terms)
    }

    /// Active setlist as one dance id per line
    pub fn setlist_text(&self) -> String {
        self.setlists.to_text()
    }

    pub fn snapshot(&self, changed: bool) -> ViewerSnapshot {
        ViewerSnapshot {
            changed,
            visible_ids: self.visible.clone(),
            current_id: self.selection.dance_id().map(str::to_string),
            active_setlist_id: self.setlists.active_id().map(str::to_string),
            role_set_id: self.role_set.clone(),
            calling_mode: self.calling_mode,
        }
    }

    // ------------------------------------------------------------------
    // Filtering and selection
    // ------------------------------------------------------------------

    pub fn apply_filters(&mut self, criteria: FilterCriteria) -> bool {
        let changed = criteria != self.criteria;
        self.criteria = criteria;
        self.refresh();
        changed
    }

    /// Reset every filter criterion; the active setlist is kept
    pub fn clear_filters(&mut self) -> bool {
        self.apply_filters(FilterCriteria::default())
    }

    /// Pick a dance from the visible set; unknown ids are ignored
    pub fn select_dance(&mut self, id: &str) -> bool {
        match Selection::pick(id, &self.visible_dances()) {
            Some(next) => {
                let changed = next != self.selection;
                self.transition(next);
                changed
            }
            None => {
                log::debug!("Ignoring pick of '{}': not in the visible set", id);
                false
            }
        }
    }

    /// Dances that step navigation walks through
    ///
    /// The active setlist's dances when it has any, otherwise the visible set.
    fn step_sequence(&self) -> Vec<&str> {
        match self.setlists.active().filter(|s| !s.items.is_empty()) {
            Some(setlist) => {
                let mut sequence: Vec<&str> = Vec::new();
                for id in setlist.dance_ids() {
                    if self.catalog.dance(id).is_some() && !sequence.contains(&id) {
                        sequence.push(id);
                    }
                }
                sequence
            }
            None => self.visible.iter().map(String::as_str).collect(),
        }
    }

    /// Move `delta` places through the step sequence, wrapping around
    pub fn step(&mut self, delta: isize) -> bool {
        let next = self.selection.step(delta, &self.step_sequence());
        match next {
            Some(next) => {
                let changed = next != self.selection;
                self.transition(next);
                changed
            }
            None => false,
        }
    }

    pub fn set_role_set(&mut self, id: Option<&str>) -> bool {
        let role_set = id.and_then(|id| self.role_sets.iter().find(|r| r.id == id));
        if id.is_some() && role_set.is_none() {
            log::debug!("Unknown role set {:?}, using neutral terms", id);
        }

        let next_id = role_set.map(|r| r.id.clone());
        let changed = next_id != self.role_set;
        self.terms = RoleTerms::from_role_set(role_set);
        self.role_set = next_id;
        changed
    }

    pub fn set_calling_mode(&mut self, on: bool) -> bool {
        let changed = on != self.calling_mode;
        self.calling_mode = on;
        changed
    }

    pub fn toggle_calling_mode(&mut self) -> bool {
        self.set_calling_mode(!self.calling_mode)
    }

    // ------------------------------------------------------------------
    // Setlists
    // ------------------------------------------------------------------

    /// Choose the active setlist; `None` or an unknown id shows all dances
    pub fn select_setlist(&mut self, id: Option<&str>) -> bool {
        let changed = self.setlists.select(id);
        self.refresh();
        changed
    }

    pub fn add_current_to_setlist(&mut self) -> bool {
        let changed = match self.current_dance() {
            Some(dance) => {
                let form = self.catalog.formation_label(dance).unwrap_or_default();
                let dance = dance.clone();
                self.setlists.add(&dance, &form)
            }
            None => false,
        };
        self.setlist_edited(changed)
    }

    pub fn remove_setlist_item(&mut self, index: usize) -> bool {
        let changed = self.setlists.remove(index);
        self.setlist_edited(changed)
    }

    pub fn move_setlist_item(&mut self, index: usize, delta: isize) -> bool {
        let changed = self.setlists.move_item(index, delta);
        self.setlist_edited(changed)
    }

    pub fn reset_setlist(&mut self) -> bool {
        let changed = self.setlists.reset_to_original();
        self.setlist_edited(changed)
    }

    /// Replace the active setlist from one dance id per line
    pub fn apply_setlist_text(&mut self, text: &str) -> bool {
        let catalog = &self.catalog;
        let changed = self
            .setlists
            .apply_text(text, |order, id| catalog.setlist_item(order, id));
        self.setlist_edited(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    const DANCES: &str = r#"[
        {"id": "a", "title": "Alpha", "formationId": "f1", "structure": {"barsPerPart": 32, "parts": ["A", "B"]}, "musicType": "reel"},
        {"id": "b", "title": "Bravo", "formationId": "f2", "structure": {"barsPerPart": 48, "parts": ["A", "B", "C"]}, "musicType": "jig"}
    ]"#;

    fn payload() -> DataPayload {
        DataPayload {
            dances: Some(DANCES.to_string()),
            formations: Some(r#"[{"id": "f1", "name": "Circle"}, {"id": "f2", "name": "Longways"}]"#.to_string()),
            role_sets: Some(r#"[{"id": "lr", "label": "Larks", "mapping": {"P1": "Lark", "P2": "Robin"}}]"#.to_string()),
            setlists: Some(r#"[{"id": "s1", "name": "Evening", "danceIds": ["b"]}]"#.to_string()),
        }
    }

    fn loaded() -> ViewerState {
        let mut state = ViewerState::new(ViewerConfig::default(), Box::new(MemoryStore::new()));
        state.load(payload());
        state
    }

    #[test]
    fn test_load_selects_first_visible() {
        let state = loaded();
        assert_eq!(state.selection().dance_id(), Some("a"));
        assert_eq!(
            state.store().get("ceilidh_last_dance_id").unwrap().as_deref(),
            Some("a")
        );
    }

    #[test]
    fn test_legacy_setlist_is_snapshotted_at_load() {
        let state = loaded();
        let item = &state.setlists()[0].items[0];
        assert_eq!(item.name, "Bravo");
        assert_eq!(item.form, "Longways");
        assert_eq!(item.bars, "48");
    }

    #[test]
    fn test_set_role_set_unknown_is_neutral() {
        let mut state = loaded();
        assert!(state.set_role_set(Some("lr")));
        assert_eq!(state.render_text("[P1]"), "Lark");

        assert!(state.set_role_set(Some("nope")));
        assert_eq!(state.role_set_id(), None);
        assert_eq!(state.render_text("[P1]"), "Person 1");
    }

    #[test]
    fn test_calling_mode_toggle() {
        let mut state = loaded();
        assert!(state.toggle_calling_mode());
        assert!(state.is_calling_mode());
        assert!(!state.set_calling_mode(true));
    }
}
