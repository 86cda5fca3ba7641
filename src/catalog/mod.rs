//! Catalog index
//!
//! Lookup structures over the loaded dances and formations, and formation
//! resolution for dances that only carry a free-text formation name.

pub mod loader;
pub mod options;

use std::collections::HashMap;

use crate::models::{Dance, Formation, SetlistItem};

pub use options::FilterOptions;

/// One way of finding a dance's formation
///
/// Strategies are tried in the order of [`FORMATION_STRATEGIES`]; the first
/// one that yields a formation wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormationStrategy {
    /// `dance.formation_id` looked up directly
    ById,
    /// Normalized `formation_name` equals a normalized formation name
    ExactName,
    /// Normalized names contain one another, in either direction
    NameContains,
}

pub const FORMATION_STRATEGIES: [FormationStrategy; 3] = [
    FormationStrategy::ById,
    FormationStrategy::ExactName,
    FormationStrategy::NameContains,
];

/// Normalize a formation name for fuzzy matching
///
/// Lowercases, turns en/em dashes into hyphens, collapses every run of
/// characters outside `[a-z0-9]` into one space and trims.
pub fn normalised_formation_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_space = false;

    for ch in name.chars().flat_map(char::to_lowercase) {
        let ch = match ch {
            '\u{2013}' | '\u{2014}' => '-',
            other => other,
        };
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        } else {
            pending_space = true;
        }
    }

    out
}

/// Id-keyed view over the catalog
///
/// Duplicate ids are resolved last-write-wins: the later record replaces the
/// earlier one in place, so listing order follows first appearance.
#[derive(Clone, Debug, Default)]
pub struct CatalogIndex {
    dances: Vec<Dance>,
    formations: Vec<Formation>,
    /// Normalized formation names, parallel to `formations`
    formation_keys: Vec<String>,
    dance_by_id: HashMap<String, usize>,
    formation_by_id: HashMap<String, usize>,
}

impl CatalogIndex {
    /// Build the index from loaded arrays
    pub fn build(dances: Vec<Dance>, formations: Vec<Formation>) -> Self {
        let mut index = Self::default();

        for dance in dances {
            if dance.id.is_empty() {
                continue;
            }
            match index.dance_by_id.get(&dance.id) {
                Some(&slot) => {
                    log::debug!("Duplicate dance id '{}', keeping the later record", dance.id);
                    index.dances[slot] = dance;
                }
                None => {
                    index.dance_by_id.insert(dance.id.clone(), index.dances.len());
                    index.dances.push(dance);
                }
            }
        }

        for formation in formations {
            if formation.id.is_empty() {
                continue;
            }
            let key = normalised_formation_name(formation.display_name());
            match index.formation_by_id.get(&formation.id) {
                Some(&slot) => {
                    log::debug!(
                        "Duplicate formation id '{}', keeping the later record",
                        formation.id
                    );
                    index.formations[slot] = formation;
                    index.formation_keys[slot] = key;
                }
                None => {
                    index
                        .formation_by_id
                        .insert(formation.id.clone(), index.formations.len());
                    index.formations.push(formation);
                    index.formation_keys.push(key);
                }
            }
        }

        index
    }

    pub fn dances(&self) -> &[Dance] {
        &self.dances
    }

    pub fn formations(&self) -> &[Formation] {
        &self.formations
    }

    pub fn is_empty(&self) -> bool {
        self.dances.is_empty()
    }

    pub fn dance(&self, id: &str) -> Option<&Dance> {
        self.dance_by_id.get(id).map(|&slot| &self.dances[slot])
    }

    pub fn formation(&self, id: &str) -> Option<&Formation> {
        self.formation_by_id.get(id).map(|&slot| &self.formations[slot])
    }

    /// Resolve a dance's formation with the default strategy order
    pub fn resolve_formation(&self, dance: &Dance) -> Option<&Formation> {
        self.resolve_formation_with(dance, &FORMATION_STRATEGIES)
    }

    /// Resolve a dance's formation trying `strategies` in order
    pub fn resolve_formation_with(
        &self,
        dance: &Dance,
        strategies: &[FormationStrategy],
    ) -> Option<&Formation> {
        strategies
            .iter()
            .find_map(|strategy| self.apply_strategy(*strategy, dance))
    }

    fn apply_strategy(&self, strategy: FormationStrategy, dance: &Dance) -> Option<&Formation> {
        match strategy {
            FormationStrategy::ById => dance
                .formation_id
                .as_deref()
                .and_then(|id| self.formation(id)),
            FormationStrategy::ExactName => {
                let wanted = self.wanted_name(dance)?;
                self.formation_keys
                    .iter()
                    .position(|key| *key == wanted)
                    .map(|slot| &self.formations[slot])
            }
            FormationStrategy::NameContains => {
                let wanted = self.wanted_name(dance)?;
                self.formation_keys
                    .iter()
                    .position(|key| {
                        !key.is_empty() && (key.contains(&wanted) || wanted.contains(key.as_str()))
                    })
                    .map(|slot| &self.formations[slot])
            }
        }
    }

    fn wanted_name(&self, dance: &Dance) -> Option<String> {
        let wanted = normalised_formation_name(dance.formation_name.as_deref()?);
        if wanted.is_empty() {
            None
        } else {
            Some(wanted)
        }
    }

    /// Effective formation id: the resolved formation's id
    pub fn formation_id_of(&self, dance: &Dance) -> Option<&str> {
        self.resolve_formation(dance).map(|f| f.id.as_str())
    }

    /// Label for display: resolved formation name, else the raw id, else the free text
    pub fn formation_label(&self, dance: &Dance) -> Option<String> {
        if let Some(formation) = self.resolve_formation(dance) {
            return Some(formation.display_name().to_string());
        }
        dance
            .formation_id
            .clone()
            .or_else(|| dance.formation_name.clone())
    }

    /// New setlist item for `dance_id`, snapshotted from the catalog
    pub fn setlist_item(&self, rough_order: u32, dance_id: &str) -> SetlistItem {
        match self.dance(dance_id) {
            Some(dance) => {
                let form = self.formation_label(dance).unwrap_or_default();
                SetlistItem::snapshot(rough_order, dance, &form)
            }
            None => SetlistItem::unresolved(rough_order, dance_id),
        }
    }

    /// Distinct values for the filter controls
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions::collect(self)
    }
}
