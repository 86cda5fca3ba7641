//! Filter engine
//!
//! Computes the visible set: the ordered dances the user can currently pick
//! from, given the filter criteria and the active setlist.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogIndex;
use crate::models::serde_helpers::{lenient_text, lenient_u32, lenient_u8};
use crate::models::{Dance, Setlist};

/// Current values of the filter controls; `None` means "any"
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(default, deserialize_with = "lenient_text")]
    pub formation_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub bars: Option<u32>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub music_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_u8")]
    pub difficulty: Option<u8>,
}

/// One active criterion
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Predicate<'a> {
    Formation(&'a str),
    Bars(u32),
    MusicType(&'a str),
    Difficulty(u8),
}

impl Predicate<'_> {
    /// A dance lacking the filtered field never matches
    pub fn accepts(&self, dance: &Dance, catalog: &CatalogIndex) -> bool {
        match *self {
            // The raw id counts even when no formation record resolves it
            Predicate::Formation(id) => {
                dance.formation_id.as_deref().map(str::trim) == Some(id)
                    || catalog.formation_id_of(dance) == Some(id)
            }
            Predicate::Bars(bars) => dance.bars_per_part() == Some(bars),
            Predicate::MusicType(music_type) => dance
                .music_type
                .as_deref()
                .map(str::trim)
                .map_or(false, |mt| mt == music_type),
            Predicate::Difficulty(difficulty) => dance.difficulty == Some(difficulty),
        }
    }
}

impl FilterCriteria {
    /// Active criteria, blank text values excluded
    pub fn predicates(&self) -> Vec<Predicate<'_>> {
        let mut predicates = Vec::new();
        if let Some(id) = non_blank(&self.formation_id) {
            predicates.push(Predicate::Formation(id));
        }
        if let Some(bars) = self.bars {
            predicates.push(Predicate::Bars(bars));
        }
        if let Some(music_type) = non_blank(&self.music_type) {
            predicates.push(Predicate::MusicType(music_type));
        }
        if let Some(difficulty) = self.difficulty {
            predicates.push(Predicate::Difficulty(difficulty));
        }
        predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates().is_empty()
    }

    /// True when the dance passes every active criterion
    pub fn matches(&self, dance: &Dance, catalog: &CatalogIndex) -> bool {
        self.predicates()
            .iter()
            .all(|predicate| predicate.accepts(dance, catalog))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Compute the visible set
///
/// With a non-empty setlist the base set is the setlist's dances in setlist
/// order (ids missing from the catalog and repeats are skipped). Otherwise it
/// is the whole catalog, sorted by title, case-insensitively.
pub fn visible_dances<'a>(
    catalog: &'a CatalogIndex,
    setlist: Option<&Setlist>,
    criteria: &FilterCriteria,
) -> Vec<&'a Dance> {
    let predicates = criteria.predicates();
    let passes = |dance: &&Dance| predicates.iter().all(|p| p.accepts(dance, catalog));

    match setlist.filter(|s| !s.items.is_empty()) {
        Some(setlist) => {
            let mut seen = HashSet::new();
            setlist
                .dance_ids()
                .filter(|id| seen.insert(*id))
                .filter_map(|id| catalog.dance(id))
                .filter(passes)
                .collect()
        }
        None => {
            let mut dances: Vec<&Dance> = catalog.dances().iter().filter(passes).collect();
            dances.sort_by_cached_key(|dance| dance.sort_key());
            dances
        }
    }
}
