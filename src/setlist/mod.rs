//! Setlist editor
//!
//! Keeps the original setlists as loaded and a working copy of each that the
//! user edits during a session. Edits only ever touch the working copy;
//! [`SetlistBook::reset_to_original`] copies the original back over it.

use std::collections::HashSet;

use crate::models::{Dance, Setlist, SetlistItem};

#[derive(Clone, Debug, Default)]
pub struct SetlistBook {
    originals: Vec<Setlist>,
    working: Vec<Setlist>,
    active: Option<String>,
}

/// Drop repeated setlist ids, keeping the later record in the earlier slot
fn dedupe_by_id(setlists: Vec<Setlist>) -> Vec<Setlist> {
    let mut out: Vec<Setlist> = Vec::with_capacity(setlists.len());
    for setlist in setlists {
        match out.iter_mut().find(|s| s.id == setlist.id) {
            Some(slot) => *slot = setlist,
            None => out.push(setlist),
        }
    }
    out
}

impl SetlistBook {
    /// Build working copies from the originals
    ///
    /// A persisted working copy replaces the clone of the original with the
    /// same id. Persisted copies whose original is gone are dropped.
    pub fn new(originals: Vec<Setlist>, persisted: Option<Vec<Setlist>>) -> Self {
        let originals = dedupe_by_id(originals);
        let mut persisted = persisted.unwrap_or_default();

        let working = originals
            .iter()
            .map(|original| {
                match persisted.iter().position(|p| p.id == original.id) {
                    Some(slot) => persisted.swap_remove(slot),
                    None => original.clone(),
                }
            })
            .collect();

        if !persisted.is_empty() {
            log::debug!(
                "Dropping {} persisted setlist(s) with no original",
                persisted.len()
            );
        }

        Self {
            originals,
            working,
            active: None,
        }
    }

    pub fn originals(&self) -> &[Setlist] {
        &self.originals
    }

    pub fn working(&self) -> &[Setlist] {
        &self.working
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// The active working setlist
    pub fn active(&self) -> Option<&Setlist> {
        let id = self.active.as_deref()?;
        self.working.iter().find(|s| s.id == id)
    }

    fn active_mut(&mut self) -> Option<&mut Setlist> {
        let id = self.active.as_deref()?;
        self.working.iter_mut().find(|s| s.id == id)
    }

    /// The original of the active setlist
    pub fn active_original(&self) -> Option<&Setlist> {
        let id = self.active.as_deref()?;
        self.originals.iter().find(|s| s.id == id)
    }

    /// Choose the active setlist; an unknown id clears it
    ///
    /// Returns true when the active setlist changed.
    pub fn select(&mut self, id: Option<&str>) -> bool {
        let next = id
            .filter(|id| self.working.iter().any(|s| s.id == *id))
            .map(str::to_string);
        if id.is_some() && next.is_none() {
            log::debug!("Unknown setlist {:?}, showing all dances", id);
        }
        let changed = next != self.active;
        self.active = next;
        changed
    }

    /// Append `dance` to the active setlist
    ///
    /// No-op without an active setlist or if the dance is already listed.
    pub fn add(&mut self, dance: &Dance, form: &str) -> bool {
        let Some(setlist) = self.active_mut() else {
            return false;
        };
        if setlist.contains(&dance.id) {
            return false;
        }
        let order = setlist.next_rough_order();
        setlist.items.push(SetlistItem::snapshot(order, dance, form));
        true
    }

    /// Remove the item at `index`; no-op if out of range
    pub fn remove(&mut self, index: usize) -> bool {
        match self.active_mut() {
            Some(setlist) if index < setlist.items.len() => {
                setlist.items.remove(index);
                true
            }
            _ => false,
        }
    }

    /// Swap the item at `index` with the one at `index + delta`
    ///
    /// Purely positional: rough orders are not renumbered. No-op if either
    /// position is out of range.
    pub fn move_item(&mut self, index: usize, delta: isize) -> bool {
        let Some(setlist) = self.active_mut() else {
            return false;
        };
        let len = setlist.items.len();
        let target = index as isize + delta;
        if delta == 0 || index >= len || target < 0 || target as usize >= len {
            return false;
        }
        setlist.items.swap(index, target as usize);
        true
    }

    /// Replace the active working copy's items with the original's
    pub fn reset_to_original(&mut self) -> bool {
        let Some(items) = self.active_original().map(|s| s.items.clone()) else {
            return false;
        };
        match self.active_mut() {
            Some(setlist) => {
                setlist.items = items;
                true
            }
            None => false,
        }
    }

    /// Active setlist as one dance id per line
    pub fn to_text(&self) -> String {
        self.active()
            .map(|s| s.dance_ids().collect::<Vec<_>>().join("\n"))
            .unwrap_or_default()
    }

    /// Replace the active setlist's items from one dance id per line
    ///
    /// Blank lines and repeats are dropped. Items already in the list keep
    /// their snapshot; new ids are snapshotted with `snapshot`.
    pub fn apply_text<F>(&mut self, text: &str, mut snapshot: F) -> bool
    where
        F: FnMut(u32, &str) -> SetlistItem,
    {
        let Some(setlist) = self.active_mut() else {
            return false;
        };

        let mut next_order = setlist.next_rough_order();
        let mut seen = HashSet::new();
        let items: Vec<SetlistItem> = text
            .lines()
            .map(str::trim)
            .filter(|id| !id.is_empty() && seen.insert(*id))
            .map(|id| match setlist.items.iter().find(|item| item.dance_id == id) {
                Some(existing) => existing.clone(),
                None => {
                    let item = snapshot(next_order, id);
                    next_order = next_order.saturating_add(1);
                    item
                }
            })
            .collect();

        if items == setlist.items {
            return false;
        }
        setlist.items = items;
        true
    }
}
