//! Selection state machine
//!
//! Tracks which dance is current. The selection is keyed by dance id, not by
//! position, so it stays on the same dance when the visible set is
//! recomputed around it.

use serde::{Deserialize, Serialize};

use crate::models::Dance;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(tag = "state", content = "danceId")]
pub enum Selection {
    #[default]
    NoSelection,
    Selected(String),
}

impl Selection {
    pub fn dance_id(&self) -> Option<&str> {
        match self {
            Selection::NoSelection => None,
            Selection::Selected(id) => Some(id),
        }
    }

    pub fn is_selected(&self) -> bool {
        matches!(self, Selection::Selected(_))
    }

    fn first_of(visible: &[&Dance]) -> Self {
        visible
            .first()
            .map_or(Selection::NoSelection, |d| Selection::Selected(d.id.clone()))
    }

    /// Transition after the visible set was recomputed
    ///
    /// Stays on the current dance if it is still visible, otherwise moves to
    /// the first visible dance, or to `NoSelection` for an empty set.
    pub fn reconcile(&self, visible: &[&Dance]) -> Self {
        match self.dance_id() {
            Some(id) if visible.iter().any(|d| d.id == id) => self.clone(),
            _ => Self::first_of(visible),
        }
    }

    /// Transition for an explicit pick; `None` if the id is not visible
    pub fn pick(id: &str, visible: &[&Dance]) -> Option<Self> {
        visible
            .iter()
            .any(|d| d.id == id)
            .then(|| Selection::Selected(id.to_string()))
    }

    /// Transition for step navigation over `sequence`, wrapping at both ends
    ///
    /// `None` when there is nothing to step over or the current dance is not
    /// part of the sequence.
    pub fn step(&self, delta: isize, sequence: &[&str]) -> Option<Self> {
        let current = self.dance_id()?;
        let position = sequence.iter().position(|id| *id == current)?;
        let len = sequence.len() as isize;
        let target = (position as isize + delta).rem_euclid(len) as usize;
        Some(Selection::Selected(sequence[target].to_string()))
    }

    /// Initial selection on load
    ///
    /// Restores the persisted dance if it is visible, else the first visible.
    pub fn restore(persisted: Option<&str>, visible: &[&Dance]) -> Self {
        persisted
            .and_then(|id| Self::pick(id, visible))
            .unwrap_or_else(|| Self::first_of(visible))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dances(ids: &[&str]) -> Vec<Dance> {
        ids.iter()
            .map(|id| Dance {
                id: id.to_string(),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_reconcile_keeps_visible_selection() {
        let all = dances(&["a", "b", "c"]);
        let visible: Vec<&Dance> = all.iter().collect();

        let selection = Selection::Selected("b".to_string());
        assert_eq!(selection.reconcile(&visible), selection);

        let gone = Selection::Selected("z".to_string());
        assert_eq!(gone.reconcile(&visible), Selection::Selected("a".to_string()));

        assert_eq!(selection.reconcile(&[]), Selection::NoSelection);
        assert_eq!(Selection::NoSelection.reconcile(&visible), Selection::Selected("a".to_string()));
    }

    #[test]
    fn test_pick_requires_visible_id() {
        let all = dances(&["a", "b"]);
        let visible: Vec<&Dance> = all.iter().collect();

        assert_eq!(Selection::pick("b", &visible), Some(Selection::Selected("b".to_string())));
        assert_eq!(Selection::pick("x", &visible), None);
    }

    #[test]
    fn test_step_wraps_both_ways() {
        let sequence = ["a", "b", "c"];
        let first = Selection::Selected("a".to_string());
        let last = Selection::Selected("c".to_string());

        assert_eq!(first.step(-1, &sequence), Some(last.clone()));
        assert_eq!(last.step(1, &sequence), Some(first.clone()));
        assert_eq!(first.step(4, &sequence), Some(Selection::Selected("b".to_string())));
    }

    #[test]
    fn test_step_outside_sequence_is_a_no_op() {
        let sequence = ["a", "b"];
        assert_eq!(Selection::Selected("z".to_string()).step(1, &sequence), None);
        assert_eq!(Selection::NoSelection.step(1, &sequence), None);
        assert_eq!(Selection::Selected("a".to_string()).step(1, &[]), None);
    }

    #[test]
    fn test_restore_falls_back_to_first() {
        let all = dances(&["a", "b"]);
        let visible: Vec<&Dance> = all.iter().collect();

        assert_eq!(Selection::restore(Some("b"), &visible), Selection::Selected("b".to_string()));
        assert_eq!(Selection::restore(Some("x"), &visible), Selection::Selected("a".to_string()));
        assert_eq!(Selection::restore(None, &visible), Selection::Selected("a".to_string()));
        assert_eq!(Selection::restore(Some("a"), &[]), Selection::NoSelection);
    }
}
