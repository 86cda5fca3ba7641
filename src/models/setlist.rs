//! Setlists and setlist items
//!
//! Two schema generations exist in the wild: a plain list of dance ids, and
//! denormalized item objects. Both are read through [`RawSetlist`] and
//! normalized into [`Setlist`].

use serde::{Deserialize, Serialize};

use super::serde_helpers::{text_or_empty, u32_or_zero};
use super::Dance;

/// A dance entry in a setlist
///
/// The display fields are a snapshot taken when the item was added. They are
/// not refreshed if the referenced dance changes later.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SetlistItem {
    #[serde(default, deserialize_with = "u32_or_zero")]
    pub rough_order: u32,
    pub dance_id: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub speed: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub form: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub bars: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub music_type: String,
}

impl SetlistItem {
    /// Snapshot a dance's display fields into a new item
    pub fn snapshot(rough_order: u32, dance: &Dance, form: &str) -> Self {
        Self {
            rough_order,
            dance_id: dance.id.clone(),
            name: dance.display_title().to_string(),
            speed: dance.speed.clone().unwrap_or_default(),
            form: form.to_string(),
            bars: dance
                .bars_per_part()
                .map(|b| b.to_string())
                .unwrap_or_default(),
            music_type: dance.music_type.clone().unwrap_or_default(),
        }
    }

    /// Placeholder item for an id the catalog does not know
    pub fn unresolved(rough_order: u32, dance_id: &str) -> Self {
        Self {
            rough_order,
            dance_id: dance_id.to_string(),
            name: dance_id.to_string(),
            ..Default::default()
        }
    }
}

/// A normalized setlist
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Setlist {
    pub id: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub name: String,
    #[serde(default)]
    pub items: Vec<SetlistItem>,
}

impl Setlist {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Dance ids in setlist order
    pub fn dance_ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.dance_id.as_str())
    }

    pub fn contains(&self, dance_id: &str) -> bool {
        self.items.iter().any(|item| item.dance_id == dance_id)
    }

    /// Next rough order: previous maximum + 1, or 1 for an empty list
    pub fn next_rough_order(&self) -> u32 {
        self.items
            .iter()
            .map(|item| item.rough_order)
            .max()
            .map_or(1, |max| max.saturating_add(1))
    }
}

/// Setlist as found in source data, in either schema generation
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawSetlist {
    pub id: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub name: String,
    #[serde(default)]
    pub dance_ids: Option<Vec<String>>,
    #[serde(default)]
    pub items: Option<Vec<SetlistItem>>,
}

impl RawSetlist {
    /// Normalize into item form
    ///
    /// `items` wins when both schemas are present. Plain id lists get
    /// `rough_order = position + 1` and their display fields from `snapshot`.
    pub fn into_setlist<F>(self, mut snapshot: F) -> Setlist
    where
        F: FnMut(u32, &str) -> SetlistItem,
    {
        let items = match (self.items, self.dance_ids) {
            (Some(items), _) => items
                .into_iter()
                .filter(|item| !item.dance_id.trim().is_empty())
                .collect(),
            (None, Some(ids)) => ids
                .iter()
                .map(|id| id.trim())
                .filter(|id| !id.is_empty())
                .zip(1u32..)
                .map(|(id, order)| snapshot(order, id))
                .collect(),
            (None, None) => Vec::new(),
        };

        Setlist {
            id: self.id,
            name: self.name,
            items,
        }
    }
}
