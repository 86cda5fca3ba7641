//! Dance records
//!
//! A dance is immutable once loaded. Setlist items copy the fields they
//! display instead of pointing back into the dance.

use serde::{Deserialize, Serialize};

use super::serde_helpers::{lenient_text, lenient_u32, lenient_u8, text_or_empty};

/// How a dance is built: bars per part and the ordered part labels
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Structure {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub bars_per_part: Option<u32>,
    #[serde(default)]
    pub parts: Vec<String>,
}

/// One row of the calling table
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Call {
    #[serde(default, deserialize_with = "text_or_empty")]
    pub part: String,
    /// Bar range, e.g. "1-8" or "8"
    #[serde(default, deserialize_with = "text_or_empty")]
    pub bars: String,
    /// Call markup; may contain role tokens
    #[serde(default, deserialize_with = "text_or_empty")]
    pub call: String,
}

/// A single choreography record
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Dance {
    pub id: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub formation_id: Option<String>,
    /// Free-text formation, used when no `formation_id` is given
    #[serde(default, deserialize_with = "lenient_text")]
    pub formation_name: Option<String>,
    #[serde(default)]
    pub structure: Option<Structure>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub speed: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub music_type: Option<String>,
    /// 1 (easy) to 3 (hard)
    #[serde(default, deserialize_with = "lenient_u8")]
    pub difficulty: Option<u8>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub notes: Option<String>,
    #[serde(default)]
    pub calls: Vec<Call>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub instructions_html: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub info_html: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub figure_image: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub figure_html: Option<String>,
}

impl Dance {
    /// Title to show, falling back to the id for untitled records
    pub fn display_title(&self) -> &str {
        if !self.title.trim().is_empty() {
            self.title.trim()
        } else if !self.id.is_empty() {
            &self.id
        } else {
            "Untitled dance"
        }
    }

    /// Case-insensitive key used for alphabetical listings
    pub fn sort_key(&self) -> String {
        self.display_title().to_lowercase()
    }

    /// Bars per part, if the structure declares it
    pub fn bars_per_part(&self) -> Option<u32> {
        self.structure.as_ref().and_then(|s| s.bars_per_part)
    }

    /// Human-readable structure line, e.g. "32 bars: A, B"
    pub fn structure_line(&self) -> String {
        match &self.structure {
            Some(Structure {
                bars_per_part: Some(bars),
                parts,
            }) => format!("{} bars: {}", bars, parts.join(", ")),
            Some(Structure { parts, .. }) if !parts.is_empty() => {
                format!("Parts: {}", parts.join(", "))
            }
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dance_accepts_string_numbers() {
        let dance: Dance = serde_json::from_value(json!({
            "id": "strip-the-willow",
            "title": "Strip the Willow",
            "structure": { "barsPerPart": "32", "parts": ["A", "B"] },
            "difficulty": "2",
            "calls": [{ "part": "A", "bars": 8, "call": "[P1]s lead down" }]
        }))
        .unwrap();

        assert_eq!(dance.bars_per_part(), Some(32));
        assert_eq!(dance.difficulty, Some(2));
        assert_eq!(dance.calls[0].bars, "8");
    }

    #[test]
    fn test_structure_line_variants() {
        let mut dance = Dance {
            id: "d".to_string(),
            structure: Some(Structure {
                bars_per_part: Some(32),
                parts: vec!["A".to_string(), "B".to_string()],
            }),
            ..Default::default()
        };
        assert_eq!(dance.structure_line(), "32 bars: A, B");

        dance.structure = Some(Structure {
            bars_per_part: None,
            parts: vec!["A".to_string()],
        });
        assert_eq!(dance.structure_line(), "Parts: A");

        dance.structure = None;
        assert_eq!(dance.structure_line(), "");
    }

    #[test]
    fn test_display_title_falls_back_to_id() {
        let dance = Dance {
            id: "gay-gordons".to_string(),
            ..Default::default()
        };
        assert_eq!(dance.display_title(), "gay-gordons");
    }
}
