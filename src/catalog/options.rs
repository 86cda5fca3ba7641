//! Choices for the filter controls, derived from the catalog

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::CatalogIndex;

/// A formation choice for the formation filter
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FormationOption {
    pub id: String,
    pub name: String,
}

/// Distinct values present in the catalog, in display order
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub formations: Vec<FormationOption>,
    pub bars: Vec<u32>,
    pub music_types: Vec<String>,
    pub difficulties: Vec<u8>,
}

impl FilterOptions {
    pub fn collect(index: &CatalogIndex) -> Self {
        // The index already holds one formation per id
        let formations = index
            .formations()
            .iter()
            .map(|f| FormationOption {
                id: f.id.clone(),
                name: f.display_name().to_string(),
            })
            .collect();

        let bars: BTreeSet<u32> = index.dances().iter().filter_map(|d| d.bars_per_part()).collect();
        let music_types: BTreeSet<String> = index
            .dances()
            .iter()
            .filter_map(|d| d.music_type.as_deref())
            .map(str::trim)
            .filter(|mt| !mt.is_empty())
            .map(str::to_string)
            .collect();
        let difficulties: BTreeSet<u8> = index.dances().iter().filter_map(|d| d.difficulty).collect();

        Self {
            formations,
            bars: bars.into_iter().collect(),
            music_types: music_types.into_iter().collect(),
            difficulties: difficulties.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dance, Formation, Structure};

    fn dance(id: &str, bars: Option<u32>, music_type: Option<&str>, difficulty: Option<u8>) -> Dance {
        Dance {
            id: id.to_string(),
            structure: bars.map(|b| Structure {
                bars_per_part: Some(b),
                parts: vec![],
            }),
            music_type: music_type.map(str::to_string),
            difficulty,
            ..Default::default()
        }
    }

    #[test]
    fn test_options_are_distinct_and_sorted() {
        let index = CatalogIndex::build(
            vec![
                dance("a", Some(48), Some("Jig"), Some(2)),
                dance("b", Some(32), Some("Reel"), None),
                dance("c", Some(32), Some("Jig"), Some(1)),
                dance("d", None, None, Some(2)),
            ],
            vec![Formation {
                id: "f1".to_string(),
                name: "Circle".to_string(),
                ..Default::default()
            }],
        );

        let options = index.filter_options();

        assert_eq!(options.bars, vec![32, 48]);
        assert_eq!(options.music_types, vec!["Jig".to_string(), "Reel".to_string()]);
        assert_eq!(options.difficulties, vec![1, 2]);
        assert_eq!(options.formations[0].name, "Circle");
    }
}
